//! Playbook data validation.
//!
//! Every `.ron` file in a directory is parsed as a [`Playbook`], merged over
//! the built-in one and checked with [`Playbook::validate`]. Extra files may
//! therefore reference built-in formations.

use std::path::{Path, PathBuf};

use gridiron_core::data::Playbook;
use gridiron_core::error::PlayError;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a data file or directory failed validation.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The path is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    /// Reading failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File or directory being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not a playbook.
    #[error("{}: {source}", path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Parser error.
        source: PlayError,
    },
    /// The playbook parsed but has broken templates.
    #[error("{}: {} problem(s): {}", path.display(), problems.len(), problems.join("; "))]
    Invalid {
        /// Offending file.
        path: PathBuf,
        /// Every problem found.
        problems: Vec<String>,
    },
}

/// Templates found in one valid file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// File checked.
    pub path: PathBuf,
    /// Formation count.
    pub formations: usize,
    /// Concept count.
    pub concepts: usize,
    /// Coverage count.
    pub coverages: usize,
}

/// Outcome of validating a directory.
#[derive(Debug, Default)]
pub struct DirectoryReport {
    /// Files that passed.
    pub passed: Vec<FileReport>,
    /// Files that failed.
    pub failures: Vec<ValidateError>,
}

impl DirectoryReport {
    /// Whether every file passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Validate a single playbook file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or fails validation.
pub fn validate_playbook_file(path: &Path) -> Result<FileReport, ValidateError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ValidateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let extra = Playbook::from_ron_str(&contents).map_err(|source| ValidateError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let report = FileReport {
        path: path.to_path_buf(),
        formations: extra.formations.len(),
        concepts: extra.concepts.len(),
        coverages: extra.coverages.len(),
    };

    let mut duplicates = Vec::new();
    let mut own = Playbook::default();
    own.formations.clone_from(&extra.formations);
    own.concepts.clone_from(&extra.concepts);
    own.coverages.clone_from(&extra.coverages);
    // Duplicates inside the file would be hidden by the merge below
    duplicates.extend(
        own.validate()
            .into_iter()
            .filter(|problem| problem.starts_with("Duplicate")),
    );

    let mut merged = Playbook::standard();
    merged.merge(extra);
    let mut problems = merged.validate();
    problems.extend(duplicates);
    if !problems.is_empty() {
        return Err(ValidateError::Invalid {
            path: path.to_path_buf(),
            problems,
        });
    }
    debug!(path = %path.display(), ?report, "Playbook valid");
    Ok(report)
}

/// Validate all RON data files in a directory.
///
/// Files are checked in name order. Per-file failures are collected in the
/// report rather than stopping the walk.
///
/// # Errors
///
/// Returns an error if `path` is not a readable directory.
pub fn validate_data_directory(path: &Path) -> Result<DirectoryReport, ValidateError> {
    if !path.is_dir() {
        return Err(ValidateError::NotADirectory(path.to_path_buf()));
    }
    let io_error = |source| ValidateError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(path).map_err(io_error)? {
        let file = entry.map_err(io_error)?.path();
        if file.extension().is_some_and(|ext| ext == "ron") {
            files.push(file);
        }
    }
    files.sort();

    let mut report = DirectoryReport::default();
    for file in files {
        match validate_playbook_file(&file) {
            Ok(passed) => report.passed.push(passed),
            Err(e) => {
                warn!("{e}");
                report.failures.push(e);
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const EXTRA: &str = r#"Playbook(
        concepts: [
            ConceptData(
                name: "levels",
                formation: "doubles",
                routes: [
                    RouteAssignment(slot: "X", route: In, depth: Some(10.0)),
                    RouteAssignment(slot: "A", route: Drag),
                    RouteAssignment(slot: "RB", route: Block),
                ],
            ),
        ],
        coverages: [CoverageData(name: "cover-1-spy", family: Cover1, spy: Some("MLB"))],
    )"#;

    #[test]
    fn test_extra_file_may_use_builtin_formations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extra.ron");
        fs::write(&path, EXTRA).unwrap();
        let report = validate_playbook_file(&path).unwrap();
        assert_eq!(report.concepts, 1);
        assert_eq!(report.coverages, 1);
        assert_eq!(report.formations, 0);
    }

    #[test]
    fn test_directory_collects_failures() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a_good.ron"), EXTRA).unwrap();
        fs::write(dir.path().join("b_broken.ron"), "Playbook(concepts: [").unwrap();
        fs::write(
            dir.path().join("c_invalid.ron"),
            r#"Playbook(coverages: [CoverageData(name: "x", family: Cover0, blitzers: ["QB"])])"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = validate_data_directory(dir.path()).unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.passed.len(), 1);
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(report.failures[0], ValidateError::Parse { .. }));
        assert!(matches!(report.failures[1], ValidateError::Invalid { .. }));
    }

    #[test]
    fn test_duplicates_within_file_are_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dup.ron");
        fs::write(
            &path,
            r#"Playbook(coverages: [
                CoverageData(name: "zone", family: Cover3),
                CoverageData(name: "zone", family: Cover4),
            ])"#,
        )
        .unwrap();
        let Err(ValidateError::Invalid { problems, .. }) = validate_playbook_file(&path) else {
            panic!("duplicate names should fail");
        };
        assert!(problems.iter().any(|p| p.contains("Duplicate coverage")));
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            validate_data_directory(&dir.path().join("nope")),
            Err(ValidateError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_exported_standard_playbook_validates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("standard.ron");
        fs::write(&path, Playbook::standard().to_ron_string().unwrap()).unwrap();
        let report = validate_playbook_file(&path).unwrap();
        assert_eq!(report.coverages, Playbook::standard().coverages.len());
    }
}
