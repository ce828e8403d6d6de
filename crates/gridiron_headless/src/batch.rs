//! Batch play runner.
//!
//! Runs one scenario over a range of seeds in parallel using rayon and
//! aggregates the outcomes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use gridiron_core::replay::RecordingPlayer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, PlayMetrics};
use crate::runner::{run_scenario, PlayRunner, RunError};
use crate::scenario::Scenario;

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario to run; its seed is replaced per play
    pub scenario: Scenario,
    /// Number of plays to run
    pub play_count: u32,
    /// Maximum parallel plays (0 = use rayon default)
    pub parallel_plays: u32,
    /// Starting seed for deterministic runs
    pub seed_start: u64,
    /// Output directory for results
    pub output_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::default(),
            play_count: 100,
            parallel_plays: 0,
            seed_start: 0,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl BatchConfig {
    /// Create config for a scenario
    pub fn new(scenario: Scenario, play_count: u32) -> Self {
        Self {
            scenario,
            play_count,
            ..Default::default()
        }
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual play metrics, in seed order
    pub plays: Vec<PlayMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Play index
    pub play_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Run a batch of plays
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        scenario = %config.scenario.name,
        plays = config.play_count,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    if config.parallel_plays > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_plays as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<PlayMetrics, BatchError>> = (0..config.play_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            match run_scenario(&config.scenario.with_seed(seed)) {
                Ok(metrics) => {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % 100 == 0 {
                        debug!("Progress: {}/{}", done, config.play_count);
                    }
                    Ok(metrics)
                }
                Err(e) => {
                    warn!("Play {} failed: {}", i, e);
                    Err(BatchError {
                        play_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (plays, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let plays: Vec<PlayMetrics> = plays.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_plays(&plays);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} plays in {:.2}s ({} errors)",
        plays.len(),
        duration_seconds,
        errors.len()
    );

    BatchResults {
        config,
        plays,
        summary,
        duration_seconds,
        errors,
    }
}

/// Outcome of a determinism check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Seed checked
    pub seed: u64,
    /// Final hash of every run
    pub hashes: Vec<u64>,
    /// Hash reached by re-executing the first run's recording
    pub replay_hash: Option<u64>,
    /// Whether every run and the replay agreed
    pub deterministic: bool,
}

/// Verify determinism by running the same seed several times and replaying
/// a recording of the first run.
pub fn verify_determinism(scenario: &Scenario, runs: u32) -> Result<VerifyReport, RunError> {
    let mut hashes = Vec::with_capacity(runs as usize);
    let mut replay_hash = None;

    for run in 0..runs.max(1) {
        let mut runner = PlayRunner::from_scenario(scenario)?;
        if run == 0 {
            runner.start_recording()?;
        }
        runner.run_play()?;
        hashes.push(runner.engine().state_hash());

        if let Some(recording) = runner.take_recording() {
            let mut player = RecordingPlayer::new(recording)?;
            replay_hash = player.verify().ok();
        }
    }

    let deterministic = hashes.windows(2).all(|w| w[0] == w[1])
        && replay_hash.is_some_and(|h| hashes.first() == Some(&h));
    if !deterministic {
        warn!(seed = scenario.seed, ?hashes, ?replay_hash, "Determinism check failed");
    }
    Ok(VerifyReport {
        seed: scenario.seed,
        hashes,
        replay_hash,
        deterministic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_core::outcome::OutcomeKind;

    #[test]
    fn test_batch_runs_every_seed() {
        let config = BatchConfig::new(Scenario::default(), 16).with_seed(100);
        let results = run_batch(config);
        assert!(results.errors.is_empty());
        assert_eq!(results.plays.len(), 16);
        assert_eq!(results.summary.total_plays, 16);
        let seeds: Vec<u64> = results.plays.iter().map(|p| p.seed).collect();
        assert_eq!(seeds, (100..116).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_is_reproducible() {
        let a = run_batch(BatchConfig::new(Scenario::default(), 8).with_seed(3));
        let b = run_batch(BatchConfig::new(Scenario::default(), 8).with_seed(3));
        assert_eq!(a.plays, b.plays);
        assert_eq!(a.summary, b.summary);
    }

    #[test]
    fn test_no_throw_batch_is_all_sacks() {
        let scenario = Scenario {
            throw_plan: crate::scenario::ThrowPlan::Never,
            ..Scenario::default()
        };
        let results = run_batch(BatchConfig::new(scenario, 6));
        assert!(results.plays.iter().all(|p| p.kind == OutcomeKind::Sack));
        assert!((results.summary.sack_rate - 1.0).abs() < 1.0e-9);
    }

    #[test]
    fn test_bad_scenario_reports_errors() {
        let scenario = Scenario {
            coverage: "cover-9".to_string(),
            ..Scenario::default()
        };
        let results = run_batch(BatchConfig::new(scenario, 4));
        assert!(results.plays.is_empty());
        assert_eq!(results.errors.len(), 4);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("batch_results.json");
        let results = run_batch(BatchConfig::new(Scenario::default(), 3));
        results.save(&path).unwrap();
        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.plays, results.plays);
    }

    #[test]
    fn test_verify_determinism() {
        let scenario = Scenario {
            concept: "mesh".to_string(),
            coverage: "cover-1".to_string(),
            seed: 12345,
            ..Scenario::default()
        };
        let report = verify_determinism(&scenario, 3).unwrap();
        assert!(report.deterministic, "{report:?}");
        assert_eq!(report.hashes.len(), 3);
    }
}
