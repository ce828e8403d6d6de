//! Coverage templates.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::coverage::CoverageFamily;
use crate::field::Side;
use crate::personnel::KNOWN_DEFENDER_LABELS;

/// Fixed pre-snap spot for one defender, overriding generated alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPosition {
    /// Defender roster label.
    pub label: String,
    /// Lateral offset from the ball.
    pub x: f32,
    /// Yards past the line of scrimmage.
    pub depth: f32,
}

/// Shell shown before the snap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisguiseData {
    /// Family whose alignment is shown.
    pub shell: CoverageFamily,
    /// Seconds after the snap the real coverage appears.
    pub reveal_at: f32,
}

/// Corner and safety trading jobs after the snap.
///
/// Both hold their normal alignment until `reveal_at`, then play each
/// other's assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvertData {
    /// Side that inverts. Both sides when unset.
    #[serde(default)]
    pub side: Option<Side>,
    /// Seconds after the snap the swap happens.
    pub reveal_at: f32,
}

/// Named coverage call.
///
/// # Example RON
///
/// ```ron
/// CoverageData(
///     name: "cover-1-robber",
///     family: Cover1,
///     robber: Some("SS"),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageData {
    /// Unique coverage name.
    pub name: String,
    /// Scheme family.
    pub family: CoverageFamily,
    /// Defenders sent after the passer, by roster label.
    #[serde(default)]
    pub blitzers: Vec<String>,
    /// Defender assigned to spy the quarterback.
    #[serde(default)]
    pub spy: Option<String>,
    /// Defender playing the robber.
    #[serde(default)]
    pub robber: Option<String>,
    /// Pre-snap disguise.
    #[serde(default)]
    pub disguise: Option<DisguiseData>,
    /// Corner and safety role swap.
    #[serde(default)]
    pub invert: Option<InvertData>,
    /// Static spots overriding generated alignment.
    #[serde(default)]
    pub positions: Vec<StaticPosition>,
}

impl CoverageData {
    /// A plain call of `family`.
    #[must_use]
    pub fn new(name: impl Into<String>, family: CoverageFamily) -> Self {
        Self {
            name: name.into(),
            family,
            blitzers: Vec::new(),
            spy: None,
            robber: None,
            disguise: None,
            invert: None,
            positions: Vec::new(),
        }
    }

    /// Add blitzers by label.
    #[must_use]
    pub fn with_blitzers(mut self, labels: &[&str]) -> Self {
        self.blitzers = labels.iter().map(|l| (*l).to_string()).collect();
        self
    }

    /// Assign a robber.
    #[must_use]
    pub fn with_robber(mut self, label: &str) -> Self {
        self.robber = Some(label.to_string());
        self
    }

    /// Assign a spy.
    #[must_use]
    pub fn with_spy(mut self, label: &str) -> Self {
        self.spy = Some(label.to_string());
        self
    }

    /// Show `shell` pre-snap and reveal at `reveal_at` seconds.
    #[must_use]
    pub fn with_disguise(mut self, shell: CoverageFamily, reveal_at: f32) -> Self {
        self.disguise = Some(DisguiseData { shell, reveal_at });
        self
    }

    /// Swap corner and safety jobs on `side` (both when `None`) at `reveal_at`.
    #[must_use]
    pub fn with_invert(mut self, side: Option<Side>, reveal_at: f32) -> Self {
        self.invert = Some(InvertData { side, reveal_at });
        self
    }

    /// Whether `label` has a special assignment in this call.
    #[must_use]
    pub fn is_reserved(&self, label: &str) -> bool {
        self.blitzers.iter().any(|b| b == label)
            || self.spy.as_deref() == Some(label)
            || self.robber.as_deref() == Some(label)
    }

    /// Validate the coverage and return every problem found.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();
        let special = self
            .blitzers
            .iter()
            .chain(self.spy.iter())
            .chain(self.robber.iter());
        for label in special {
            if !KNOWN_DEFENDER_LABELS.contains(&label.as_str()) {
                errors.push(format!(
                    "Coverage '{}' references unknown defender '{label}'",
                    self.name
                ));
            }
            if !seen.insert(label.as_str()) {
                errors.push(format!(
                    "Coverage '{}' gives defender '{label}' two special assignments",
                    self.name
                ));
            }
        }
        let mut placed = HashSet::new();
        for position in &self.positions {
            if !KNOWN_DEFENDER_LABELS.contains(&position.label.as_str()) {
                errors.push(format!(
                    "Coverage '{}' places unknown defender '{}'",
                    self.name, position.label
                ));
            }
            if !placed.insert(position.label.as_str()) {
                errors.push(format!(
                    "Coverage '{}' places defender '{}' twice",
                    self.name, position.label
                ));
            }
            if !(position.x.is_finite() && position.depth.is_finite()) || position.depth < 0.0 {
                errors.push(format!(
                    "Coverage '{}' has an invalid spot for '{}'",
                    self.name, position.label
                ));
            }
        }
        if let Some(disguise) = &self.disguise {
            if !(disguise.reveal_at.is_finite() && disguise.reveal_at >= 0.0) {
                errors.push(format!(
                    "Coverage '{}' has an invalid reveal time",
                    self.name
                ));
            }
        }
        if let Some(invert) = &self.invert {
            if !(invert.reveal_at.is_finite() && invert.reveal_at >= 0.0) {
                errors.push(format!(
                    "Coverage '{}' has an invalid invert time",
                    self.name
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_reserved() {
        let coverage = CoverageData::new("cover-1-robber", CoverageFamily::Cover1)
            .with_robber("SS")
            .with_blitzers(&["MLB"]);
        assert!(coverage.is_reserved("SS"));
        assert!(coverage.is_reserved("MLB"));
        assert!(!coverage.is_reserved("FS"));
        assert!(coverage.validate().is_empty());
    }

    #[test]
    fn test_unknown_and_duplicate_labels() {
        let coverage = CoverageData::new("bad", CoverageFamily::Cover3)
            .with_blitzers(&["MLB", "ZZZ"])
            .with_spy("MLB");
        assert_eq!(coverage.validate().len(), 2);
    }

    #[test]
    fn test_parse_ron_defaults() {
        let coverage: CoverageData =
            ron::from_str(r#"CoverageData(name: "cover-3", family: Cover3)"#).unwrap();
        assert!(coverage.blitzers.is_empty());
        assert!(coverage.disguise.is_none());
        assert!(coverage.invert.is_none());
    }

    #[test]
    fn test_parse_ron_invert() {
        let coverage: CoverageData = ron::from_str(
            r#"CoverageData(
                name: "cover-2-invert",
                family: Cover2,
                invert: Some(InvertData(reveal_at: 0.5)),
            )"#,
        )
        .unwrap();
        assert_eq!(coverage.invert, Some(InvertData { side: None, reveal_at: 0.5 }));
        assert!(coverage.validate().is_empty());

        let bad = CoverageData::new("bad", CoverageFamily::Cover2).with_invert(Some(Side::Left), -1.0);
        assert_eq!(bad.validate().len(), 1);
    }
}
