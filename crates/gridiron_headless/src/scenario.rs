//! Scenario loading and configuration.
//!
//! A scenario names the matchup for headless runs: concept, coverage, ball
//! spot, personnel and how the quarterback decides to throw.

use std::path::{Path, PathBuf};

use gridiron_core::prelude::*;
use std::result::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The engine refused part of the setup or a template was unusable.
    #[error("Scenario setup failed: {0}")]
    Setup(String),
    /// Playbook or configuration data failed to load.
    #[error(transparent)]
    Play(#[from] PlayError),
}

/// How the quarterback picks a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum ThrowPlan {
    /// Throw to the most open eligible receiver at the preferred time.
    #[default]
    MostOpen,
    /// Throw to a named slot after a fixed hold time.
    Target {
        /// Slot label ("X", "A", ...).
        label: String,
        /// Seconds after the snap.
        after: f32,
    },
    /// Hold the ball until the play ends.
    Never,
}

/// A route change applied before the snap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudiblePlan {
    /// Slot label.
    pub label: String,
    /// New route.
    pub route: RouteType,
}

/// Pre-snap motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionPlan {
    /// Slot label.
    pub label: String,
    /// Motion path.
    pub motion: MotionType,
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Concept name.
    pub concept: String,
    /// Coverage name.
    pub coverage: String,
    /// Line of scrimmage, yards from the offense's goal line.
    pub line_of_scrimmage: i32,
    /// Ball spot.
    pub hash: HashMark,
    /// Personnel code, formation default when absent.
    pub personnel: Option<String>,
    /// Random seed.
    pub seed: u64,
    /// Quarterback decision.
    pub throw_plan: ThrowPlan,
    /// Motion before the snap.
    pub motion: Option<MotionPlan>,
    /// Audibles before the snap.
    pub audibles: Vec<AudiblePlan>,
    /// Extra playbook merged over the standard one.
    pub playbook: Option<PathBuf>,
    /// Engine tuning overrides.
    pub config: Option<EngineConfig>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            description: "Slant-flat against Cover 3 from the 25".to_string(),
            concept: "slant-flat".to_string(),
            coverage: "cover-3".to_string(),
            line_of_scrimmage: 25,
            hash: HashMark::Middle,
            personnel: None,
            seed: 0,
            throw_plan: ThrowPlan::MostOpen,
            motion: None,
            audibles: Vec::new(),
            playbook: None,
            config: None,
        }
    }
}

fn player_by_label(engine: &PlayEngine, label: &str) -> Result<PlayerId, ScenarioError> {
    engine
        .state()
        .players
        .iter()
        .find(|p| p.is_offense() && p.label == label)
        .map(|p| p.id)
        .ok_or_else(|| ScenarioError::Setup(format!("no offensive player labelled '{label}'")))
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// The standard playbook with this scenario's extra playbook merged in.
    pub fn playbook(&self) -> Result<Playbook, ScenarioError> {
        let mut playbook = Playbook::standard();
        if let Some(path) = &self.playbook {
            if !path.exists() {
                return Err(ScenarioError::FileNotFound(path.display().to_string()));
            }
            let contents = std::fs::read_to_string(path)?;
            playbook.merge(Playbook::from_ron_str(&contents)?);
        }
        Ok(playbook)
    }

    /// Same scenario with a different seed.
    #[must_use]
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Build an engine set up for the snap.
    pub fn build_engine(&self, playbook: &Playbook) -> Result<PlayEngine, ScenarioError> {
        let config = match &self.config {
            Some(config) => {
                config.validate()?;
                config.clone()
            }
            None => EngineConfig::default(),
        };
        let mut engine = PlayEngine::new(config, SeededRandom::new(self.seed));
        let concept = playbook.require_concept(&self.concept)?;
        let coverage = playbook.require_coverage(&self.coverage)?;

        let setup = engine.set_play_concept(concept)
            && engine.set_coverage(coverage)
            && engine.set_hash_position(self.hash)
            && engine.set_line_of_scrimmage(self.line_of_scrimmage);
        if !setup {
            return Err(ScenarioError::Setup("engine rejected the matchup".to_string()));
        }
        if let Some(code) = &self.personnel {
            if !engine.set_personnel(code) {
                return Err(ScenarioError::Setup(format!("invalid personnel '{code}'")));
            }
        }
        for audible in &self.audibles {
            let id = player_by_label(&engine, &audible.label)?;
            if !engine.audible_route(id, audible.route) {
                return Err(ScenarioError::Setup(format!(
                    "audible {:?} for '{}' rejected",
                    audible.route, audible.label
                )));
            }
        }
        if let Some(plan) = &self.motion {
            let id = player_by_label(&engine, &plan.label)?;
            if !engine.send_in_motion(id, plan.motion) {
                return Err(ScenarioError::Setup(format!("motion for '{}' rejected", plan.label)));
            }
        }
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario_builds() {
        let scenario = Scenario::default();
        let engine = scenario.build_engine(&Playbook::standard()).unwrap();
        assert_eq!(engine.phase(), Phase::PreSnap);
        assert_eq!(engine.game_state().defender_count(), 7);
    }

    #[test]
    fn test_parse_partial_ron() {
        let scenario = Scenario::from_ron_str(
            r#"(
                name: "Red zone",
                concept: "smash",
                coverage: "cover-2",
                line_of_scrimmage: 85,
                hash: Left,
                throw_plan: Target(label: "A", after: 1.2),
                motion: Some((label: "B", motion: Jet)),
            )"#,
        )
        .unwrap();
        assert_eq!(scenario.line_of_scrimmage, 85);
        assert_eq!(scenario.hash, HashMark::Left);
        assert_eq!(scenario.seed, 0);
        assert!(matches!(scenario.throw_plan, ThrowPlan::Target { .. }));
        let engine = scenario.build_engine(&Playbook::standard()).unwrap();
        assert_eq!(engine.game_state().drive.line_of_scrimmage, 85);
        assert_eq!(engine.game_state().players_in_motion(), 1);
    }

    #[test]
    fn test_unknown_concept_is_an_error() {
        let scenario = Scenario {
            concept: "wheel-go".to_string(),
            ..Scenario::default()
        };
        assert!(matches!(
            scenario.build_engine(&Playbook::standard()),
            Err(ScenarioError::Play(PlayError::UnknownTemplate { .. }))
        ));
    }

    #[test]
    fn test_bad_personnel_is_an_error() {
        let scenario = Scenario {
            personnel: Some("33".to_string()),
            ..Scenario::default()
        };
        assert!(matches!(
            scenario.build_engine(&Playbook::standard()),
            Err(ScenarioError::Setup(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quick.ron");
        std::fs::write(&path, r#"(concept: "mesh", coverage: "cover-1", seed: 9)"#).unwrap();
        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.concept, "mesh");
        assert_eq!(scenario.seed, 9);
        assert!(matches!(
            Scenario::load(dir.path().join("missing.ron")),
            Err(ScenarioError::FileNotFound(_))
        ));
    }
}
