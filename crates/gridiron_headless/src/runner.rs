//! Headless play runner.
//!
//! Drives a [`PlayEngine`] with fixed steps and a [`Quarterback`] policy,
//! optionally recording every command for later verification.

use gridiron_core::prelude::*;
use std::result::Result;
use thiserror::Error;
use tracing::{debug, info};

use crate::metrics::{DriveMetrics, PlayMetrics};
use crate::quarterback::Quarterback;
use crate::scenario::{Scenario, ScenarioError};

/// Ticks a single play may run before it is declared stalled.
pub const MAX_PLAY_TICKS: u64 = 60 * 15;

/// Plays a drive may run before the runner stops it.
pub const DEFAULT_MAX_PLAYS: u32 = 40;

/// Error type for running plays.
#[derive(Error, Debug)]
pub enum RunError {
    /// Scenario could not be set up.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    /// The engine refused the snap.
    #[error("Snap rejected in phase {0:?}")]
    SnapRejected(Phase),
    /// The play did not finish.
    #[error("Play stalled after {0} ticks")]
    Stalled(u64),
    /// Recording failed.
    #[error(transparent)]
    Play(#[from] PlayError),
}

/// Runs plays for one scenario.
#[derive(Debug)]
pub struct PlayRunner {
    scenario_name: String,
    seed: u64,
    engine: PlayEngine,
    quarterback: Quarterback,
    step: f32,
    recording: Option<PlayRecording>,
}

impl PlayRunner {
    /// Runner for `scenario`, with the engine set up for the snap.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, RunError> {
        let playbook = scenario.playbook()?;
        let engine = scenario.build_engine(&playbook)?;
        let step = engine.config().default_step;
        Ok(Self {
            scenario_name: scenario.name.clone(),
            seed: scenario.seed,
            engine,
            quarterback: Quarterback::new(scenario.throw_plan.clone()),
            step,
            recording: None,
        })
    }

    /// Start recording commands from the current state.
    pub fn start_recording(&mut self) -> Result<(), RunError> {
        self.recording = Some(PlayRecording::new(&self.engine)?);
        Ok(())
    }

    /// Finalize and hand over the recording.
    pub fn take_recording(&mut self) -> Option<PlayRecording> {
        let mut recording = self.recording.take()?;
        recording.finalize(&self.engine);
        Some(recording)
    }

    /// Engine being driven.
    #[must_use]
    pub const fn engine(&self) -> &PlayEngine {
        &self.engine
    }

    fn apply(&mut self, command: PlayCommand) -> bool {
        match self.recording.as_mut() {
            Some(recording) => recording.apply(&mut self.engine, command),
            None => self.engine.apply_command(&command),
        }
    }

    /// Snap, let the quarterback decide each tick, and run to the end.
    pub fn run_play(&mut self) -> Result<PlayMetrics, RunError> {
        let before = self.engine.state().drive.clone();
        while self.apply(PlayCommand::AdvanceMotion(self.step)) {}
        if !self.apply(PlayCommand::Snap) {
            return Err(RunError::SnapRejected(self.engine.phase()));
        }

        let mut ticks = 0;
        while self.engine.phase() != Phase::PlayOver {
            if ticks >= MAX_PLAY_TICKS {
                return Err(RunError::Stalled(ticks));
            }
            if let Some(target) = self.quarterback.decide(self.engine.state()) {
                debug!(target, elapsed = self.engine.state().elapsed, "Quarterback throws");
                self.apply(PlayCommand::Throw(target));
            }
            self.apply(PlayCommand::Tick(self.step));
            ticks += 1;
        }

        PlayMetrics::from_state(&self.scenario_name, self.seed, &before, self.engine.state())
            .ok_or(RunError::Stalled(ticks))
    }

    /// Run plays until the drive ends or `max_plays` is reached.
    pub fn run_drive(&mut self, max_plays: u32) -> Result<DriveMetrics, RunError> {
        let mut drive = DriveMetrics::default();
        for _ in 0..max_plays {
            let play = self.run_play()?;
            let Some(result) = self.engine.advance_to_next_play() else {
                return Err(RunError::Stalled(MAX_PLAY_TICKS));
            };
            debug!(kind = ?play.kind, yards = play.yards, result = ?result, "Drive play");
            drive.record(play, result);
            if result.ends_drive() {
                break;
            }
        }
        info!(
            plays = drive.plays.len(),
            result = ?drive.result,
            total_yards = drive.total_yards,
            "Drive finished"
        );
        Ok(drive)
    }
}

/// Run one play of `scenario`.
pub fn run_scenario(scenario: &Scenario) -> Result<PlayMetrics, RunError> {
    PlayRunner::from_scenario(scenario)?.run_play()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ThrowPlan;

    #[test]
    fn test_no_throw_is_a_sack() {
        let scenario = Scenario {
            throw_plan: ThrowPlan::Never,
            ..Scenario::default()
        };
        let play = run_scenario(&scenario).unwrap();
        assert_eq!(play.kind, OutcomeKind::Sack);
        assert!(play.yards < 0.0);
        assert_eq!(play.receiver, None);
    }

    #[test]
    fn test_most_open_throws() {
        let scenario = Scenario {
            concept: "smash".to_string(),
            coverage: "cover-2".to_string(),
            seed: 3,
            ..Scenario::default()
        };
        let play = run_scenario(&scenario).unwrap();
        assert_ne!(play.kind, OutcomeKind::Sack);
        assert!(play.receiver.is_some());
    }

    #[test]
    fn test_same_seed_same_metrics() {
        let scenario = Scenario {
            seed: 17,
            ..Scenario::default()
        };
        assert_eq!(run_scenario(&scenario).unwrap(), run_scenario(&scenario).unwrap());
    }

    #[test]
    fn test_drive_ends_or_hits_cap() {
        let scenario = Scenario {
            seed: 5,
            ..Scenario::default()
        };
        let mut runner = PlayRunner::from_scenario(&scenario).unwrap();
        let drive = runner.run_drive(12).unwrap();
        assert!(!drive.plays.is_empty());
        assert!(drive.plays.len() <= 12);
        let result = drive.result.unwrap();
        if drive.plays.len() < 12 {
            assert!(result.ends_drive());
        }
    }

    #[test]
    fn test_recording_verifies() {
        let scenario = Scenario {
            concept: "flood".to_string(),
            coverage: "cover-6".to_string(),
            seed: 8,
            ..Scenario::default()
        };
        let mut runner = PlayRunner::from_scenario(&scenario).unwrap();
        runner.start_recording().unwrap();
        runner.run_play().unwrap();
        let hash = runner.engine().state_hash();
        let recording = runner.take_recording().unwrap();
        let mut player = RecordingPlayer::new(recording).unwrap();
        assert_eq!(player.verify().unwrap(), hash);
    }
}
