//! Play recordings.
//!
//! A recording stores the engine configuration, the serialized starting
//! state, the generator position and every command applied afterwards.
//! Re-executing the commands from the same start must land on the same
//! state hash.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::components::PlayerId;
use crate::config::EngineConfig;
use crate::engine::PlayEngine;
use crate::error::{PlayError, Result};
use crate::motion::MotionType;
use crate::rng::SeededRandom;
use crate::routes::RouteType;

/// Recording format version.
pub const PLAY_RECORDING_VERSION: u32 = 1;

/// One caller action against the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayCommand {
    /// Snap the ball.
    Snap,
    /// Throw to a receiver.
    Throw(PlayerId),
    /// Advance the play.
    Tick(f32),
    /// Start pre-snap motion.
    Motion(PlayerId, MotionType),
    /// Walk pre-snap motion.
    AdvanceMotion(f32),
    /// Change a route.
    Audible(PlayerId, RouteType),
    /// Convert to a quick route.
    HotRoute(PlayerId, RouteType),
    /// Adjust a route to the defender's cushion.
    SightAdjustment(PlayerId),
}

/// A recorded play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayRecording {
    /// Format version.
    pub version: u32,
    /// Generator seed.
    pub seed: u64,
    /// Draws already consumed when recording started.
    pub draws: u64,
    /// Engine tuning.
    pub config: EngineConfig,
    /// Serialized starting state.
    pub initial_state: Vec<u8>,
    /// Commands in the order they were applied.
    pub commands: Vec<PlayCommand>,
    /// Tick reached when the recording was finalized.
    pub final_tick: u64,
    /// State hash when the recording was finalized.
    pub final_hash: u64,
}

impl PlayRecording {
    /// Start recording from the engine's current state.
    pub fn new(engine: &PlayEngine<SeededRandom>) -> Result<Self> {
        Ok(Self {
            version: PLAY_RECORDING_VERSION,
            seed: engine.rng().seed(),
            draws: engine.rng().draws(),
            config: engine.config().clone(),
            initial_state: engine.serialize_state()?,
            commands: Vec::new(),
            final_tick: 0,
            final_hash: 0,
        })
    }

    /// Append a command.
    pub fn record(&mut self, command: PlayCommand) {
        self.commands.push(command);
    }

    /// Record `command` and apply it to `engine`.
    pub fn apply(&mut self, engine: &mut PlayEngine<SeededRandom>, command: PlayCommand) -> bool {
        self.record(command);
        engine.apply_command(&command)
    }

    /// Stamp the final tick and hash.
    pub fn finalize(&mut self, engine: &PlayEngine<SeededRandom>) {
        self.final_tick = engine.game_state().tick;
        self.final_hash = engine.state_hash();
        debug!(
            commands = self.commands.len(),
            final_tick = self.final_tick,
            final_hash = self.final_hash,
            "Recording finalized"
        );
    }

    /// Rebuild the engine as it was when recording started.
    pub fn restore_engine(&self) -> Result<PlayEngine<SeededRandom>> {
        let mut engine = PlayEngine::new(
            self.config.clone(),
            SeededRandom::resume(self.seed, self.draws),
        );
        engine.restore_state(&self.initial_state)?;
        Ok(engine)
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| PlayError::Serialization(e.to_string()))
    }

    /// Decode a bincode recording, checking the version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let recording: Self =
            bincode::deserialize(bytes).map_err(|e| PlayError::Serialization(e.to_string()))?;
        if recording.version != PLAY_RECORDING_VERSION {
            return Err(PlayError::VersionMismatch {
                expected: PLAY_RECORDING_VERSION,
                found: recording.version,
            });
        }
        Ok(recording)
    }
}

/// Re-executes a recording.
#[derive(Debug)]
pub struct RecordingPlayer {
    recording: PlayRecording,
    engine: PlayEngine<SeededRandom>,
    cursor: usize,
}

impl RecordingPlayer {
    /// Restore the recording's starting state.
    pub fn new(recording: PlayRecording) -> Result<Self> {
        let engine = recording.restore_engine()?;
        Ok(Self {
            recording,
            engine,
            cursor: 0,
        })
    }

    /// Engine being driven.
    #[must_use]
    pub const fn engine(&self) -> &PlayEngine<SeededRandom> {
        &self.engine
    }

    /// Apply the next command. Returns `None` when the recording is exhausted.
    pub fn step(&mut self) -> Option<bool> {
        let command = *self.recording.commands.get(self.cursor)?;
        self.cursor += 1;
        Some(self.engine.apply_command(&command))
    }

    /// Whether every command has been applied.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.recording.commands.len()
    }

    /// Apply the remaining commands and compare the final hash.
    ///
    /// # Errors
    /// Returns [`PlayError::DesyncDetected`] when the hash differs.
    pub fn verify(&mut self) -> Result<u64> {
        while self.step().is_some() {}
        let replayed = self.engine.state_hash();
        if replayed != self.recording.final_hash {
            let tick = self.engine.game_state().tick;
            warn!(
                tick,
                recorded = self.recording.final_hash,
                replayed,
                "Recording desync"
            );
            return Err(PlayError::DesyncDetected {
                tick,
                recorded: self.recording.final_hash,
                replayed,
            });
        }
        Ok(replayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Playbook;

    fn engine() -> PlayEngine<SeededRandom> {
        let playbook = Playbook::standard();
        let mut engine = PlayEngine::with_seed(77);
        engine.set_play_concept(playbook.concept("smash").unwrap());
        engine.set_coverage(playbook.coverage("cover-2").unwrap().clone());
        engine
    }

    fn record_play(engine: &mut PlayEngine<SeededRandom>) -> PlayRecording {
        let mut recording = PlayRecording::new(engine).unwrap();
        recording.apply(engine, PlayCommand::Motion(2, MotionType::Shift));
        for _ in 0..20 {
            recording.apply(engine, PlayCommand::AdvanceMotion(1.0 / 60.0));
        }
        recording.apply(engine, PlayCommand::Snap);
        for _ in 0..60 {
            recording.apply(engine, PlayCommand::Tick(1.0 / 60.0));
        }
        recording.apply(engine, PlayCommand::Throw(3));
        for _ in 0..240 {
            recording.apply(engine, PlayCommand::Tick(1.0 / 60.0));
        }
        recording.finalize(engine);
        recording
    }

    #[test]
    fn test_recording_replays_to_same_hash() {
        let mut live = engine();
        let recording = record_play(&mut live);
        let bytes = recording.to_bytes().unwrap();
        let mut player = RecordingPlayer::new(PlayRecording::from_bytes(&bytes).unwrap()).unwrap();
        assert_eq!(player.verify().unwrap(), live.state_hash());
        assert!(player.is_finished());
    }

    #[test]
    fn test_tampered_recording_desyncs() {
        let mut live = engine();
        let mut recording = record_play(&mut live);
        recording.commands.retain(|c| !matches!(c, PlayCommand::Throw(_)));
        let mut player = RecordingPlayer::new(recording).unwrap();
        assert!(matches!(
            player.verify(),
            Err(PlayError::DesyncDetected { .. })
        ));
    }

    #[test]
    fn test_version_mismatch() {
        let mut recording = PlayRecording::new(&engine()).unwrap();
        recording.version = PLAY_RECORDING_VERSION + 1;
        let bytes = recording.to_bytes().unwrap();
        assert!(matches!(
            PlayRecording::from_bytes(&bytes),
            Err(PlayError::VersionMismatch { .. })
        ));
    }
}
