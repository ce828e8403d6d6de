//! JSON lines protocol for headless sessions.
//!
//! **Input (stdin):** commands from the controller, one JSON object per line.
//! **Output (stdout):** responses, one JSON object per line.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0"}
//! -> {"cmd":"set_concept","name":"smash"}
//! <- {"type":"ack","cmd":"set_concept"}
//! -> {"cmd":"snap"}
//! <- {"type":"ack","cmd":"snap"}
//! -> {"cmd":"tick","count":90}
//! <- {"type":"state","tick":90,"phase":"PostSnap",...}
//! -> {"cmd":"throw","label":"A"}
//! <- {"type":"ack","cmd":"throw"}
//! ```

use gridiron_core::prelude::*;
use std::result::Result;
use serde::{Deserialize, Serialize};

use crate::batch::VerifyReport;
use crate::metrics::{BatchSummary, DriveMetrics, PlayMetrics};

/// Protocol version reported in the ready line.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (controller -> runner)
// ============================================================================

/// Commands accepted by an interactive session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the play by N ticks (default: 1).
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
    },
    /// Query current state without advancing time.
    Query,
    /// Select a concept from the playbook.
    SetConcept { name: String },
    /// Select a coverage from the playbook.
    SetCoverage { name: String },
    /// Move the line of scrimmage.
    SetLineOfScrimmage { yard: i32 },
    /// Spot the ball on a hash.
    SetHash { hash: HashMark },
    /// Change personnel.
    SetPersonnel { code: String },
    /// Change a route before the snap.
    Audible { label: String, route: RouteType },
    /// Convert a route to a quick route.
    HotRoute { label: String, route: RouteType },
    /// Adjust a route to the defender's cushion.
    SightAdjust { label: String },
    /// Start pre-snap motion.
    Motion { label: String, motion: MotionType },
    /// Walk motion to completion.
    FinishMotion,
    /// Snap the ball.
    Snap,
    /// Throw to a receiver by label.
    Throw { label: String },
    /// Apply the finished play to the drive and set up the next one.
    NextPlay,
    /// Start a new drive.
    Reset,
    /// Restore the state saved at the last snap.
    ReplayFromSnap,
    /// Report the state hash.
    Hash,
    /// End the session.
    Quit,
}

fn default_tick_count() -> u32 {
    1
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::SetConcept { .. } => "set_concept",
            Self::SetCoverage { .. } => "set_coverage",
            Self::SetLineOfScrimmage { .. } => "set_line_of_scrimmage",
            Self::SetHash { .. } => "set_hash",
            Self::SetPersonnel { .. } => "set_personnel",
            Self::Audible { .. } => "audible",
            Self::HotRoute { .. } => "hot_route",
            Self::SightAdjust { .. } => "sight_adjust",
            Self::Motion { .. } => "motion",
            Self::FinishMotion => "finish_motion",
            Self::Snap => "snap",
            Self::Throw { .. } => "throw",
            Self::NextPlay => "next_play",
            Self::Reset => "reset",
            Self::ReplayFromSnap => "replay_from_snap",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

// ============================================================================
// Output Responses (runner -> controller)
// ============================================================================

/// Responses written by the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String },
    /// Acknowledgment of a command.
    Ack { cmd: String },
    /// A command failed or was rejected.
    Error { message: String, cmd: Option<String> },
    /// Current play state.
    State(StateView),
    /// A play finished.
    PlayOver { outcome: PlayOutcome },
    /// Drive moved on to the next play.
    NextPlay { result: DriveResult, drive: DriveState },
    /// Metrics of a single headless play.
    Play { play: PlayMetrics },
    /// Metrics of a whole drive.
    Drive { drive: DriveMetrics },
    /// Batch summary.
    Batch { summary: BatchSummary, errors: usize },
    /// Determinism check.
    Verify { report: VerifyReport },
    /// State hash for determinism verification.
    StateHash { tick: u64, hash: u64 },
    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// One player on the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub label: String,
    pub position_type: PositionType,
    pub x: f32,
    pub y: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsibility: Option<String>,
    pub blocking: bool,
    pub in_motion: bool,
}

/// The ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub x: f32,
    pub y: f32,
    pub state: BallState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PlayerId>,
}

/// Snapshot of a play for the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateView {
    pub tick: u64,
    pub phase: Phase,
    pub elapsed: f32,
    pub sack_time: f32,
    pub pressure: PressureTier,
    pub drive: DriveState,
    pub ball: BallView,
    pub players: Vec<PlayerView>,
    pub hash: u64,
}

impl StateView {
    /// View of `state`.
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        let players = state
            .players
            .iter()
            .map(|p| PlayerView {
                id: p.id,
                label: p.label.clone(),
                position_type: p.position_type,
                x: p.position.x,
                y: p.position.y,
                route: p.route.as_ref().map(|r| r.route_type),
                responsibility: p.responsibility.as_ref().map(|r| format!("{:?}", r.kind)),
                blocking: p.is_blocking,
                in_motion: p.has_motion,
            })
            .collect();
        Self {
            tick: state.tick,
            phase: state.phase,
            elapsed: state.elapsed,
            sack_time: state.sack_time,
            pressure: state.pressure,
            drive: state.drive.clone(),
            ball: BallView {
                x: state.ball.position.x,
                y: state.ball.position.y,
                state: state.ball.state,
                target: state.ball.target,
            },
            players,
            hash: state.state_hash(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready() -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}"}}"#)
        });
        json.push('\n');
        json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tick_command() {
        let cmd = Command::from_json(r#"{"cmd":"tick","count":60}"#).unwrap();
        assert_eq!(cmd, Command::Tick { count: 60 });
    }

    #[test]
    fn test_default_tick_count() {
        let cmd = Command::from_json(r#"{"cmd":"tick"}"#).unwrap();
        assert_eq!(cmd, Command::Tick { count: 1 });
    }

    #[test]
    fn test_parse_motion_and_hash() {
        let cmd = Command::from_json(r#"{"cmd":"motion","label":"B","motion":"Orbit"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Motion {
                label: "B".to_string(),
                motion: MotionType::Orbit
            }
        );
        let cmd = Command::from_json(r#"{"cmd":"set_hash","hash":"Left"}"#).unwrap();
        assert_eq!(cmd.name(), "set_hash");
        assert!(Command::from_json(r#"{"cmd":"blitz"}"#).is_err());
    }

    #[test]
    fn test_state_response_shape() {
        let engine = gridiron_test_utils::fixtures::engine("smash", "cover-2", 1);
        let view = StateView::from_state(engine.state());
        assert_eq!(view.players.len(), 13);
        let json = Response::State(view).to_json_line();
        assert!(json.starts_with(r#"{"type":"state""#));
        assert!(json.contains(r#""phase":"PreSnap""#));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn test_error_line() {
        let json = Response::error("not pre-snap", Some("snap")).to_json_line();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains(r#""cmd":"snap""#));
    }
}
