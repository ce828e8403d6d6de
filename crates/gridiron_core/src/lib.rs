//! # Gridiron Core
//!
//! Deterministic passing-play simulation: one offense running a route
//! concept against seven defenders playing a coverage call.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No system randomness (every draw goes through [`rng::RandomSource`])
//! - No scheduler: callers drive [`engine::PlayEngine::tick`] themselves
//!
//! This separation enables:
//! - Headless batch runs
//! - Play recordings that re-execute bit for bit
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`engine`] - The play controller and phase state machine
//! - [`state`] - The [`state::GameState`] aggregate
//! - [`alignment`] / [`schemes`] - Pre-snap defensive alignment per coverage family
//! - [`movement`] - Per-tick route running, blocking and coverage pursuit
//! - [`pattern_match`] / [`behaviors`] - Post-snap coverage adjustments
//! - [`ball`] / [`outcome`] / [`pressure`] - Ball flight, catch resolution, sack clock
//! - [`drive`] - Down and distance between plays
//! - [`data`] - Formation, concept and coverage templates

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod alignment;
pub mod ball;
pub mod behaviors;
pub mod components;
pub mod config;
pub mod coverage;
pub mod data;
pub mod drive;
pub mod engine;
pub mod error;
pub mod field;
pub mod formation;
pub mod math;
pub mod motion;
pub mod movement;
pub mod outcome;
pub mod pattern_match;
pub mod personnel;
pub mod pressure;
pub mod replay;
pub mod rng;
pub mod routes;
pub mod schemes;
pub mod state;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{EngineConfig, TICK_RATE};
    pub use crate::coverage::{CoverageFamily, CoverageResponsibility, ResponsibilityKind, ZoneKind};
    pub use crate::data::{CoverageData, FormationData, PlayConcept, Playbook};
    pub use crate::drive::{DriveResult, DriveState};
    pub use crate::engine::PlayEngine;
    pub use crate::error::{PlayError, Result};
    pub use crate::field::{HashMark, Side};
    pub use crate::math::Vec2;
    pub use crate::motion::MotionType;
    pub use crate::outcome::{OutcomeKind, PlayOutcome};
    pub use crate::pressure::PressureTier;
    pub use crate::replay::{PlayCommand, PlayRecording, RecordingPlayer};
    pub use crate::rng::{RandomSource, ScriptedRandom, SeededRandom};
    pub use crate::routes::{Route, RouteType};
    pub use crate::state::GameState;
}
