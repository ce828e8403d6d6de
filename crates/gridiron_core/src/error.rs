//! Error types for the play simulation.
//!
//! Gameplay rule violations (wrong phase, invalid target, audible limit)
//! are not errors: those operations return `false` and leave state as it
//! was. [`PlayError`] covers data and persistence failures only.

use thiserror::Error;

/// Result type alias using [`PlayError`].
pub type Result<T> = std::result::Result<T, PlayError>;

/// Top-level error type for data, configuration and persistence failures.
#[derive(Debug, Error)]
pub enum PlayError {
    /// Data file parsing error.
    #[error("Failed to parse {kind} data: {message}")]
    DataParseError {
        /// What was being parsed (formation, coverage, config...).
        kind: &'static str,
        /// Parser message.
        message: String,
    },

    /// Template data parsed but failed validation.
    #[error("Invalid {kind} '{name}': {reason}")]
    InvalidTemplate {
        /// Template kind.
        kind: &'static str,
        /// Template name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Template name not present in the playbook.
    #[error("Unknown {kind}: {name}")]
    UnknownTemplate {
        /// Template kind.
        kind: &'static str,
        /// Requested name.
        name: String,
    },

    /// Engine configuration out of range.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// State (de)serialization failure.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Recording format version mismatch.
    #[error("Recording version mismatch: expected {expected}, got {found}")]
    VersionMismatch {
        /// Version this build understands.
        expected: u32,
        /// Version found in the data.
        found: u32,
    },

    /// Play re-execution diverged from the recorded result.
    #[error("Desync detected at tick {tick}: recorded hash {recorded}, replayed hash {replayed}")]
    DesyncDetected {
        /// Tick where the comparison was made.
        tick: u64,
        /// Hash stored in the recording.
        recorded: u64,
        /// Hash produced by re-execution.
        replayed: u64,
    },
}
