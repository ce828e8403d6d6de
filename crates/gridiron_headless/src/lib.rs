//! Headless play runner for batch evaluation and CI verification.
//!
//! Runs plays without a renderer. This enables:
//!
//! - **Controller testing**: an external agent calls plays over JSON lines
//! - **Batch evaluation**: many seeds of one matchup, summarized
//! - **Determinism checks**: repeated runs and recording re-execution
//!
//! # Protocol
//!
//! - **stdin**: Commands from the controller (snap, tick, throw, ...)
//! - **stdout**: State and results (JSON lines)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] for the command and response formats.
//!
//! # Example
//!
//! ```bash
//! # Interactive session
//! echo '{"cmd":"snap"}' | cargo run -p gridiron_headless -- session
//!
//! # One play from a scenario file
//! cargo run -p gridiron_headless -- run --scenario scenarios/red_zone_smash.ron
//!
//! # 1000 seeds in parallel
//! cargo run -p gridiron_headless -- batch --concept flood --coverage cover-3 --count 1000
//! ```

pub mod batch;
pub mod metrics;
pub mod protocol;
pub mod quarterback;
pub mod runner;
pub mod scenario;
pub mod session;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, VerifyReport};
pub use metrics::{BatchSummary, DriveMetrics, PlayMetrics};
pub use protocol::{Command, Response};
pub use quarterback::Quarterback;
pub use runner::{run_scenario, PlayRunner, RunError};
pub use scenario::{Scenario, ScenarioError, ThrowPlan};
pub use session::Session;
