//! Template data for formations, concepts and coverages.
//!
//! These are the plain, read-only templates the engine consumes. All of
//! them deserialize from RON; the built-in playbook is constructed in code.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `gridiron_headless` and `gridiron_tools`.

mod concept_data;
mod coverage_data;
mod formation_data;
mod playbook;

pub use concept_data::{ConceptData, PlayConcept, RouteAssignment};
pub use coverage_data::{CoverageData, DisguiseData, InvertData, StaticPosition};
pub use formation_data::{FormationData, SlotData};
pub use playbook::Playbook;
