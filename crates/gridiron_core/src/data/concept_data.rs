//! Route concept templates.

use serde::{Deserialize, Serialize};

use super::formation_data::FormationData;
use crate::components::PositionType;
use crate::error::{PlayError, Result};
use crate::routes::RouteType;

/// Route given to one formation slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAssignment {
    /// Slot label in the concept's formation.
    pub slot: String,
    /// Route to run.
    pub route: RouteType,
    /// Override for the route's break depth.
    #[serde(default)]
    pub depth: Option<f32>,
}

impl RouteAssignment {
    /// Assign `route` to `slot` at its default depth.
    #[must_use]
    pub fn new(slot: impl Into<String>, route: RouteType) -> Self {
        Self {
            slot: slot.into(),
            route,
            depth: None,
        }
    }
}

/// Concept as stored in a playbook: routes keyed to a formation by name.
///
/// # Example RON
///
/// ```ron
/// ConceptData(
///     name: "slant-flat",
///     formation: "doubles",
///     routes: [
///         RouteAssignment(slot: "X", route: Slant),
///         RouteAssignment(slot: "A", route: Flat),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptData {
    /// Unique concept name.
    pub name: String,
    /// Formation the concept is drawn from.
    pub formation: String,
    /// Per-slot routes. Slots without a route block.
    pub routes: Vec<RouteAssignment>,
}

impl ConceptData {
    /// Route assigned to a slot.
    #[must_use]
    pub fn route_for(&self, slot: &str) -> Option<&RouteAssignment> {
        self.routes.iter().find(|r| r.slot == slot)
    }

    /// Resolve the formation reference into a self-contained concept.
    ///
    /// # Errors
    /// Returns [`PlayError::InvalidTemplate`] when the formation name does
    /// not match or a route names a missing or quarterback slot.
    pub fn resolve(&self, formation: &FormationData) -> Result<PlayConcept> {
        let errors = self.validate_against(formation);
        if let Some(reason) = errors.into_iter().next() {
            return Err(PlayError::InvalidTemplate {
                kind: "concept",
                name: self.name.clone(),
                reason,
            });
        }
        Ok(PlayConcept {
            name: self.name.clone(),
            formation: formation.clone(),
            routes: self.routes.clone(),
        })
    }

    /// Check every route against the formation's slots.
    #[must_use]
    pub fn validate_against(&self, formation: &FormationData) -> Vec<String> {
        let mut errors = Vec::new();
        if formation.name != self.formation {
            errors.push(format!(
                "Concept '{}' expects formation '{}', got '{}'",
                self.name, self.formation, formation.name
            ));
        }
        for assignment in &self.routes {
            match formation.slot(&assignment.slot) {
                None => errors.push(format!(
                    "Concept '{}' routes unknown slot '{}'",
                    self.name, assignment.slot
                )),
                Some(slot) if slot.position == PositionType::Quarterback => errors.push(format!(
                    "Concept '{}' gives a route to quarterback slot '{}'",
                    self.name, assignment.slot
                )),
                Some(_) => {}
            }
            if assignment.depth.is_some_and(|d| !d.is_finite()) {
                errors.push(format!(
                    "Concept '{}' slot '{}' has a non-finite depth",
                    self.name, assignment.slot
                ));
            }
        }
        errors
    }
}

/// A concept with its formation inlined, ready for the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayConcept {
    /// Concept name.
    pub name: String,
    /// Formation the concept aligns in.
    pub formation: FormationData,
    /// Per-slot routes.
    pub routes: Vec<RouteAssignment>,
}

impl PlayConcept {
    /// Route assigned to a slot.
    #[must_use]
    pub fn route_for(&self, slot: &str) -> Option<&RouteAssignment> {
        self.routes.iter().find(|r| r.slot == slot)
    }
}
