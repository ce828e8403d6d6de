//! Offensive formation templates.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::components::{PositionType, Team, MAX_ELIGIBLES};

/// One offensive alignment slot.
///
/// `x` is the lateral offset from the ball (negative = left) and `depth`
/// is yards behind the line of scrimmage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotData {
    /// Slot label ("X", "Z", "Y", "H", "RB"...).
    pub label: String,
    /// Position type occupying the slot.
    pub position: PositionType,
    /// Lateral offset from the ball.
    pub x: f32,
    /// Yards behind the line of scrimmage.
    pub depth: f32,
}

impl SlotData {
    /// Create a slot.
    #[must_use]
    pub fn new(label: impl Into<String>, position: PositionType, x: f32, depth: f32) -> Self {
        Self {
            label: label.into(),
            position,
            x,
            depth,
        }
    }
}

/// Named offensive alignment.
///
/// # Example RON
///
/// ```ron
/// FormationData(
///     name: "doubles",
///     slots: [
///         SlotData(label: "QB", position: Quarterback, x: 0.0, depth: 5.0),
///         SlotData(label: "X", position: WideReceiver, x: -20.0, depth: 0.5),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationData {
    /// Unique formation name.
    pub name: String,
    /// Quarterback plus eligible slots, in id order.
    pub slots: Vec<SlotData>,
}

impl FormationData {
    /// Create a formation from its slots.
    #[must_use]
    pub fn new(name: impl Into<String>, slots: Vec<SlotData>) -> Self {
        Self {
            name: name.into(),
            slots,
        }
    }

    /// Look up a slot by label.
    #[must_use]
    pub fn slot(&self, label: &str) -> Option<&SlotData> {
        self.slots.iter().find(|s| s.label == label)
    }

    /// Count of slots with the given position type.
    #[must_use]
    pub fn count(&self, position: PositionType) -> usize {
        self.slots.iter().filter(|s| s.position == position).count()
    }

    /// Number of non-quarterback slots.
    #[must_use]
    pub fn eligible_count(&self) -> usize {
        self.slots.len() - self.count(PositionType::Quarterback)
    }

    /// Validate the formation and return every problem found.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let qbs = self.count(PositionType::Quarterback);
        if qbs != 1 {
            errors.push(format!(
                "Formation '{}' must have exactly one quarterback, found {qbs}",
                self.name
            ));
        }
        if self.eligible_count() > MAX_ELIGIBLES {
            errors.push(format!(
                "Formation '{}' has {} eligible slots (max {MAX_ELIGIBLES})",
                self.name,
                self.eligible_count()
            ));
        }
        let mut seen = HashSet::new();
        for slot in &self.slots {
            if !seen.insert(slot.label.as_str()) {
                errors.push(format!(
                    "Formation '{}' repeats slot label '{}'",
                    self.name, slot.label
                ));
            }
            if slot.position.team() != Team::Offense {
                errors.push(format!(
                    "Formation '{}' slot '{}' uses defensive position {:?}",
                    self.name, slot.label, slot.position
                ));
            }
            if !(slot.x.is_finite() && slot.depth.is_finite()) || slot.depth < 0.0 {
                errors.push(format!(
                    "Formation '{}' slot '{}' has an invalid alignment",
                    self.name, slot.label
                ));
            }
        }
        errors
    }
}
