//! Named collections of formations, concepts and coverages.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::concept_data::{ConceptData, PlayConcept, RouteAssignment};
use super::coverage_data::CoverageData;
use super::formation_data::{FormationData, SlotData};
use crate::components::PositionType;
use crate::coverage::CoverageFamily;
use crate::error::{PlayError, Result};
use crate::routes::RouteType;

/// A playbook of templates.
///
/// # Example RON
///
/// ```ron
/// Playbook(
///     formations: [FormationData(name: "doubles", slots: [...])],
///     concepts: [ConceptData(name: "slant-flat", formation: "doubles", routes: [...])],
///     coverages: [CoverageData(name: "cover-3", family: Cover3)],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playbook {
    /// Offensive formations.
    #[serde(default)]
    pub formations: Vec<FormationData>,
    /// Route concepts.
    #[serde(default)]
    pub concepts: Vec<ConceptData>,
    /// Coverage calls.
    #[serde(default)]
    pub coverages: Vec<CoverageData>,
}

impl Playbook {
    /// Parse a playbook from RON.
    ///
    /// # Errors
    /// Returns [`PlayError::DataParseError`] on malformed RON.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        ron::from_str(ron).map_err(|e| PlayError::DataParseError {
            kind: "playbook",
            message: e.to_string(),
        })
    }

    /// Serialize to pretty RON.
    ///
    /// # Errors
    /// Returns [`PlayError::Serialization`] if encoding fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| PlayError::Serialization(e.to_string()))
    }

    /// Formation by name.
    #[must_use]
    pub fn formation(&self, name: &str) -> Option<&FormationData> {
        self.formations.iter().find(|f| f.name == name)
    }

    /// Coverage by name.
    #[must_use]
    pub fn coverage(&self, name: &str) -> Option<&CoverageData> {
        self.coverages.iter().find(|c| c.name == name)
    }

    /// Concept by name with its formation resolved.
    ///
    /// Returns `None` when the concept or its formation is missing or
    /// when the routes do not fit the formation.
    #[must_use]
    pub fn concept(&self, name: &str) -> Option<PlayConcept> {
        let data = self.concepts.iter().find(|c| c.name == name)?;
        let formation = self.formation(&data.formation)?;
        data.resolve(formation).ok()
    }

    /// Concept lookup that reports why it failed.
    ///
    /// # Errors
    /// Returns [`PlayError::UnknownTemplate`] for missing names and
    /// [`PlayError::InvalidTemplate`] for routes that do not fit.
    pub fn require_concept(&self, name: &str) -> Result<PlayConcept> {
        let data = self
            .concepts
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PlayError::UnknownTemplate {
                kind: "concept",
                name: name.to_string(),
            })?;
        let formation =
            self.formation(&data.formation)
                .ok_or_else(|| PlayError::UnknownTemplate {
                    kind: "formation",
                    name: data.formation.clone(),
                })?;
        data.resolve(formation)
    }

    /// Coverage lookup that reports a missing name.
    ///
    /// # Errors
    /// Returns [`PlayError::UnknownTemplate`] for missing names.
    pub fn require_coverage(&self, name: &str) -> Result<CoverageData> {
        self.coverage(name)
            .cloned()
            .ok_or_else(|| PlayError::UnknownTemplate {
                kind: "coverage",
                name: name.to_string(),
            })
    }

    /// Concept names in playbook order.
    pub fn concept_names(&self) -> impl Iterator<Item = &str> {
        self.concepts.iter().map(|c| c.name.as_str())
    }

    /// Coverage names in playbook order.
    pub fn coverage_names(&self) -> impl Iterator<Item = &str> {
        self.coverages.iter().map(|c| c.name.as_str())
    }

    /// Add every template from `other`, replacing same-named entries.
    pub fn merge(&mut self, other: Self) {
        for formation in other.formations {
            self.formations.retain(|f| f.name != formation.name);
            self.formations.push(formation);
        }
        for concept in other.concepts {
            self.concepts.retain(|c| c.name != concept.name);
            self.concepts.push(concept);
        }
        for coverage in other.coverages {
            self.coverages.retain(|c| c.name != coverage.name);
            self.coverages.push(coverage);
        }
    }

    /// Validate every template and cross reference.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_unique("formation", self.formations.iter().map(|f| &f.name), &mut errors);
        check_unique("concept", self.concepts.iter().map(|c| &c.name), &mut errors);
        check_unique("coverage", self.coverages.iter().map(|c| &c.name), &mut errors);
        for formation in &self.formations {
            errors.extend(formation.validate());
        }
        for concept in &self.concepts {
            match self.formation(&concept.formation) {
                Some(formation) => errors.extend(concept.validate_against(formation)),
                None => errors.push(format!(
                    "Concept '{}' references unknown formation '{}'",
                    concept.name, concept.formation
                )),
            }
        }
        for coverage in &self.coverages {
            errors.extend(coverage.validate());
        }
        errors
    }

    /// The built-in playbook.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            formations: standard_formations(),
            concepts: standard_concepts(),
            coverages: standard_coverages(),
        }
    }
}

fn check_unique<'a>(
    kind: &str,
    names: impl Iterator<Item = &'a String>,
    errors: &mut Vec<String>,
) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            errors.push(format!("Duplicate {kind} name '{name}'"));
        }
    }
}

fn standard_formations() -> Vec<FormationData> {
    use PositionType::{Quarterback as QB, RunningBack as RB, TightEnd as TE, WideReceiver as WR};
    vec![
        FormationData::new(
            "doubles",
            vec![
                SlotData::new("QB", QB, 0.0, 5.0),
                SlotData::new("X", WR, -20.0, 0.5),
                SlotData::new("A", WR, -12.0, 1.0),
                SlotData::new("B", WR, 12.0, 1.0),
                SlotData::new("Z", WR, 20.0, 0.5),
                SlotData::new("RB", RB, -1.5, 5.0),
            ],
        ),
        FormationData::new(
            "trips-right",
            vec![
                SlotData::new("QB", QB, 0.0, 5.0),
                SlotData::new("X", WR, -20.0, 0.5),
                SlotData::new("Y", TE, 4.0, 0.5),
                SlotData::new("H", WR, 12.0, 1.0),
                SlotData::new("Z", WR, 20.0, 0.5),
                SlotData::new("RB", RB, -1.5, 5.0),
            ],
        ),
        FormationData::new(
            "bunch-left",
            vec![
                SlotData::new("QB", QB, 0.0, 5.0),
                SlotData::new("X", WR, -9.0, 0.5),
                SlotData::new("A", WR, -10.0, 2.0),
                SlotData::new("Y", TE, -12.0, 1.0),
                SlotData::new("Z", WR, 20.0, 0.5),
                SlotData::new("RB", RB, 1.5, 5.0),
            ],
        ),
        FormationData::new(
            "i-form",
            vec![
                SlotData::new("QB", QB, 0.0, 1.0),
                SlotData::new("X", WR, -20.0, 0.5),
                SlotData::new("Y", TE, 4.0, 0.5),
                SlotData::new("Z", WR, 18.0, 1.0),
                SlotData::new("FB", RB, 0.0, 4.0),
                SlotData::new("TB", RB, 0.0, 7.0),
            ],
        ),
        FormationData::new(
            "empty",
            vec![
                SlotData::new("QB", QB, 0.0, 5.0),
                SlotData::new("X", WR, -21.0, 0.5),
                SlotData::new("H", WR, -14.0, 1.0),
                SlotData::new("Y", WR, -7.0, 1.0),
                SlotData::new("F", WR, 14.0, 1.0),
                SlotData::new("Z", WR, 21.0, 0.5),
            ],
        ),
    ]
}

fn concept(name: &str, formation: &str, routes: &[(&str, RouteType)]) -> ConceptData {
    ConceptData {
        name: name.to_string(),
        formation: formation.to_string(),
        routes: routes
            .iter()
            .map(|(slot, route)| RouteAssignment::new(*slot, *route))
            .collect(),
    }
}

fn standard_concepts() -> Vec<ConceptData> {
    use RouteType::{Block, Corner, Curl, Drag, Flat, Go, Hitch, Out, Post, Seam, Slant};
    vec![
        concept(
            "slant-flat",
            "doubles",
            &[("X", Slant), ("A", Flat), ("B", Flat), ("Z", Slant), ("RB", Block)],
        ),
        concept(
            "smash",
            "doubles",
            &[("X", Hitch), ("A", Corner), ("B", Corner), ("Z", Hitch), ("RB", Block)],
        ),
        concept(
            "flood",
            "trips-right",
            &[("X", Post), ("Y", Flat), ("H", Out), ("Z", Go), ("RB", Block)],
        ),
        concept(
            "mesh",
            "doubles",
            &[("X", Go), ("A", Drag), ("B", Drag), ("Z", Curl), ("RB", Block)],
        ),
        concept(
            "four-verts",
            "doubles",
            &[("X", Go), ("A", Seam), ("B", Seam), ("Z", Go), ("RB", Block)],
        ),
        concept(
            "trips-seam",
            "trips-right",
            &[("X", Curl), ("Y", Seam), ("H", Out), ("Z", Go), ("RB", Block)],
        ),
    ]
}

fn standard_coverages() -> Vec<CoverageData> {
    use CoverageFamily::{Cover0, Cover1, Cover2, Cover3, Cover4, Cover6, Tampa2};
    vec![
        CoverageData::new("cover-0", Cover0),
        CoverageData::new("cover-1", Cover1),
        CoverageData::new("cover-1-robber", Cover1).with_robber("SS"),
        CoverageData::new("cover-2", Cover2),
        CoverageData::new("cover-2-invert", Cover2).with_invert(None, 0.5),
        CoverageData::new("tampa-2", Tampa2),
        CoverageData::new("cover-3", Cover3),
        CoverageData::new("cover-3-buzz-disguise", Cover3).with_disguise(Cover2, 0.6),
        CoverageData::new("cover-4", Cover4),
        CoverageData::new("cover-6", Cover6),
    ]
}
