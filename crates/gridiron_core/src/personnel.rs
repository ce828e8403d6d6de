//! Offensive personnel groupings and defensive packages.

use serde::{Deserialize, Serialize};

use crate::components::PositionType;
use crate::data::SlotData;
use crate::formation::BACKFIELD_DEPTH;

/// Every defender label any package can field.
pub const KNOWN_DEFENDER_LABELS: [&str; 9] =
    ["LCB", "RCB", "NB", "DB", "FS", "SS", "WLB", "MLB", "SLB"];

/// Backfield spots (lateral offset, depth) used when a grouping needs
/// more running backs than the formation has backfield slots.
const BACKFIELD_SPOTS: [(f32, f32); 3] = [(0.0, 7.0), (-2.5, 5.0), (2.5, 5.0)];

/// Running back and tight end counts ("11" = one of each).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffensivePersonnel {
    /// Running backs.
    pub running_backs: u8,
    /// Tight ends.
    pub tight_ends: u8,
}

impl OffensivePersonnel {
    /// Parse a two-digit code against the number of eligible slots.
    ///
    /// Returns `None` for anything that is not exactly two digits or that
    /// asks for more backs and tight ends than there are slots.
    #[must_use]
    pub fn parse(code: &str, eligible_slots: usize) -> Option<Self> {
        let mut digits = code.chars().map(|c| c.to_digit(10));
        let rb = digits.next()??;
        let te = digits.next()??;
        if digits.next().is_some() || (rb + te) as usize > eligible_slots {
            return None;
        }
        Some(Self {
            running_backs: u8::try_from(rb).ok()?,
            tight_ends: u8::try_from(te).ok()?,
        })
    }

    /// Code string, e.g. `"11"`.
    #[must_use]
    pub fn code(&self) -> String {
        format!("{}{}", self.running_backs, self.tight_ends)
    }

    /// Retype formation slots to match this grouping.
    ///
    /// Backfield slots become running backs first, then the innermost
    /// attached slots become tight ends; everyone else is a receiver.
    /// Backs beyond the formation's backfield slots are moved into the
    /// backfield, and surplus backfield slots flex out as wings.
    pub fn apply(&self, slots: &mut [SlotData]) {
        let mut eligible: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.position != PositionType::Quarterback)
            .map(|(i, _)| i)
            .collect();
        // Deepest first, then innermost.
        eligible.sort_by(|&a, &b| {
            let (sa, sb) = (&slots[a], &slots[b]);
            let back_a = sa.depth >= BACKFIELD_DEPTH;
            let back_b = sb.depth >= BACKFIELD_DEPTH;
            back_b
                .cmp(&back_a)
                .then(sa.x.abs().total_cmp(&sb.x.abs()))
                .then(a.cmp(&b))
        });

        let rb = usize::from(self.running_backs);
        let te = usize::from(self.tight_ends);
        let mut spot = 0;
        let mut wing_side = 1.0;
        for (rank, &index) in eligible.iter().enumerate() {
            let slot = &mut slots[index];
            let in_backfield = slot.depth >= BACKFIELD_DEPTH;
            if rank < rb {
                slot.position = PositionType::RunningBack;
                if !in_backfield {
                    let (x, depth) = BACKFIELD_SPOTS[spot % BACKFIELD_SPOTS.len()];
                    slot.x = x;
                    slot.depth = depth;
                    spot += 1;
                }
            } else {
                slot.position = if rank < rb + te {
                    PositionType::TightEnd
                } else {
                    PositionType::WideReceiver
                };
                if in_backfield {
                    slot.x = 6.0 * wing_side;
                    slot.depth = 1.0;
                    wing_side = -wing_side;
                }
            }
        }
    }
}

/// Defensive personnel package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefensivePackage {
    /// Two corners, two safeties, three linebackers.
    Base,
    /// Slot corner in for a linebacker.
    Nickel,
    /// Two slot defenders, one linebacker.
    Dime,
}

impl DefensivePackage {
    /// Package that matches a count of wide receivers.
    #[must_use]
    pub const fn for_receivers(wide_receivers: usize) -> Self {
        match wide_receivers {
            0..=2 => Self::Base,
            3 => Self::Nickel,
            _ => Self::Dime,
        }
    }

    /// Seven-man roster in id order.
    #[must_use]
    pub const fn roster(self) -> [(&'static str, PositionType); 7] {
        use PositionType::{Cornerback as CB, Linebacker as LB, Nickel as NB, Safety as S};
        match self {
            Self::Base => [
                ("LCB", CB),
                ("RCB", CB),
                ("FS", S),
                ("SS", S),
                ("WLB", LB),
                ("MLB", LB),
                ("SLB", LB),
            ],
            Self::Nickel => [
                ("LCB", CB),
                ("RCB", CB),
                ("NB", NB),
                ("FS", S),
                ("SS", S),
                ("WLB", LB),
                ("MLB", LB),
            ],
            Self::Dime => [
                ("LCB", CB),
                ("RCB", CB),
                ("NB", NB),
                ("DB", NB),
                ("FS", S),
                ("SS", S),
                ("MLB", LB),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots() -> Vec<SlotData> {
        vec![
            SlotData::new("QB", PositionType::Quarterback, 0.0, 5.0),
            SlotData::new("X", PositionType::WideReceiver, -20.0, 0.5),
            SlotData::new("A", PositionType::WideReceiver, -12.0, 1.0),
            SlotData::new("B", PositionType::WideReceiver, 12.0, 1.0),
            SlotData::new("Z", PositionType::WideReceiver, 20.0, 0.5),
            SlotData::new("RB", PositionType::RunningBack, -1.5, 5.0),
        ]
    }

    #[test]
    fn test_parse_codes() {
        assert_eq!(
            OffensivePersonnel::parse("11", 5),
            Some(OffensivePersonnel {
                running_backs: 1,
                tight_ends: 1
            })
        );
        assert!(OffensivePersonnel::parse("1", 5).is_none());
        assert!(OffensivePersonnel::parse("111", 5).is_none());
        assert!(OffensivePersonnel::parse("a1", 5).is_none());
        assert!(OffensivePersonnel::parse("33", 5).is_none());
        assert_eq!(OffensivePersonnel::parse("10", 5).unwrap().code(), "10");
    }

    #[test]
    fn test_apply_retypes_innermost_as_tight_end() {
        let mut s = slots();
        OffensivePersonnel::parse("11", 5).unwrap().apply(&mut s);
        assert_eq!(s[5].position, PositionType::RunningBack);
        let tight_ends: Vec<_> = s
            .iter()
            .filter(|x| x.position == PositionType::TightEnd)
            .collect();
        assert_eq!(tight_ends.len(), 1);
        assert!((tight_ends[0].x.abs() - 12.0).abs() < f32::EPSILON);
        assert_eq!(s[0].position, PositionType::Quarterback);
    }

    #[test]
    fn test_apply_moves_extra_backs_into_backfield() {
        let mut s = slots();
        OffensivePersonnel::parse("21", 5).unwrap().apply(&mut s);
        let backs: Vec<_> = s
            .iter()
            .filter(|x| x.position == PositionType::RunningBack)
            .collect();
        assert_eq!(backs.len(), 2);
        assert!(backs.iter().all(|b| b.depth >= BACKFIELD_DEPTH));
    }

    #[test]
    fn test_apply_flexes_surplus_back() {
        let mut s = slots();
        OffensivePersonnel::parse("01", 5).unwrap().apply(&mut s);
        assert!(s.iter().all(|x| x.position != PositionType::RunningBack));
        assert!(s[5].depth < BACKFIELD_DEPTH);
    }

    #[test]
    fn test_package_matching() {
        assert_eq!(DefensivePackage::for_receivers(2), DefensivePackage::Base);
        assert_eq!(DefensivePackage::for_receivers(3), DefensivePackage::Nickel);
        assert_eq!(DefensivePackage::for_receivers(5), DefensivePackage::Dime);
        for package in [
            DefensivePackage::Base,
            DefensivePackage::Nickel,
            DefensivePackage::Dime,
        ] {
            let roster = package.roster();
            assert_eq!(roster.len(), 7);
            assert!(roster
                .iter()
                .all(|(label, _)| KNOWN_DEFENDER_LABELS.contains(label)));
        }
    }
}
