//! Coverage families, zones and defender responsibilities.
//!
//! Zone landmarks come from one canonical table ([`ZoneKind::landmark`])
//! shared by every family: center offset from the ball and the line of
//! scrimmage plus the zone's width and depth.

use serde::{Deserialize, Serialize};

use crate::components::PlayerId;
use crate::field::{Side, FIELD_WIDTH};
use crate::math::Vec2;

/// Named defensive scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageFamily {
    /// All-out man, no deep help.
    Cover0,
    /// Man under a single deep safety.
    Cover1,
    /// Two deep halves, five underneath.
    Cover2,
    /// Cover 2 with the middle linebacker running the deep hole.
    Tampa2,
    /// Three deep, four underneath.
    Cover3,
    /// Pattern-matching quarters.
    Cover4,
    /// Quarters to the strength, Cover 2 to the weak side.
    Cover6,
}

impl CoverageFamily {
    /// Every family, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Cover0,
        Self::Cover1,
        Self::Cover2,
        Self::Tampa2,
        Self::Cover3,
        Self::Cover4,
        Self::Cover6,
    ];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cover0 => "Cover 0",
            Self::Cover1 => "Cover 1",
            Self::Cover2 => "Cover 2",
            Self::Tampa2 => "Tampa 2",
            Self::Cover3 => "Cover 3",
            Self::Cover4 => "Cover 4",
            Self::Cover6 => "Cover 6",
        }
    }

    /// Families built on man coverage underneath.
    #[must_use]
    pub const fn is_man(self) -> bool {
        matches!(self, Self::Cover0 | Self::Cover1)
    }

    /// Number of safeties aligned deep.
    #[must_use]
    pub const fn deep_safeties(self) -> usize {
        match self {
            Self::Cover0 => 0,
            Self::Cover1 | Self::Cover3 => 1,
            Self::Cover2 | Self::Tampa2 | Self::Cover4 | Self::Cover6 => 2,
        }
    }
}

// ============================================================================
// Zones
// ============================================================================

/// Canonical zone landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Single-high middle of the field.
    DeepMiddle,
    /// Outside deep third.
    DeepThird(Side),
    /// Deep half.
    DeepHalf(Side),
    /// Outside deep quarter.
    DeepQuarter(Side),
    /// Inside deep quarter.
    InnerQuarter(Side),
    /// Flat.
    Flat(Side),
    /// Curl to flat.
    CurlFlat(Side),
    /// Curl.
    Curl(Side),
    /// Hook.
    Hook(Side),
    /// Middle hook (low hole).
    MiddleHook,
    /// Tampa 2 deep hole.
    Hole,
    /// Robber / lurk landmark.
    Robber,
}

impl ZoneKind {
    /// `(lateral offset from ball, depth past LOS, width, depth)`.
    #[must_use]
    pub fn landmark(self) -> (f32, f32, f32, f32) {
        match self {
            Self::DeepMiddle => (0.0, 16.0, 18.0, 20.0),
            Self::DeepThird(side) => (17.0 * side.sign(), 14.0, 18.0, 24.0),
            Self::DeepHalf(side) => (12.0 * side.sign(), 15.0, 26.0, 24.0),
            Self::DeepQuarter(side) => (20.0 * side.sign(), 13.0, 13.0, 22.0),
            Self::InnerQuarter(side) => (7.0 * side.sign(), 14.0, 13.0, 22.0),
            Self::Flat(side) => (20.0 * side.sign(), 4.0, 12.0, 8.0),
            Self::CurlFlat(side) => (14.0 * side.sign(), 7.0, 12.0, 10.0),
            Self::Curl(side) => (9.0 * side.sign(), 8.0, 10.0, 10.0),
            Self::Hook(side) => (4.0 * side.sign(), 8.0, 9.0, 8.0),
            Self::MiddleHook => (0.0, 7.0, 10.0, 8.0),
            Self::Hole => (0.0, 15.0, 10.0, 10.0),
            Self::Robber => (0.0, 9.0, 12.0, 8.0),
        }
    }

    /// Deep-coverage zones (deeper-than-deepest applies).
    #[must_use]
    pub const fn is_deep(self) -> bool {
        matches!(
            self,
            Self::DeepMiddle
                | Self::DeepThird(_)
                | Self::DeepHalf(_)
                | Self::DeepQuarter(_)
                | Self::InnerQuarter(_)
                | Self::Hole
        )
    }

    /// Side the zone is anchored to, if any.
    #[must_use]
    pub const fn side(self) -> Option<Side> {
        match self {
            Self::DeepThird(s)
            | Self::DeepHalf(s)
            | Self::DeepQuarter(s)
            | Self::InnerQuarter(s)
            | Self::Flat(s)
            | Self::CurlFlat(s)
            | Self::Curl(s)
            | Self::Hook(s) => Some(s),
            Self::DeepMiddle | Self::MiddleHook | Self::Hole | Self::Robber => None,
        }
    }
}

/// A rectangular area a zone defender is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Landmark this zone was built from.
    pub kind: ZoneKind,
    /// Center in field coordinates.
    pub center: Vec2,
    /// Sideline-to-sideline extent.
    pub width: f32,
    /// Downfield extent.
    pub depth: f32,
}

impl Zone {
    /// Build the canonical zone for a ball spot and line of scrimmage.
    #[must_use]
    pub fn landmark(kind: ZoneKind, ball_x: f32, los_y: f32) -> Self {
        let (dx, dy, width, depth) = kind.landmark();
        let x = (ball_x + dx).clamp(width.min(FIELD_WIDTH) / 4.0, FIELD_WIDTH - width / 4.0);
        Self {
            kind,
            center: Vec2::new(x, los_y + dy),
            width,
            depth,
        }
    }

    /// Whether `point` lies inside the zone.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.contains_scaled(point, 1.0)
    }

    /// Containment with the width scaled by `width_scale`.
    #[must_use]
    pub fn contains_scaled(&self, point: Vec2, width_scale: f32) -> bool {
        (point.x - self.center.x).abs() <= self.width * width_scale / 2.0
            && (point.y - self.center.y).abs() <= self.depth / 2.0
    }

    /// Clamp `point` into the zone rectangle.
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        let hw = self.width / 2.0;
        let hd = self.depth / 2.0;
        Vec2::new(
            point.x.clamp(self.center.x - hw, self.center.x + hw),
            point.y.clamp(self.center.y - hd, self.center.y + hd),
        )
    }
}

// ============================================================================
// Responsibilities
// ============================================================================

/// Man-coverage leverage relative to the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Leverage {
    /// Shade toward the ball.
    Inside,
    /// Shade toward the sideline.
    Outside,
    /// Head up and close, jamming at the line.
    Press,
}

/// Role within a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BracketRole {
    /// Plays underneath the receiver.
    Under,
    /// Plays over the top.
    Over,
}

/// Double coverage shared with a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bracket {
    /// The other defender in the bracket.
    pub partner: PlayerId,
    /// This defender's half of it.
    pub role: BracketRole,
}

/// Read a zone defender plays off of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneRead {
    /// Sit in the middle and drive on the quarterback's eyes.
    Robber,
    /// Low hole defender jumping crossers.
    Lurk,
    /// Safety keyed on a receiver, jumping him when he breaks inside.
    Poach {
        /// Receiver being read.
        key: PlayerId,
    },
    /// Tampa runner carrying the deepest middle threat.
    Hole,
}

/// Pass-rush lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RushLane {
    /// Center-guard gap.
    A(Side),
    /// Guard-tackle gap.
    B(Side),
    /// Outside the tackle.
    C(Side),
    /// Wide edge.
    Edge(Side),
}

impl RushLane {
    /// Lateral offset of the lane entry point from the ball.
    #[must_use]
    pub fn offset(self) -> f32 {
        match self {
            Self::A(s) => 1.5 * s.sign(),
            Self::B(s) => 3.5 * s.sign(),
            Self::C(s) => 5.5 * s.sign(),
            Self::Edge(s) => 8.0 * s.sign(),
        }
    }

    /// Lane closest to a lateral alignment.
    #[must_use]
    pub fn nearest(x: f32, ball_x: f32) -> Self {
        let side = Side::of(x, ball_x);
        let dx = (x - ball_x).abs();
        if dx < 2.5 {
            Self::A(side)
        } else if dx < 4.5 {
            Self::B(side)
        } else if dx < 7.0 {
            Self::C(side)
        } else {
            Self::Edge(side)
        }
    }

    /// Side of the ball the lane is on.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::A(s) | Self::B(s) | Self::C(s) | Self::Edge(s) => s,
        }
    }
}

/// What a defender does after the snap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ResponsibilityKind {
    /// Follow one receiver.
    Man {
        /// Receiver being covered.
        target: PlayerId,
        /// Shade kept on the receiver.
        leverage: Leverage,
        /// Partner when the receiver is doubled.
        bracket: Option<Bracket>,
    },
    /// Guard an area.
    Zone {
        /// Area covered.
        zone: Zone,
        /// Optional read that moves the landmark.
        read: Option<ZoneRead>,
    },
    /// Rush the passer.
    Blitz {
        /// Lane to attack.
        lane: RushLane,
        /// Lower numbers are picked up last by protection.
        priority: u8,
    },
    /// Shadow a player from depth.
    Spy {
        /// Player being spied.
        target: PlayerId,
    },
}

/// Pre-snap look shown before the real assignment is played.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disguise {
    /// Spot held while disguised.
    pub shell: Vec2,
    /// Seconds after the snap the disguise drops.
    pub reveal_at: f32,
    /// Whether the real assignment is now being played.
    pub revealed: bool,
}

/// A defender's assignment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageResponsibility {
    /// Owning defender.
    pub defender: PlayerId,
    /// The assignment itself.
    pub kind: ResponsibilityKind,
    /// Pre-snap disguise, if any.
    pub disguise: Option<Disguise>,
}

impl CoverageResponsibility {
    /// Man coverage on `target`.
    #[must_use]
    pub const fn man(defender: PlayerId, target: PlayerId, leverage: Leverage) -> Self {
        Self {
            defender,
            kind: ResponsibilityKind::Man {
                target,
                leverage,
                bracket: None,
            },
            disguise: None,
        }
    }

    /// Plain zone coverage.
    #[must_use]
    pub const fn zone(defender: PlayerId, zone: Zone) -> Self {
        Self {
            defender,
            kind: ResponsibilityKind::Zone { zone, read: None },
            disguise: None,
        }
    }

    /// Zone coverage with a read.
    #[must_use]
    pub const fn zone_with_read(defender: PlayerId, zone: Zone, read: ZoneRead) -> Self {
        Self {
            defender,
            kind: ResponsibilityKind::Zone {
                zone,
                read: Some(read),
            },
            disguise: None,
        }
    }

    /// Pass rush through `lane`.
    #[must_use]
    pub const fn blitz(defender: PlayerId, lane: RushLane, priority: u8) -> Self {
        Self {
            defender,
            kind: ResponsibilityKind::Blitz { lane, priority },
            disguise: None,
        }
    }

    /// Spy on `target`.
    #[must_use]
    pub const fn spy(defender: PlayerId, target: PlayerId) -> Self {
        Self {
            defender,
            kind: ResponsibilityKind::Spy { target },
            disguise: None,
        }
    }

    /// Whether this is a pass rush.
    #[must_use]
    pub const fn is_blitz(&self) -> bool {
        matches!(self.kind, ResponsibilityKind::Blitz { .. })
    }

    /// Man target, if this is man coverage.
    #[must_use]
    pub const fn man_target(&self) -> Option<PlayerId> {
        match self.kind {
            ResponsibilityKind::Man { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Zone, if this is zone coverage.
    #[must_use]
    pub fn zone_area(&self) -> Option<&Zone> {
        match &self.kind {
            ResponsibilityKind::Zone { zone, .. } => Some(zone),
            _ => None,
        }
    }

    /// Whether the disguise is still being shown.
    #[must_use]
    pub fn is_disguised(&self) -> bool {
        self.disguise.is_some_and(|d| !d.revealed)
    }
}
