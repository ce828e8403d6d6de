//! Player, ball and phase definitions.
//!
//! These are plain data. The engine mutates them during a tick or during
//! setup; nothing else holds a mutable reference.

use serde::{Deserialize, Serialize};

use crate::coverage::CoverageResponsibility;
use crate::math::Vec2;
use crate::routes::Route;

/// Unique identifier for players within a play.
pub type PlayerId = u32;

/// Id of the first offensive player; the rest follow in formation order.
pub const FIRST_OFFENSE_ID: PlayerId = 1;

/// Id of the first defender; the rest follow in roster order.
pub const FIRST_DEFENDER_ID: PlayerId = 101;

/// Defenders on the field for every fully assigned coverage.
pub const DEFENDER_COUNT: usize = 7;

/// Most eligible players an offense may align.
pub const MAX_ELIGIBLES: usize = 5;

// ============================================================================
// Teams and positions
// ============================================================================

/// Which side of the ball a player is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The passing team.
    Offense,
    /// The covering team.
    Defense,
}

/// Position type of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionType {
    /// Passer. Never eligible in this model.
    Quarterback,
    /// Backfield player.
    RunningBack,
    /// Attached or flexed tight end.
    TightEnd,
    /// Wide receiver.
    WideReceiver,
    /// Outside corner.
    Cornerback,
    /// Slot defender.
    Nickel,
    /// Deep defender.
    Safety,
    /// Box defender.
    Linebacker,
}

impl PositionType {
    /// Nominal top speed in yards per second.
    #[must_use]
    pub const fn top_speed(self) -> f32 {
        match self {
            Self::Quarterback => 7.0,
            Self::RunningBack => 9.0,
            Self::TightEnd => 8.3,
            Self::WideReceiver => 9.5,
            Self::Cornerback => 9.3,
            Self::Nickel => 9.2,
            Self::Safety => 9.0,
            Self::Linebacker => 8.4,
        }
    }

    /// Acceleration in yd/s².
    #[must_use]
    pub const fn acceleration(self) -> f32 {
        match self {
            Self::Quarterback => 10.0,
            Self::TightEnd | Self::Linebacker => 12.0,
            Self::RunningBack | Self::Safety => 13.0,
            Self::WideReceiver | Self::Cornerback | Self::Nickel => 14.0,
        }
    }

    /// Team this position belongs to.
    #[must_use]
    pub const fn team(self) -> Team {
        match self {
            Self::Quarterback | Self::RunningBack | Self::TightEnd | Self::WideReceiver => {
                Team::Offense
            }
            Self::Cornerback | Self::Nickel | Self::Safety | Self::Linebacker => Team::Defense,
        }
    }

    /// Short label used in logs and default slot names.
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Quarterback => "QB",
            Self::RunningBack => "RB",
            Self::TightEnd => "TE",
            Self::WideReceiver => "WR",
            Self::Cornerback => "CB",
            Self::Nickel => "NB",
            Self::Safety => "S",
            Self::Linebacker => "LB",
        }
    }
}

// ============================================================================
// Phase
// ============================================================================

/// Play lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Setup, motion and audibles are allowed.
    #[default]
    PreSnap,
    /// Ball snapped and held by the quarterback.
    PostSnap,
    /// Pass in the air.
    BallThrown,
    /// Outcome decided. Only a reset leaves this phase.
    PlayOver,
}

impl Phase {
    /// Whether the tick loop advances the play in this phase.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::PostSnap | Self::BallThrown)
    }
}

// ============================================================================
// Player
// ============================================================================

/// Temporary speed multiplier earned by pre-snap motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionBoost {
    /// Speed multiplier while active.
    pub multiplier: f32,
    /// Seconds of boost remaining.
    pub remaining: f32,
    /// Set at the snap; pending boosts do nothing.
    pub active: bool,
}

impl MotionBoost {
    /// Current multiplier (1.0 when pending or spent).
    #[must_use]
    pub fn factor(&self) -> f32 {
        if self.active && self.remaining > 0.0 {
            self.multiplier
        } else {
            1.0
        }
    }
}

/// A player on the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Unique id within the play.
    pub id: PlayerId,
    /// Slot or roster label ("X", "Z", "LCB", "FS"...).
    pub label: String,
    /// Side of the ball.
    pub team: Team,
    /// Position type.
    pub position_type: PositionType,
    /// Field position in yards.
    pub position: Vec2,
    /// Velocity in yards per second.
    pub velocity: Vec2,
    /// Top speed in yards per second.
    pub top_speed: f32,
    /// Speed reached so far (ramps up with acceleration).
    pub current_speed: f32,
    /// Acceleration in yd/s².
    pub acceleration: f32,
    /// Whether the quarterback may throw to this player.
    pub eligible: bool,
    /// Route for offensive players.
    pub route: Option<Route>,
    /// Assignment for defenders.
    pub responsibility: Option<CoverageResponsibility>,
    /// Pre-snap spot.
    pub alignment: Vec2,
    /// Currently executing pre-snap motion.
    pub has_motion: bool,
    /// Boost earned by completed motion.
    pub motion_boost: Option<MotionBoost>,
    /// Assigned to pass protection.
    pub is_blocking: bool,
    /// Defender bailing in his pedal.
    pub is_backpedaling: bool,
    /// Rusher stopped by a blocker.
    pub is_blocked: bool,
    /// Rusher this blocker is engaged with.
    pub engaged_with: Option<PlayerId>,
    /// Seconds left in the post-break recovery window.
    pub transition_timer: f32,
    /// Direction of travel on the previous tick.
    pub heading: Vec2,
}

impl Player {
    /// Create a player standing at `position`.
    #[must_use]
    pub fn new(
        id: PlayerId,
        label: impl Into<String>,
        position_type: PositionType,
        position: Vec2,
    ) -> Self {
        let team = position_type.team();
        Self {
            id,
            label: label.into(),
            team,
            position_type,
            position,
            velocity: Vec2::ZERO,
            top_speed: position_type.top_speed(),
            current_speed: 0.0,
            acceleration: position_type.acceleration(),
            eligible: team == Team::Offense && position_type != PositionType::Quarterback,
            route: None,
            responsibility: None,
            alignment: position,
            has_motion: false,
            motion_boost: None,
            is_blocking: false,
            is_backpedaling: false,
            is_blocked: false,
            engaged_with: None,
            transition_timer: 0.0,
            heading: Vec2::ZERO,
        }
    }

    /// Whether this player is on offense.
    #[must_use]
    pub fn is_offense(&self) -> bool {
        self.team == Team::Offense
    }

    /// Whether this player is on defense.
    #[must_use]
    pub fn is_defense(&self) -> bool {
        self.team == Team::Defense
    }

    /// Whether this player is the quarterback.
    #[must_use]
    pub fn is_quarterback(&self) -> bool {
        self.position_type == PositionType::Quarterback
    }

    /// Offensive non-quarterback, blocking or not.
    #[must_use]
    pub fn is_skill_player(&self) -> bool {
        self.is_offense() && !self.is_quarterback()
    }

    /// Whether a pass may be thrown to this player.
    #[must_use]
    pub fn is_eligible_receiver(&self) -> bool {
        self.is_skill_player() && self.eligible && !self.is_blocking
    }

    /// Whether this defender is rushing the passer.
    #[must_use]
    pub fn is_blitzing(&self) -> bool {
        self.responsibility
            .as_ref()
            .is_some_and(CoverageResponsibility::is_blitz)
    }

    /// Assign pass protection and drop eligibility.
    pub fn set_blocking(&mut self, blocking: bool) {
        self.is_blocking = blocking;
        self.eligible = !blocking && self.is_skill_player();
    }

    /// Clear post-snap transient state while keeping the assignment.
    pub fn reset_transient(&mut self) {
        self.velocity = Vec2::ZERO;
        self.current_speed = 0.0;
        self.is_backpedaling = false;
        self.is_blocked = false;
        self.engaged_with = None;
        self.transition_timer = 0.0;
        self.heading = Vec2::ZERO;
    }
}

// ============================================================================
// Ball
// ============================================================================

/// Where the ball is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BallState {
    /// In the quarterback's hands.
    #[default]
    Held,
    /// In flight.
    Thrown,
    /// Completed.
    Caught,
    /// Fell incomplete or was dropped.
    Incomplete,
    /// Picked off.
    Intercepted,
}

/// The football.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ball {
    /// Field position.
    pub position: Vec2,
    /// Velocity while thrown.
    pub velocity: Vec2,
    /// Life cycle state.
    pub state: BallState,
    /// Intended receiver. Looked up by id, never held by reference.
    pub target: Option<PlayerId>,
    /// Seconds since release.
    pub time_in_air: f32,
    /// Spot the pass was aimed at.
    pub aim_point: Option<Vec2>,
    /// Distance from release point to aim point.
    pub planned_distance: f32,
    /// Distance flown so far.
    pub traveled: f32,
}

impl Ball {
    /// A ball held at `position`.
    #[must_use]
    pub fn held_at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Whether the pass is in the air.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.state == BallState::Thrown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_eligibility() {
        let qb = Player::new(1, "QB", PositionType::Quarterback, Vec2::ZERO);
        let wr = Player::new(2, "X", PositionType::WideReceiver, Vec2::ZERO);
        let cb = Player::new(101, "LCB", PositionType::Cornerback, Vec2::ZERO);
        assert!(!qb.is_eligible_receiver());
        assert!(wr.is_eligible_receiver());
        assert!(!cb.is_eligible_receiver());
        assert_eq!(cb.team, Team::Defense);
    }

    #[test]
    fn test_blocking_drops_eligibility() {
        let mut te = Player::new(3, "Y", PositionType::TightEnd, Vec2::ZERO);
        te.set_blocking(true);
        assert!(!te.is_eligible_receiver());
        te.set_blocking(false);
        assert!(te.is_eligible_receiver());
    }

    #[test]
    fn test_pending_boost_has_no_effect() {
        let mut boost = MotionBoost {
            multiplier: 1.15,
            remaining: 1.0,
            active: false,
        };
        assert!((boost.factor() - 1.0).abs() < f32::EPSILON);
        boost.active = true;
        assert!((boost.factor() - 1.15).abs() < f32::EPSILON);
        boost.remaining = 0.0;
        assert!((boost.factor() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_phase_liveness() {
        assert!(!Phase::PreSnap.is_live());
        assert!(Phase::PostSnap.is_live());
        assert!(Phase::BallThrown.is_live());
        assert!(!Phase::PlayOver.is_live());
    }
}
