//! Down, distance and line-of-scrimmage bookkeeping between plays.

use serde::{Deserialize, Serialize};

use crate::field::{
    HashMark, DRIVE_START_YARD, MAX_LINE_OF_SCRIMMAGE, MIN_LINE_OF_SCRIMMAGE, SAFETY_RESET_YARD,
};
use crate::outcome::{OutcomeKind, PlayOutcome};

/// Yards needed for a first down.
pub const FIRST_DOWN_DISTANCE: u8 = 10;

/// Opponent goal line, in yard-line units.
pub const GOAL_LINE: i32 = 100;

/// How a completed play changed the drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriveResult {
    /// Gained the line to gain.
    FirstDown,
    /// Short of the line to gain; next down.
    NextDown,
    /// Crossed the goal line; a new drive begins.
    Touchdown,
    /// Tackled in the offense's own end zone.
    Safety,
    /// Pass intercepted; a new drive begins.
    Interception,
    /// Fourth down failed; a new drive begins.
    TurnoverOnDowns,
}

impl DriveResult {
    /// Whether this result ends the current drive.
    #[must_use]
    pub const fn ends_drive(self) -> bool {
        matches!(
            self,
            Self::Touchdown | Self::Safety | Self::Interception | Self::TurnoverOnDowns
        )
    }
}

/// Drive bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriveState {
    /// Current down (1..=4).
    pub down: u8,
    /// Yards to the line to gain.
    pub yards_to_go: u8,
    /// Line of scrimmage, yards from the offense's goal line.
    pub line_of_scrimmage: u8,
    /// Hash the ball is spotted on.
    pub hash: HashMark,
    /// Plays run this session.
    pub play_count: u32,
    /// Touchdowns scored.
    pub touchdowns: u32,
    /// Interceptions and turnovers on downs.
    pub turnovers: u32,
    /// Safeties conceded.
    pub safeties: u32,
}

impl Default for DriveState {
    fn default() -> Self {
        Self {
            down: 1,
            yards_to_go: FIRST_DOWN_DISTANCE,
            line_of_scrimmage: DRIVE_START_YARD,
            hash: HashMark::Middle,
            play_count: 0,
            touchdowns: 0,
            turnovers: 0,
            safeties: 0,
        }
    }
}

impl DriveState {
    /// Yards from the line of scrimmage to the goal line.
    #[must_use]
    pub fn distance_to_goal(&self) -> u8 {
        100u8.saturating_sub(self.line_of_scrimmage)
    }

    /// Whether the line to gain is the goal line.
    #[must_use]
    pub fn is_goal_to_go(&self) -> bool {
        self.yards_to_go >= self.distance_to_goal()
    }

    /// Start a fresh drive, keeping the session counters.
    pub fn new_drive(&mut self) {
        self.line_of_scrimmage = DRIVE_START_YARD;
        self.hash = HashMark::Middle;
        self.first_down();
    }

    fn first_down(&mut self) {
        self.down = 1;
        self.yards_to_go = FIRST_DOWN_DISTANCE.min(self.distance_to_goal());
    }

    fn safety_reset(&mut self) {
        self.line_of_scrimmage = SAFETY_RESET_YARD;
        self.first_down();
    }

    /// Move the line of scrimmage.
    ///
    /// Values below the minimum are a safety: the ball is reset to the
    /// safety spot on first and ten. Values beyond the maximum clamp.
    /// Returns `true` when a safety reset happened.
    pub fn set_line_of_scrimmage(&mut self, yard: i32) -> bool {
        if yard < i32::from(MIN_LINE_OF_SCRIMMAGE) {
            self.safety_reset();
            return true;
        }
        let clamped = yard.min(i32::from(MAX_LINE_OF_SCRIMMAGE));
        self.line_of_scrimmage = u8::try_from(clamped).unwrap_or(MAX_LINE_OF_SCRIMMAGE);
        self.yards_to_go = self.yards_to_go.clamp(1, self.distance_to_goal().max(1));
        false
    }

    /// Apply a finished play.
    pub fn apply(&mut self, outcome: &PlayOutcome) -> DriveResult {
        self.play_count += 1;

        if outcome.kind == OutcomeKind::Interception {
            self.turnovers += 1;
            self.new_drive();
            return DriveResult::Interception;
        }

        let gained = outcome.yards.round() as i32;
        let new_los = i32::from(self.line_of_scrimmage) + gained;
        if new_los >= GOAL_LINE {
            self.touchdowns += 1;
            self.new_drive();
            return DriveResult::Touchdown;
        }
        if new_los < i32::from(MIN_LINE_OF_SCRIMMAGE) {
            self.safeties += 1;
            self.safety_reset();
            self.hash = HashMark::Middle;
            return DriveResult::Safety;
        }

        self.line_of_scrimmage =
            u8::try_from(new_los.min(i32::from(MAX_LINE_OF_SCRIMMAGE))).unwrap_or(MAX_LINE_OF_SCRIMMAGE);
        if outcome.kind != OutcomeKind::Incomplete {
            self.hash = HashMark::from_ball_x(outcome.ball_spot.x);
        }

        if gained >= i32::from(self.yards_to_go) {
            self.first_down();
            return DriveResult::FirstDown;
        }
        if self.down >= 4 {
            self.turnovers += 1;
            self.new_drive();
            return DriveResult::TurnoverOnDowns;
        }
        self.down += 1;
        let remaining = i32::from(self.yards_to_go) - gained;
        let cap = i32::from(self.distance_to_goal());
        self.yards_to_go = u8::try_from(remaining.clamp(1, cap.max(1))).unwrap_or(FIRST_DOWN_DISTANCE);
        DriveResult::NextDown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    fn outcome(kind: OutcomeKind, yards: f32, x: f32) -> PlayOutcome {
        PlayOutcome {
            kind,
            yards,
            receiver: None,
            defender: None,
            separation: None,
            catch_probability: None,
            time: 2.0,
            ball_spot: Vec2::new(x, 50.0),
        }
    }

    #[test]
    fn test_fifteen_yard_catch_is_first_down() {
        let mut drive = DriveState {
            line_of_scrimmage: 30,
            ..DriveState::default()
        };
        let result = drive.apply(&outcome(OutcomeKind::Catch, 15.0, 26.67));
        assert_eq!(result, DriveResult::FirstDown);
        assert_eq!(drive.line_of_scrimmage, 45);
        assert_eq!(drive.down, 1);
        assert_eq!(drive.yards_to_go, 10);
    }

    #[test]
    fn test_short_gain_advances_down() {
        let mut drive = DriveState::default();
        let result = drive.apply(&outcome(OutcomeKind::Catch, 4.0, 10.0));
        assert_eq!(result, DriveResult::NextDown);
        assert_eq!(drive.down, 2);
        assert_eq!(drive.yards_to_go, 6);
        assert_eq!(drive.hash, HashMark::Left);
    }

    #[test]
    fn test_incomplete_keeps_spot_and_hash() {
        let mut drive = DriveState {
            hash: HashMark::Right,
            ..DriveState::default()
        };
        drive.apply(&outcome(OutcomeKind::Incomplete, 0.0, 5.0));
        assert_eq!(drive.line_of_scrimmage, DRIVE_START_YARD);
        assert_eq!(drive.hash, HashMark::Right);
        assert_eq!(drive.down, 2);
    }

    #[test]
    fn test_sack_adds_distance() {
        let mut drive = DriveState::default();
        drive.apply(&outcome(OutcomeKind::Sack, -7.0, 26.67));
        assert_eq!(drive.line_of_scrimmage, 18);
        assert_eq!(drive.yards_to_go, 17);
    }

    #[test]
    fn test_touchdown_starts_new_drive() {
        let mut drive = DriveState {
            line_of_scrimmage: 90,
            ..DriveState::default()
        };
        let result = drive.apply(&outcome(OutcomeKind::Catch, 12.0, 26.67));
        assert_eq!(result, DriveResult::Touchdown);
        assert_eq!(drive.touchdowns, 1);
        assert_eq!(drive.line_of_scrimmage, DRIVE_START_YARD);
    }

    #[test]
    fn test_safety_resets_to_thirty() {
        let mut drive = DriveState {
            line_of_scrimmage: 4,
            down: 3,
            ..DriveState::default()
        };
        let result = drive.apply(&outcome(OutcomeKind::Sack, -8.0, 26.67));
        assert_eq!(result, DriveResult::Safety);
        assert_eq!(drive.line_of_scrimmage, SAFETY_RESET_YARD);
        assert_eq!((drive.down, drive.yards_to_go), (1, 10));
    }

    #[test]
    fn test_interception_is_turnover() {
        let mut drive = DriveState {
            line_of_scrimmage: 60,
            down: 2,
            ..DriveState::default()
        };
        let result = drive.apply(&outcome(OutcomeKind::Interception, 0.0, 26.67));
        assert_eq!(result, DriveResult::Interception);
        assert_eq!(drive.turnovers, 1);
        assert_eq!(drive.line_of_scrimmage, DRIVE_START_YARD);
    }

    #[test]
    fn test_fourth_down_failure() {
        let mut drive = DriveState {
            down: 4,
            yards_to_go: 5,
            ..DriveState::default()
        };
        let result = drive.apply(&outcome(OutcomeKind::Catch, 2.0, 26.67));
        assert_eq!(result, DriveResult::TurnoverOnDowns);
        assert!(result.ends_drive());
        assert_eq!(drive.down, 1);
    }

    #[test]
    fn test_goal_to_go_caps_distance() {
        let mut drive = DriveState {
            line_of_scrimmage: 88,
            ..DriveState::default()
        };
        drive.apply(&outcome(OutcomeKind::Catch, 10.0, 26.67));
        assert_eq!(drive.line_of_scrimmage, 98);
        assert_eq!(drive.yards_to_go, 2);
        assert!(drive.is_goal_to_go());
    }

    #[test]
    fn test_set_line_of_scrimmage_safety_and_clamp() {
        let mut drive = DriveState {
            down: 3,
            yards_to_go: 4,
            ..DriveState::default()
        };
        assert!(drive.set_line_of_scrimmage(1));
        assert_eq!(drive.line_of_scrimmage, SAFETY_RESET_YARD);
        assert_eq!((drive.down, drive.yards_to_go), (1, 10));
        assert!(!drive.set_line_of_scrimmage(150));
        assert_eq!(drive.line_of_scrimmage, MAX_LINE_OF_SCRIMMAGE);
        assert_eq!(drive.yards_to_go, 1);
    }
}
