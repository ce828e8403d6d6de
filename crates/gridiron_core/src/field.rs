//! Field geometry: bounds, yard lines and hash marks.
//!
//! The offense attacks toward +y. Its own goal line sits at `y = 10`
//! and the opponent goal line at `y = 110`, so yard line `L` (measured
//! from the offense's goal line) lives at `y = 10 + L`.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Sideline-to-sideline width in yards.
pub const FIELD_WIDTH: f32 = 160.0 / 3.0;

/// End line to end line, including both end zones.
pub const FIELD_LENGTH: f32 = 120.0;

/// Depth of each end zone.
pub const END_ZONE_DEPTH: f32 = 10.0;

/// Lateral center of the field.
pub const CENTER_X: f32 = FIELD_WIDTH / 2.0;

/// Lowest legal line of scrimmage.
pub const MIN_LINE_OF_SCRIMMAGE: u8 = 2;

/// Highest legal line of scrimmage.
pub const MAX_LINE_OF_SCRIMMAGE: u8 = 99;

/// Yard line the offense restarts from after a safety.
pub const SAFETY_RESET_YARD: u8 = 30;

/// Yard line a new drive starts from.
pub const DRIVE_START_YARD: u8 = 25;

/// Lateral side of the field relative to the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Toward `x = 0`.
    Left,
    /// Toward `x = FIELD_WIDTH`.
    Right,
}

impl Side {
    /// Sign of the outward lateral direction (-1 left, +1 right).
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Side of `x` relative to `reference_x`, ties going right.
    #[must_use]
    pub fn of(x: f32, reference_x: f32) -> Self {
        if x < reference_x {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Hash mark the ball is spotted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashMark {
    /// Left hash.
    Left,
    /// Middle of the field.
    #[default]
    Middle,
    /// Right hash.
    Right,
}

impl HashMark {
    /// Lateral position of the ball on this hash.
    #[must_use]
    pub const fn ball_x(self) -> f32 {
        match self {
            Self::Left => 23.58,
            Self::Middle => CENTER_X,
            Self::Right => 29.75,
        }
    }

    /// The wide side of the field for a ball on this hash.
    ///
    /// A middle spot has no wide side; it reports `Right`.
    #[must_use]
    pub const fn field_side(self) -> Side {
        match self {
            Self::Left | Self::Middle => Side::Right,
            Self::Right => Side::Left,
        }
    }

    /// Hash the ball is spotted on after a play ending at lateral `x`.
    #[must_use]
    pub fn from_ball_x(x: f32) -> Self {
        if x < Self::Left.ball_x() {
            Self::Left
        } else if x > Self::Right.ball_x() {
            Self::Right
        } else {
            Self::Middle
        }
    }
}

/// Field y coordinate of a yard line.
#[must_use]
pub fn yard_line_to_y(yard_line: f32) -> f32 {
    END_ZONE_DEPTH + yard_line
}

/// Yard line of a field y coordinate.
#[must_use]
pub fn y_to_yard_line(y: f32) -> f32 {
    y - END_ZONE_DEPTH
}

/// Clamp a point into the field of play (end zones included).
#[must_use]
pub fn clamp_to_field(point: Vec2) -> Vec2 {
    let x = if point.x.is_finite() {
        point.x.clamp(0.0, FIELD_WIDTH)
    } else {
        CENTER_X
    };
    let y = if point.y.is_finite() {
        point.y.clamp(0.0, FIELD_LENGTH)
    } else {
        FIELD_LENGTH / 2.0
    };
    Vec2::new(x, y)
}

/// Whether a point lies inside the field of play.
#[must_use]
pub fn in_bounds(point: Vec2) -> bool {
    (0.0..=FIELD_WIDTH).contains(&point.x) && (0.0..=FIELD_LENGTH).contains(&point.y)
}
