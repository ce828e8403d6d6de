//! Vector math for the simulation.
//!
//! Gameplay runs in `f32` yards. Anything that has to be compared
//! bit-for-bit across runs (state hashes, recordings) goes through
//! [`quantize`], which snaps values onto a fixed-point grid so tiny
//! platform differences in float formatting never leak into a hash.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type used for hashing simulation state.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Tolerance used when comparing distances.
pub const EPSILON: f32 = 1.0e-4;

/// 2D vector in field yards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// Lateral coordinate (0 = left sideline).
    pub x: f32,
    /// Longitudinal coordinate (0 = back of the offense's end zone).
    pub y: f32,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared length (avoids sqrt for comparisons).
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Squared distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        (other - self).length_squared()
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len <= EPSILON {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.y / len)
    }

    /// Scale by a scalar.
    #[must_use]
    pub fn scale(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k)
    }

    /// Linearly interpolate between two vectors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Step from `self` toward `target` by at most `max_step` yards.
    #[must_use]
    pub fn move_towards(self, target: Self, max_step: f32) -> Self {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist <= EPSILON {
            return target;
        }
        self + delta.scale(max_step / dist)
    }

    /// Angle between two vectors in radians (0 for degenerate input).
    #[must_use]
    pub fn angle_between(self, other: Self) -> f32 {
        let a = self.normalize();
        let b = other.normalize();
        if a == Self::ZERO || b == Self::ZERO {
            return 0.0;
        }
        a.dot(b).clamp(-1.0, 1.0).acos()
    }

    /// Whether both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// Snap a float onto the fixed-point grid and return the raw bits.
///
/// Non-finite inputs hash as zero.
#[must_use]
pub fn quantize(value: f32) -> i64 {
    Fixed::checked_from_num(value)
        .unwrap_or(Fixed::ZERO)
        .to_bits()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_distance() {
        let a = Vec2::new(3.0, 0.0);
        let b = Vec2::new(0.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < EPSILON);
        assert!((a.distance_squared(b) - 25.0).abs() < EPSILON);
    }

    #[test]
    fn test_vec2_normalize() {
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < EPSILON);
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn test_move_towards_does_not_overshoot() {
        let start = Vec2::new(0.0, 0.0);
        let target = Vec2::new(10.0, 0.0);
        let stepped = start.move_towards(target, 4.0);
        assert!((stepped.x - 4.0).abs() < EPSILON);
        assert_eq!(start.move_towards(target, 50.0), target);
    }

    #[test]
    fn test_vec2_lerp() {
        let mid = Vec2::new(0.0, 0.0).lerp(Vec2::new(10.0, 20.0), 0.5);
        assert_eq!(mid, Vec2::new(5.0, 10.0));
    }

    #[test]
    fn test_angle_between() {
        let right = Vec2::new(1.0, 0.0);
        let up = Vec2::new(0.0, 1.0);
        assert!((right.angle_between(up) - std::f32::consts::FRAC_PI_2).abs() < 1.0e-3);
    }

    #[test]
    fn test_quantize_is_stable() {
        assert_eq!(quantize(1.0 / 3.0), quantize(1.0 / 3.0));
        assert_eq!(quantize(f32::NAN), 0);
        assert_ne!(quantize(1.0), quantize(1.001));
    }
}
