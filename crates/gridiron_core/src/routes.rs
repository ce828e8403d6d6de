//! Route generation and timing.
//!
//! A route is a list of field waypoints with matching arrival times in
//! seconds since the snap. Shapes are described in a receiver-relative
//! frame (lateral offset measured toward the near sideline, depth measured
//! past the line of scrimmage) and converted to field coordinates once,
//! when the route is built.

use serde::{Deserialize, Serialize};

use crate::field::Side;
use crate::math::{Vec2, EPSILON};

/// Fraction of top speed a receiver runs his stem at.
pub const ROUTE_PACE: f32 = 0.9;

/// Time lost at each break.
pub const BREAK_PAUSE: f32 = 0.15;

/// Distance at which a defender disturbs a receiver's path.
pub const LEVERAGE_RADIUS: f32 = 3.0;

/// Largest lateral adjustment a receiver makes around a defender.
pub const LEVERAGE_SHIFT: f32 = 1.5;

/// Route shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteType {
    /// Straight vertical.
    Go,
    /// Quick break inside at 45 degrees.
    Slant,
    /// Shallow release to the sideline.
    Flat,
    /// Stem then square out.
    Out,
    /// Stem then square in (dig).
    In,
    /// Stem then turn back inside.
    Curl,
    /// Short stem, turn back to the quarterback.
    Hitch,
    /// Deep stem, turn back to the sideline.
    Comeback,
    /// Stem then break to the goal posts.
    Post,
    /// Stem then break to the pylon.
    Corner,
    /// Shallow crosser.
    Drag,
    /// Vertical up the hash.
    Seam,
    /// Swing to the sideline then up.
    Wheel,
    /// Step back behind the line for a quick throw.
    Screen,
    /// Pass protection.
    Block,
}

/// Depth bucket a route finishes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteLevel {
    /// Under six yards.
    Shallow,
    /// Six to fifteen yards.
    Intermediate,
    /// Vertical stretch.
    Deep,
    /// Not a receiving route.
    Protection,
}

impl RouteType {
    /// Every route type, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Go,
        Self::Slant,
        Self::Flat,
        Self::Out,
        Self::In,
        Self::Curl,
        Self::Hitch,
        Self::Comeback,
        Self::Post,
        Self::Corner,
        Self::Drag,
        Self::Seam,
        Self::Wheel,
        Self::Screen,
        Self::Block,
    ];

    /// Default break depth past the line of scrimmage.
    #[must_use]
    pub const fn default_depth(self) -> f32 {
        match self {
            Self::Go => 20.0,
            Self::Slant => 7.0,
            Self::Flat => 2.0,
            Self::Out => 10.0,
            Self::In | Self::Curl | Self::Post | Self::Corner => 12.0,
            Self::Hitch => 6.0,
            Self::Comeback => 15.0,
            Self::Drag => 5.0,
            Self::Seam | Self::Wheel => 25.0,
            Self::Screen => -2.0,
            Self::Block => 0.0,
        }
    }

    /// Routes that come back toward the quarterback and hold.
    #[must_use]
    pub const fn is_settling(self) -> bool {
        matches!(
            self,
            Self::Curl | Self::Hitch | Self::Comeback | Self::Screen | Self::Block
        )
    }

    /// Routes allowed as a hot route.
    #[must_use]
    pub const fn is_quick(self) -> bool {
        matches!(
            self,
            Self::Slant | Self::Hitch | Self::Flat | Self::Out | Self::Drag | Self::Screen
        )
    }

    /// Straight-line deep routes counted by four-verticals recognition.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Go | Self::Seam | Self::Post)
    }

    /// Depth bucket.
    #[must_use]
    pub const fn level(self) -> RouteLevel {
        match self {
            Self::Go | Self::Post | Self::Corner | Self::Seam | Self::Wheel => RouteLevel::Deep,
            Self::Out | Self::In | Self::Curl | Self::Comeback => RouteLevel::Intermediate,
            Self::Flat | Self::Hitch | Self::Slant | Self::Drag | Self::Screen => {
                RouteLevel::Shallow
            }
            Self::Block => RouteLevel::Protection,
        }
    }

    /// Shape as `(lateral toward the sideline, depth past the LOS)` points.
    fn shape(self, d: f32) -> Vec<(f32, f32)> {
        match self {
            Self::Go => vec![(0.0, d)],
            Self::Slant => vec![(0.0, 2.0), (-5.0, d)],
            Self::Flat => vec![(2.0, 1.0), (9.0, d)],
            Self::Out => vec![(0.0, d), (7.0, d)],
            Self::In => vec![(0.0, d), (-12.0, d)],
            Self::Curl => vec![(0.0, d), (-1.5, d - 2.0)],
            Self::Hitch => vec![(0.0, d), (0.0, d - 1.0)],
            Self::Comeback => vec![(0.0, d), (3.0, d - 2.5)],
            Self::Post => vec![(0.0, d), (-8.0, d + 12.0)],
            Self::Corner => vec![(0.0, d), (8.0, d + 10.0)],
            Self::Drag => vec![(-3.0, 2.0), (-24.0, d)],
            Self::Seam => vec![(-1.0, 5.0), (-1.0, d)],
            Self::Wheel => vec![(5.0, 1.0), (8.0, 6.0), (8.0, d)],
            Self::Screen => vec![(1.5, d), (3.0, d)],
            Self::Block => Vec::new(),
        }
    }
}

/// A timed path for one receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Shape this route was built from.
    pub route_type: RouteType,
    /// Field waypoints; the first is the receiver's alignment.
    pub waypoints: Vec<Vec2>,
    /// Arrival time at each waypoint, seconds since the snap.
    pub timings: Vec<f32>,
    /// Nominal break depth past the line of scrimmage.
    pub depth: f32,
    /// Pace used for timing and extrapolation (yd/s).
    pub pace: f32,
}

impl Route {
    /// Build a route for a receiver aligned at `start`.
    ///
    /// `depth` overrides the route type's default break depth.
    #[must_use]
    pub fn generate(
        route_type: RouteType,
        start: Vec2,
        ball_x: f32,
        los_y: f32,
        top_speed: f32,
        depth: Option<f32>,
    ) -> Self {
        let d = depth.unwrap_or_else(|| route_type.default_depth());
        let outward = Side::of(start.x, ball_x).sign();
        let mut waypoints = vec![start];
        waypoints.extend(
            route_type
                .shape(d)
                .into_iter()
                .map(|(lateral, past_los)| Vec2::new(start.x + outward * lateral, los_y + past_los)),
        );
        let pace = (top_speed * ROUTE_PACE).max(1.0);
        let timings = Self::time_waypoints(&waypoints, pace);
        Self {
            route_type,
            waypoints,
            timings,
            depth: d,
            pace,
        }
    }

    fn time_waypoints(waypoints: &[Vec2], pace: f32) -> Vec<f32> {
        let mut timings = Vec::with_capacity(waypoints.len());
        let mut t = 0.0;
        for (i, point) in waypoints.iter().enumerate() {
            if i > 0 {
                t += waypoints[i - 1].distance(*point) / pace;
                if i >= 2 {
                    t += BREAK_PAUSE;
                }
            }
            timings.push(t);
        }
        timings
    }

    /// Alignment the route starts from.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoints.first().copied().unwrap_or_default()
    }

    /// Last scripted waypoint.
    #[must_use]
    pub fn end(&self) -> Vec2 {
        self.waypoints.last().copied().unwrap_or_default()
    }

    /// Time the last waypoint is reached.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.timings.last().copied().unwrap_or(0.0)
    }

    /// Scripted position `t` seconds after the snap.
    #[must_use]
    pub fn position_at(&self, t: f32) -> Vec2 {
        let Some(&first) = self.waypoints.first() else {
            return Vec2::ZERO;
        };
        if t <= 0.0 || self.waypoints.len() == 1 {
            return first;
        }
        let legs = self.waypoints.len().min(self.timings.len());
        for i in 1..legs {
            if t <= self.timings[i] {
                let pause = if i >= 2 { BREAK_PAUSE } else { 0.0 };
                let leg_start = self.timings[i - 1] + pause;
                if t <= leg_start {
                    return self.waypoints[i - 1];
                }
                let span = (self.timings[i] - leg_start).max(EPSILON);
                let progress = ((t - leg_start) / span).clamp(0.0, 1.0);
                return self.waypoints[i - 1].lerp(self.waypoints[i], progress);
            }
        }
        let last = self.end();
        if self.route_type.is_settling() {
            return last;
        }
        let prev = self.waypoints[self.waypoints.len() - 2];
        let direction = (last - prev).normalize();
        last + direction.scale((t - self.duration()) * self.pace)
    }

    /// Whether every waypoint has a finite arrival time to match.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.waypoints.len() == self.timings.len() && self.timings.iter().all(|t| t.is_finite())
    }

    /// Translate the route so its first waypoint is `new_start`.
    pub fn reanchor(&mut self, new_start: Vec2) {
        let delta = new_start - self.start();
        for point in &mut self.waypoints {
            *point += delta;
        }
        if let Some(first) = self.waypoints.first_mut() {
            *first = new_start;
        }
    }

    /// Deepest scripted point past `los_y`.
    #[must_use]
    pub fn max_depth(&self, los_y: f32) -> f32 {
        self.waypoints
            .iter()
            .map(|p| p.y - los_y)
            .fold(f32::MIN, f32::max)
    }
}

/// Shift a receiver's aim point away from a nearby defender.
///
/// Only defenders at or beyond the receiver's depth within
/// [`LEVERAGE_RADIUS`] of the aim point matter; the closest one wins.
#[must_use]
pub fn leverage_aim(aim: Vec2, receiver: Vec2, defenders: &[Vec2]) -> Vec2 {
    let nearest = defenders
        .iter()
        .filter(|d| d.y >= receiver.y)
        .map(|d| (*d, d.distance(aim)))
        .filter(|(_, dist)| *dist < LEVERAGE_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1));
    let Some((defender, dist)) = nearest else {
        return aim;
    };
    let away = if (aim.x - defender.x).abs() > EPSILON {
        (aim.x - defender.x).signum()
    } else {
        (receiver.x - defender.x).signum()
    };
    let shift = (1.0 - dist / LEVERAGE_RADIUS) * LEVERAGE_SHIFT;
    Vec2::new(aim.x + away * shift, aim.y)
}
