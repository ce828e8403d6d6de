//! Pre-snap motion.
//!
//! One eligible player per play may go in motion. The path is planned
//! when motion starts and walked by [`advance`] on each pre-snap step.
//! Finishing motion re-anchors the mover's route to where he stopped and
//! queues the speed boost applied at the snap.

use serde::{Deserialize, Serialize};

use crate::components::{MotionBoost, PlayerId};
use crate::config::EngineConfig;
use crate::field::{clamp_to_field, Side};
use crate::math::{Vec2, EPSILON};
use crate::state::GameState;

/// Closest a mover may come to the line of scrimmage.
const OFF_LINE_DEPTH: f32 = 1.0;

/// Kind of pre-snap motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionType {
    /// Full-speed motion across the formation.
    Fly,
    /// Fast motion across the formation settling wide on the far side.
    Jet,
    /// Loop behind the quarterback back toward the original side.
    Orbit,
    /// Go in toward the ball, then return to the original spot.
    Return,
    /// Short reset of the split toward the ball.
    Shift,
}

impl MotionType {
    /// Pace multiplier over the configured motion speed.
    #[must_use]
    pub const fn pace(self) -> f32 {
        match self {
            Self::Fly | Self::Jet => 1.3,
            Self::Orbit => 1.1,
            Self::Return | Self::Shift => 1.0,
        }
    }

    /// Speed multiplier granted at the snap.
    #[must_use]
    pub fn boost(self, config: &EngineConfig) -> f32 {
        match self {
            Self::Fly | Self::Jet => config.fast_motion_boost,
            Self::Orbit | Self::Return | Self::Shift => config.motion_boost,
        }
    }

    /// Waypoints from `start`, excluding `start` itself.
    #[must_use]
    pub fn plan(self, start: Vec2, ball_x: f32, los_y: f32) -> Vec<Vec2> {
        let outward = Side::of(start.x, ball_x).sign();
        let behind = los_y - OFF_LINE_DEPTH;
        let path = match self {
            Self::Fly => vec![
                Vec2::new(ball_x, behind - 0.5),
                Vec2::new(ball_x - outward * 5.0, behind - 0.5),
            ],
            Self::Jet => vec![
                Vec2::new(ball_x, behind),
                Vec2::new(ball_x - outward * 8.0, behind),
            ],
            Self::Orbit => vec![
                Vec2::new(ball_x - outward * 2.0, los_y - 6.5),
                Vec2::new(ball_x + outward * 3.0, los_y - 6.5),
            ],
            Self::Return => vec![
                Vec2::new(start.x - outward * 4.0, start.y.min(behind)),
                Vec2::new(start.x, start.y.min(behind)),
            ],
            Self::Shift => vec![Vec2::new(start.x - outward * 3.0, start.y.min(behind))],
        };
        path.into_iter().map(clamp_to_field).collect()
    }
}

/// Motion used on this play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionRecord {
    /// Player in motion.
    pub player: PlayerId,
    /// Kind of motion.
    pub motion_type: MotionType,
    /// Where the player started.
    pub start: Vec2,
    /// Remaining path.
    pub path: Vec<Vec2>,
    /// Index of the next waypoint.
    pub next: usize,
    /// Motion finished and route re-anchored.
    pub complete: bool,
}

impl MotionRecord {
    /// Plan motion for `player` from `start`.
    #[must_use]
    pub fn new(
        player: PlayerId,
        motion_type: MotionType,
        start: Vec2,
        ball_x: f32,
        los_y: f32,
    ) -> Self {
        Self {
            player,
            motion_type,
            start,
            path: motion_type.plan(start, ball_x, los_y),
            next: 0,
            complete: false,
        }
    }

    /// Final spot of the motion.
    #[must_use]
    pub fn end(&self) -> Vec2 {
        self.path.last().copied().unwrap_or(self.start)
    }
}

/// Walk the mover along the planned path.
///
/// Returns `true` when the mover reached the end of the path this step.
pub fn advance(state: &mut GameState, dt: f32, config: &EngineConfig) -> bool {
    let Some(record) = state.motion.as_mut() else {
        return false;
    };
    if record.complete {
        return false;
    }
    let Some(player) = state
        .players
        .iter_mut()
        .find(|p| p.id == record.player)
    else {
        return false;
    };

    let mut budget = config.motion_speed * record.motion_type.pace() * dt;
    let mut position = player.position;
    while budget > EPSILON && record.next < record.path.len() {
        let target = record.path[record.next];
        let dist = position.distance(target);
        if dist <= budget {
            position = target;
            budget -= dist;
            record.next += 1;
        } else {
            position = position.move_towards(target, budget);
            budget = 0.0;
        }
    }
    if dt > 0.0 {
        player.velocity = (position - player.position).scale(1.0 / dt);
    }
    player.position = position;
    record.next >= record.path.len()
}

/// Complete motion: re-anchor the route and queue the snap boost.
///
/// Returns the mover id and where he started, for the defensive response.
pub fn finish(state: &mut GameState, config: &EngineConfig) -> Option<(PlayerId, Vec2)> {
    let record = state.motion.as_mut()?;
    if record.complete {
        return None;
    }
    record.complete = true;
    let (id, start, motion_type) = (record.player, record.start, record.motion_type);
    let player = state.player_mut(id)?;
    player.has_motion = false;
    player.velocity = Vec2::ZERO;
    player.alignment = player.position;
    if let Some(route) = player.route.as_mut() {
        route.reanchor(player.position);
    }
    player.motion_boost = Some(MotionBoost {
        multiplier: motion_type.boost(config),
        remaining: config.motion_boost_duration,
        active: false,
    });
    Some((id, start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::CENTER_X;

    const LOS_Y: f32 = 40.0;

    #[test]
    fn test_jet_crosses_formation() {
        let start = Vec2::new(CENTER_X - 12.0, LOS_Y - 1.0);
        let path = MotionType::Jet.plan(start, CENTER_X, LOS_Y);
        assert!(path.last().unwrap().x > CENTER_X);
    }

    #[test]
    fn test_shift_stays_on_side_and_off_line() {
        let start = Vec2::new(CENTER_X + 12.0, LOS_Y - 0.5);
        let path = MotionType::Shift.plan(start, CENTER_X, LOS_Y);
        assert_eq!(path.len(), 1);
        assert!(path[0].x > CENTER_X && path[0].x < start.x);
        assert!(path[0].y <= LOS_Y - OFF_LINE_DEPTH);
    }

    #[test]
    fn test_return_ends_at_split() {
        let start = Vec2::new(CENTER_X + 12.0, LOS_Y - 1.0);
        let record = MotionRecord::new(2, MotionType::Return, start, CENTER_X, LOS_Y);
        assert_eq!(record.end(), start);
    }

    #[test]
    fn test_boost_values() {
        let config = EngineConfig::default();
        assert!((MotionType::Jet.boost(&config) - 1.2).abs() < f32::EPSILON);
        assert!((MotionType::Orbit.boost(&config) - 1.15).abs() < f32::EPSILON);
    }
}
