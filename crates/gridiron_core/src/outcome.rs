//! Pass and sack outcome resolution.
//!
//! Catch odds come from separation: how far the nearest defender is from
//! the receiver when the ball gets there.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::{BallState, PlayerId};
use crate::config::EngineConfig;
use crate::math::Vec2;
use crate::rng::RandomSource;
use crate::state::GameState;

/// Lowest catch probability (percent).
pub const MIN_CATCH_PROBABILITY: f32 = 10.0;

/// Highest catch probability (percent).
pub const MAX_CATCH_PROBABILITY: f32 = 95.0;

/// Most yards a receiver gains after the catch.
pub const MAX_YARDS_AFTER_CATCH: f32 = 10.0;

/// Result type of a finished play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    /// Completed pass.
    Catch,
    /// Dropped, broken up, overthrown or never arrived.
    Incomplete,
    /// Caught by the defense.
    Interception,
    /// Quarterback brought down before throwing.
    Sack,
}

/// Decided result of a play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayOutcome {
    /// What happened.
    pub kind: OutcomeKind,
    /// Net yards (negative for a sack).
    pub yards: f32,
    /// Intended receiver.
    pub receiver: Option<PlayerId>,
    /// Closest defender at the catch point.
    pub defender: Option<PlayerId>,
    /// Receiver-defender separation at the catch point.
    pub separation: Option<f32>,
    /// Catch probability used (percent).
    pub catch_probability: Option<f32>,
    /// Seconds after the snap the play ended.
    pub time: f32,
    /// Where the ball ended up.
    pub ball_spot: Vec2,
}

/// Openness score from separation.
#[must_use]
pub fn openness(separation: f32, tackle_radius: f32) -> f32 {
    (separation - tackle_radius) * 10.0
}

/// Catch probability in percent, clamped to `[10, 95]`.
///
/// Non-decreasing in separation: the tight-window penalties shrink as
/// separation grows.
#[must_use]
pub fn catch_probability(separation: f32, config: &EngineConfig) -> f32 {
    let separation = if separation.is_finite() {
        separation.max(0.0)
    } else {
        0.0
    };
    let mut p = openness(separation, config.tackle_radius) * 0.9 + 50.0;
    if separation < 2.0 {
        p *= 0.6;
    } else if separation < 3.0 {
        p *= 0.8;
    }
    p.clamp(MIN_CATCH_PROBABILITY, MAX_CATCH_PROBABILITY)
}

/// Yards after the catch from separation.
#[must_use]
pub fn yards_after_catch(separation: f32, tackle_radius: f32) -> f32 {
    ((separation - tackle_radius) * 1.5).clamp(0.0, MAX_YARDS_AFTER_CATCH)
}

/// Sack yardage: the quarterback's depth behind the line, capped.
#[must_use]
pub fn sack_loss(qb_depth: f32, config: &EngineConfig) -> f32 {
    let depth = if qb_depth.is_finite() && qb_depth > 0.0 {
        qb_depth
    } else {
        config.default_sack_loss
    };
    depth.min(config.max_sack_loss)
}

/// Resolve a pass that reached its target.
pub fn resolve_catch<R: RandomSource>(
    state: &mut GameState,
    config: &EngineConfig,
    rng: &mut R,
) -> PlayOutcome {
    let target = state.ball.target;
    let receiver_pos = target
        .and_then(|id| state.player(id))
        .map_or(state.ball.position, |p| p.position);
    let nearest = state
        .defense()
        .map(|d| (d.id, d.position.distance(receiver_pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    let (defender, separation) = match nearest {
        Some((id, dist)) => (Some(id), dist),
        None => (None, f32::INFINITY),
    };

    let mut outcome = PlayOutcome {
        kind: OutcomeKind::Incomplete,
        yards: 0.0,
        receiver: target,
        defender,
        separation: separation.is_finite().then_some(separation),
        catch_probability: None,
        time: state.elapsed,
        ball_spot: receiver_pos,
    };

    if separation <= config.tackle_radius {
        if rng.chance(config.interception_chance) {
            outcome.kind = OutcomeKind::Interception;
        }
    } else {
        let p = catch_probability(separation.min(100.0), config);
        outcome.catch_probability = Some(p);
        if rng.chance(p / 100.0) {
            outcome.kind = OutcomeKind::Catch;
            let yac = yards_after_catch(separation.min(100.0), config.tackle_radius);
            outcome.yards = receiver_pos.y - state.los_y() + yac;
            outcome.ball_spot = Vec2::new(receiver_pos.x, receiver_pos.y + yac);
        }
    }

    state.ball.state = match outcome.kind {
        OutcomeKind::Catch => BallState::Caught,
        OutcomeKind::Interception => BallState::Intercepted,
        OutcomeKind::Incomplete | OutcomeKind::Sack => BallState::Incomplete,
    };
    debug!(
        kind = ?outcome.kind,
        receiver = ?target,
        separation,
        yards = outcome.yards,
        "Pass resolved"
    );
    outcome
}

/// Resolve a pass that missed its receiver.
pub fn resolve_miss(state: &mut GameState) -> PlayOutcome {
    state.ball.state = BallState::Incomplete;
    debug!(receiver = ?state.ball.target, time = state.elapsed, "Pass fell incomplete");
    PlayOutcome {
        kind: OutcomeKind::Incomplete,
        yards: 0.0,
        receiver: state.ball.target,
        defender: None,
        separation: None,
        catch_probability: None,
        time: state.elapsed,
        ball_spot: state.ball.position,
    }
}

/// Resolve a sack.
pub fn resolve_sack(state: &GameState, config: &EngineConfig) -> PlayOutcome {
    let los_y = state.los_y();
    let qb_pos = state
        .quarterback()
        .map_or(Vec2::new(state.ball_x(), los_y), |qb| qb.position);
    let loss = sack_loss(los_y - qb_pos.y, config);
    debug!(loss, time = state.elapsed, sack_time = state.sack_time, "Sack");
    PlayOutcome {
        kind: OutcomeKind::Sack,
        yards: -loss,
        receiver: None,
        defender: None,
        separation: None,
        catch_probability: None,
        time: state.elapsed,
        ball_spot: qb_pos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catch_probability_clamped() {
        let config = EngineConfig::default();
        assert!((catch_probability(0.0, &config) - 24.6).abs() < 1.0e-3);
        assert!((catch_probability(50.0, &config) - MAX_CATCH_PROBABILITY).abs() < f32::EPSILON);
        assert!(catch_probability(-5.0, &config) >= MIN_CATCH_PROBABILITY);
        assert!(catch_probability(f32::NAN, &config) >= MIN_CATCH_PROBABILITY);
    }

    #[test]
    fn test_catch_probability_penalty_bands() {
        let config = EngineConfig::default();
        let tight = catch_probability(1.9, &config);
        let medium = catch_probability(2.5, &config);
        let open = catch_probability(3.5, &config);
        assert!(tight < medium && medium < open);
        assert!((open - 72.5).abs() < 1.0e-3);
    }

    #[test]
    fn test_yards_after_catch_capped() {
        assert!((yards_after_catch(3.0, 1.0) - 3.0).abs() < f32::EPSILON);
        assert!((yards_after_catch(30.0, 1.0) - MAX_YARDS_AFTER_CATCH).abs() < f32::EPSILON);
        assert!(yards_after_catch(0.5, 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sack_loss() {
        let config = EngineConfig::default();
        assert!((sack_loss(6.5, &config) - 6.5).abs() < f32::EPSILON);
        assert!((sack_loss(-1.0, &config) - 7.0).abs() < f32::EPSILON);
        assert!((sack_loss(40.0, &config) - 15.0).abs() < f32::EPSILON);
    }
}
