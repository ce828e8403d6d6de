//! Ball flight.
//!
//! A pass is aimed where the receiver's route says he will be when the ball
//! gets there, nudged by pressure-driven inaccuracy, then flown in a
//! straight line at constant speed.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::{BallState, Phase, PlayerId};
use crate::config::EngineConfig;
use crate::field::clamp_to_field;
use crate::math::{Vec2, EPSILON};
use crate::rng::RandomSource;
use crate::state::GameState;

/// Largest aim error, in yards, at zero accuracy.
pub const MAX_AIM_ERROR: f32 = 3.0;

/// Lead-prediction passes when computing the aim point.
const LEAD_ITERATIONS: usize = 2;

/// What happened to the ball this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flight {
    /// Still in the quarterback's hands.
    Held,
    /// In the air.
    InAir,
    /// Reached the intended receiver.
    Arrived,
    /// Reached the aim point with nobody there, or stayed up too long.
    Missed,
}

/// Predicted position of `receiver` `t` seconds from now.
fn predict(state: &GameState, receiver: PlayerId, t: f32) -> Option<Vec2> {
    let player = state.player(receiver)?;
    Some(match &player.route {
        Some(route) => route.position_at(state.elapsed + t),
        None => player.position + player.velocity.scale(t),
    })
}

/// Release a pass to `receiver`.
///
/// Returns `false` without touching the state when the receiver or the
/// quarterback is missing.
pub fn launch<R: RandomSource>(
    state: &mut GameState,
    receiver: PlayerId,
    config: &EngineConfig,
    rng: &mut R,
) -> bool {
    let Some(release) = state.quarterback().map(|qb| qb.position) else {
        return false;
    };
    let speed = config.throw_speed * state.pressure.speed_factor();
    let Some(mut aim) = predict(state, receiver, 0.0) else {
        return false;
    };
    for _ in 0..LEAD_ITERATIONS {
        let t = release.distance(aim) / speed;
        aim = predict(state, receiver, t).unwrap_or(aim);
    }

    let spread = (1.0 - state.pressure.accuracy()) * MAX_AIM_ERROR;
    let magnitude = spread * rng.next_f32();
    let angle = rng.next_f32() * TAU;
    aim += Vec2::new(angle.cos(), angle.sin()).scale(magnitude);

    let path = aim - release;
    let ball = &mut state.ball;
    ball.position = release;
    ball.velocity = path.normalize().scale(speed);
    ball.state = BallState::Thrown;
    ball.target = Some(receiver);
    ball.time_in_air = 0.0;
    ball.aim_point = Some(aim);
    ball.planned_distance = path.length();
    ball.traveled = 0.0;
    state.phase = Phase::BallThrown;
    debug!(
        receiver,
        pressure = ?state.pressure,
        aim_error = magnitude,
        distance = state.ball.planned_distance,
        "Pass thrown"
    );
    true
}

/// Advance the ball one tick.
pub fn advance(state: &mut GameState, dt: f32, config: &EngineConfig) -> Flight {
    match state.ball.state {
        BallState::Held => {
            if let Some(qb) = state.quarterback().map(|qb| qb.position) {
                state.ball.position = qb;
            }
            return Flight::Held;
        }
        BallState::Thrown => {}
        BallState::Caught | BallState::Incomplete | BallState::Intercepted => {
            return Flight::Missed;
        }
    }

    let target_pos = state
        .ball
        .target
        .and_then(|id| state.player(id))
        .map(|p| p.position);
    let ball = &mut state.ball;
    let remaining = (ball.planned_distance - ball.traveled).max(0.0);
    let travel = (ball.velocity.length() * dt).min(remaining);
    ball.position = clamp_to_field(ball.position + ball.velocity.normalize().scale(travel));
    ball.traveled += travel;
    ball.time_in_air += dt;

    let within = |at: Vec2, radius: f32| target_pos.is_some_and(|t| t.distance(at) <= radius);
    if within(ball.position, config.catch_radius) {
        return Flight::Arrived;
    }
    if ball.traveled + EPSILON >= ball.planned_distance {
        if let Some(aim) = ball.aim_point {
            ball.position = clamp_to_field(aim);
        }
        return if within(ball.position, config.catch_radius + config.catch_reach) {
            Flight::Arrived
        } else {
            Flight::Missed
        };
    }
    if ball.time_in_air > config.max_flight_time {
        return Flight::Missed;
    }
    Flight::InAir
}
