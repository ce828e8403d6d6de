//! Per-tick coverage behaviors layered on top of zone responsibilities.
//!
//! Disguised defenders reveal their real assignment on schedule, and
//! defenders with a zone read slide their zone's center to follow it.

use tracing::debug;

use crate::components::PlayerId;
use crate::coverage::{ResponsibilityKind, ZoneRead};
use crate::math::Vec2;
use crate::routes::RouteType;
use crate::state::GameState;

/// Farthest a robber's zone follows the quarterback off the ball.
pub const ROBBER_DRIFT: f32 = 6.0;

/// Farthest a lurker slides toward a crosser.
pub const LURK_DRIFT: f32 = 8.0;

/// Depth past the line a poach key must reach before the poach triggers.
pub const POACH_TRIGGER_DEPTH: f32 = 10.0;

/// Deepest a hole defender's zone center sinks past the line.
pub const HOLE_MAX_DEPTH: f32 = 18.0;

/// Width either side of the ball that counts as "inside" for the hole read.
const HOLE_INSIDE_WIDTH: f32 = 10.0;

#[derive(Debug, Clone, Copy)]
struct ReceiverRead {
    id: PlayerId,
    position: Vec2,
    route: Option<RouteType>,
}

impl ReceiverRead {
    fn is_crosser(&self) -> bool {
        matches!(
            self.route,
            Some(RouteType::Drag | RouteType::In | RouteType::Slant)
        )
    }

    fn is_vertical(&self) -> bool {
        self.route.is_some_and(RouteType::is_vertical)
    }
}

/// Reveal disguised assignments whose reveal time has passed.
///
/// Returns the number of defenders revealed.
pub fn reveal_disguises(state: &mut GameState) -> usize {
    let elapsed = state.elapsed;
    let mut revealed = 0;
    for defender in state.players.iter_mut().filter(|p| p.is_defense()) {
        let Some(disguise) = defender
            .responsibility
            .as_mut()
            .and_then(|r| r.disguise.as_mut())
        else {
            continue;
        };
        if !disguise.revealed && elapsed >= disguise.reveal_at {
            disguise.revealed = true;
            revealed += 1;
            debug!(defender = defender.id, at = elapsed, "Disguise revealed");
        }
    }
    revealed
}

/// Slide zone centers for defenders with a zone read.
pub fn apply_zone_reads(state: &mut GameState) {
    let ball_x = state.ball_x();
    let los_y = state.los_y();
    let qb_x = state.quarterback().map_or(ball_x, |qb| qb.position.x);
    let receivers: Vec<ReceiverRead> = state
        .offense()
        .filter(|p| p.is_eligible_receiver())
        .map(|p| ReceiverRead {
            id: p.id,
            position: p.position,
            route: p.route.as_ref().map(|r| r.route_type),
        })
        .collect();

    for defender in state.players.iter_mut().filter(|p| p.is_defense()) {
        let position = defender.position;
        let Some(resp) = defender.responsibility.as_mut() else {
            continue;
        };
        let ResponsibilityKind::Zone {
            zone,
            read: Some(read),
        } = &mut resp.kind
        else {
            continue;
        };
        match *read {
            ZoneRead::Robber => {
                zone.center.x = qb_x.clamp(ball_x - ROBBER_DRIFT, ball_x + ROBBER_DRIFT);
            }
            ZoneRead::Lurk => {
                if let Some(crosser) = receivers
                    .iter()
                    .filter(|r| r.is_crosser())
                    .min_by(|a, b| {
                        a.position
                            .distance(position)
                            .total_cmp(&b.position.distance(position))
                    })
                {
                    zone.center.x = crosser
                        .position
                        .x
                        .clamp(ball_x - LURK_DRIFT, ball_x + LURK_DRIFT);
                }
            }
            ZoneRead::Poach { key } => {
                if let Some(key) = receivers.iter().find(|r| r.id == key) {
                    if key.position.y - los_y > POACH_TRIGGER_DEPTH {
                        zone.center.x = key.position.x;
                    }
                }
            }
            ZoneRead::Hole => {
                let deepest = receivers
                    .iter()
                    .filter(|r| r.is_vertical() && (r.position.x - ball_x).abs() <= HOLE_INSIDE_WIDTH)
                    .map(|r| r.position.y)
                    .fold(f32::MIN, f32::max);
                if deepest > zone.center.y {
                    zone.center.y = deepest.min(los_y + HOLE_MAX_DEPTH);
                }
            }
        }
    }
}

/// Run every per-tick behavior.
pub fn update(state: &mut GameState) {
    reveal_disguises(state);
    apply_zone_reads(state);
}
