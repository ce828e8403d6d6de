//! Player movement for one tick.
//!
//! Every player first picks a target from his assignment, then steps toward
//! it at a speed capped by his top speed and the active modifiers. Targets
//! are chosen from a snapshot of the previous tick's positions, so the
//! result does not depend on the order players are processed in.

use tracing::trace;

use crate::components::{Phase, Player, PlayerId};
use crate::config::EngineConfig;
use crate::coverage::{Bracket, BracketRole, Leverage, ResponsibilityKind, Zone};
use crate::field::{clamp_to_field, Side};
use crate::math::{Vec2, EPSILON};
use crate::pressure::POCKET_EDGE;
use crate::routes::leverage_aim;
use crate::state::GameState;

/// Depth the quarterback drops to behind the line.
pub const DROP_DEPTH: f32 = 7.0;

/// Depth past the line a spy mirrors the quarterback from.
pub const SPY_MIRROR_DEPTH: f32 = 5.0;

/// Cushion a deep defender keeps over the deepest threat in his zone.
pub const DEEP_CUSHION: f32 = 2.0;

/// Lateral shade of a man defender off his receiver.
const LEVERAGE_SHADE: f32 = 1.0;

/// Yards the over-the-top half of a bracket sits past the receiver.
pub const BRACKET_OVER_CUSHION: f32 = 3.0;

/// Yards the underneath half of a bracket sits short of the receiver.
pub const BRACKET_UNDER_CUSHION: f32 = 1.0;

/// Depth behind the line a blocker sets up at with nobody to block.
const STANCE_DEPTH: f32 = 2.0;

/// Farthest off the ball a blocker sets up with nobody to block.
const STANCE_WIDTH: f32 = 4.0;

/// What a player is trying to do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Intent {
    target: Vec2,
    backpedal: bool,
    blitz: bool,
}

impl Intent {
    const fn to(target: Vec2) -> Self {
        Self {
            target,
            backpedal: false,
            blitz: false,
        }
    }
}

/// Immutable view of the field used to choose targets.
struct Snapshot {
    ball_x: f32,
    los_y: f32,
    elapsed: f32,
    phase: Phase,
    zone_scale: f32,
    qb: Option<Vec2>,
    players: Vec<(PlayerId, Vec2)>,
    receivers: Vec<(PlayerId, Vec2)>,
    defenders: Vec<Vec2>,
    zone_defenders: Vec<(PlayerId, Vec2, Zone)>,
}

impl Snapshot {
    fn capture(state: &GameState) -> Self {
        let zone_scale = if state.analysis.bunch {
            0.8
        } else if state.analysis.spread {
            1.1
        } else {
            1.0
        };
        Self {
            ball_x: state.ball_x(),
            los_y: state.los_y(),
            elapsed: state.elapsed,
            phase: state.phase,
            zone_scale,
            qb: state.quarterback().map(|qb| qb.position),
            players: state.players.iter().map(|p| (p.id, p.position)).collect(),
            receivers: state
                .offense()
                .filter(|p| p.is_eligible_receiver())
                .map(|p| (p.id, p.position))
                .collect(),
            defenders: state.defense().map(|d| d.position).collect(),
            zone_defenders: state
                .defense()
                .filter(|d| !d.is_blocked)
                .filter_map(|d| {
                    let zone = *d.responsibility.as_ref()?.zone_area()?;
                    Some((d.id, d.position, zone))
                })
                .collect(),
        }
    }

    fn position_of(&self, id: PlayerId) -> Option<Vec2> {
        self.players
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, p)| *p)
    }

    /// Closest zone defender whose zone covers `threat`.
    fn zone_owner(&self, threat: Vec2) -> Option<PlayerId> {
        self.zone_defenders
            .iter()
            .filter(|(_, _, zone)| zone.contains_scaled(threat, self.zone_scale))
            .min_by(|a, b| {
                a.1.distance(threat)
                    .total_cmp(&b.1.distance(threat))
                    .then(a.0.cmp(&b.0))
            })
            .map(|(id, _, _)| *id)
    }
}

// ============================================================================
// Offense
// ============================================================================

fn quarterback_intent(snap: &Snapshot) -> Intent {
    Intent::to(Vec2::new(snap.ball_x, snap.los_y - DROP_DEPTH))
}

fn receiver_intent(player: &Player, snap: &Snapshot) -> Intent {
    let Some(route) = &player.route else {
        return Intent::to(player.position);
    };
    let aim = route.position_at(snap.elapsed);
    Intent::to(leverage_aim(aim, player.position, &snap.defenders))
}

fn stance(player: &Player, snap: &Snapshot) -> Vec2 {
    Vec2::new(
        player
            .alignment
            .x
            .clamp(snap.ball_x - STANCE_WIDTH, snap.ball_x + STANCE_WIDTH),
        snap.los_y - STANCE_DEPTH,
    )
}

/// Pick up rushers: each blocker takes the nearest free rusher, same side first.
fn assign_blocks(state: &GameState, snap: &Snapshot) -> Vec<(PlayerId, Option<PlayerId>)> {
    let rushers: Vec<(PlayerId, Vec2)> = state
        .unblocked_blitzers()
        .map(|d| (d.id, d.position))
        .collect();
    let mut claimed: Vec<PlayerId> = state
        .offense()
        .filter_map(|p| p.engaged_with)
        .collect();

    let mut picks = Vec::new();
    for blocker in state.offense().filter(|p| p.is_blocking && p.engaged_with.is_none()) {
        let side = Side::of(blocker.position.x, snap.ball_x);
        let nearest = |same_side: bool| {
            rushers
                .iter()
                .filter(|(id, pos)| {
                    !claimed.contains(id)
                        && (!same_side || Side::of(pos.x, snap.ball_x) == side)
                })
                .min_by(|a, b| {
                    a.1.distance(blocker.position)
                        .total_cmp(&b.1.distance(blocker.position))
                })
                .map(|(id, _)| *id)
        };
        let target = nearest(true).or_else(|| nearest(false));
        if let Some(id) = target {
            claimed.push(id);
        }
        picks.push((blocker.id, target));
    }
    picks
}

// ============================================================================
// Defense
// ============================================================================

fn leverage_shade(leverage: Leverage, receiver: Vec2, ball_x: f32) -> f32 {
    let inward = if receiver.x < ball_x { 1.0 } else { -1.0 };
    match leverage {
        Leverage::Inside => inward * LEVERAGE_SHADE,
        Leverage::Outside => -inward * LEVERAGE_SHADE,
        Leverage::Press => 0.0,
    }
}

fn defender_intent(defender: &Player, snap: &Snapshot, config: &EngineConfig) -> Intent {
    let Some(resp) = defender.responsibility else {
        return Intent::to(defender.position);
    };
    if let Some(disguise) = resp.disguise.filter(|d| !d.revealed) {
        return Intent::to(disguise.shell);
    }
    let mut intent = match resp.kind {
        ResponsibilityKind::Man {
            target,
            leverage,
            bracket,
        } => {
            let Some(receiver) = snap.position_of(target) else {
                return Intent::to(defender.position);
            };
            let shade = leverage_shade(leverage, receiver, snap.ball_x);
            let spot = match bracket {
                Some(bracket) => bracket_spot(bracket, receiver, shade, snap),
                None => Vec2::new(receiver.x + shade, receiver.y),
            };
            Intent::to(spot)
        }
        ResponsibilityKind::Zone { zone, .. } => zone_intent(defender, &zone, snap),
        ResponsibilityKind::Blitz { lane, .. } => {
            let entry = Vec2::new(snap.ball_x + lane.offset(), snap.los_y);
            let target = if defender.position.y > snap.los_y + 0.5 {
                entry
            } else if let Some(qb) = snap.qb {
                // Close to the pocket edge, never through the passer.
                let offset = defender.position - qb;
                if offset.length() <= POCKET_EDGE {
                    defender.position
                } else {
                    qb + offset.normalize().scale(POCKET_EDGE)
                }
            } else {
                entry
            };
            Intent {
                target,
                backpedal: false,
                blitz: true,
            }
        }
        ResponsibilityKind::Spy { .. } => {
            let x = snap.qb.map_or(snap.ball_x, |qb| qb.x);
            Intent::to(Vec2::new(x, snap.los_y + SPY_MIRROR_DEPTH))
        }
    };
    let to_target = intent.target - defender.position;
    intent.backpedal = !intent.blitz
        && to_target.y > EPSILON
        && to_target.length() > config.backpedal_distance;
    intent
}

/// One half of a bracket: over or under the receiver, on the side away
/// from the partner. Falls back to `shade` when the partner is missing or
/// stacked on the receiver.
fn bracket_spot(bracket: Bracket, receiver: Vec2, shade: f32, snap: &Snapshot) -> Vec2 {
    let lateral = snap
        .position_of(bracket.partner)
        .map(|partner| receiver.x - partner.x)
        .filter(|dx| dx.abs() > EPSILON)
        .map_or(shade, |dx| dx.signum() * LEVERAGE_SHADE);
    let depth = match bracket.role {
        BracketRole::Over => BRACKET_OVER_CUSHION,
        BracketRole::Under => -BRACKET_UNDER_CUSHION,
    };
    Vec2::new(receiver.x + lateral, receiver.y + depth)
}

fn zone_intent(defender: &Player, zone: &Zone, snap: &Snapshot) -> Intent {
    let in_zone: Vec<Vec2> = snap
        .receivers
        .iter()
        .map(|(_, p)| *p)
        .filter(|p| zone.contains_scaled(*p, snap.zone_scale))
        .collect();

    let mut threats = in_zone.clone();
    threats.sort_by(|a, b| {
        a.distance(defender.position)
            .total_cmp(&b.distance(defender.position))
    });
    let owned = threats
        .into_iter()
        .find(|t| snap.zone_owner(*t) == Some(defender.id));

    if zone.kind.is_deep() {
        let deepest = in_zone.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        let x = owned.map_or(zone.center.x, |t| t.x);
        let y = if in_zone.is_empty() {
            zone.center.y
        } else {
            zone.center.y.max(deepest + DEEP_CUSHION)
        };
        let hw = zone.width * snap.zone_scale / 2.0;
        return Intent::to(Vec2::new(
            x.clamp(zone.center.x - hw, zone.center.x + hw),
            y,
        ));
    }
    Intent::to(owned.map_or(zone.center, |t| zone.clamp(t)))
}

// ============================================================================
// Stepping
// ============================================================================

fn step(player: &mut Player, intent: Intent, dt: f32, config: &EngineConfig) {
    let old = player.position;
    let delta = intent.target - old;
    let dist = delta.length();
    let direction = delta.normalize();

    if player.heading != Vec2::ZERO
        && direction != Vec2::ZERO
        && player.heading.angle_between(direction) > config.transition_angle
    {
        player.transition_timer = config.transition_window;
    }

    let mut cap = player.top_speed;
    if let Some(boost) = &player.motion_boost {
        cap *= boost.factor();
    }
    if intent.backpedal {
        cap *= config.backpedal_multiplier;
    }
    if player.transition_timer > 0.0 {
        cap *= config.transition_multiplier;
    }
    if intent.blitz {
        cap *= config.blitz_speed_bonus;
    }
    player.is_backpedaling = intent.backpedal;

    player.current_speed = (player.current_speed + player.acceleration * dt).min(cap);
    let travel = (player.current_speed * dt).min(dist);
    let new = if dist > EPSILON {
        clamp_to_field(old + direction.scale(travel))
    } else {
        old
    };

    player.position = new;
    player.velocity = if dt > 0.0 {
        (new - old).scale(1.0 / dt)
    } else {
        Vec2::ZERO
    };
    if direction != Vec2::ZERO && travel > EPSILON {
        player.heading = direction;
    }
    player.transition_timer = (player.transition_timer - dt).max(0.0);
    if let Some(boost) = player.motion_boost.as_mut() {
        if boost.active {
            boost.remaining = (boost.remaining - dt).max(0.0);
        }
    }
}

fn hold(player: &mut Player) {
    player.velocity = Vec2::ZERO;
    player.current_speed = 0.0;
}

/// Move every player one tick.
pub fn update(state: &mut GameState, dt: f32, config: &EngineConfig) {
    if !state.phase.is_live() {
        return;
    }
    let snap = Snapshot::capture(state);
    let blocks = assign_blocks(state, &snap);

    let mut intents: Vec<Option<Intent>> = Vec::with_capacity(state.players.len());
    for player in &state.players {
        let intent = if player.is_quarterback() {
            (snap.phase == Phase::PostSnap).then(|| quarterback_intent(&snap))
        } else if player.is_offense() && player.is_blocking {
            if player.engaged_with.is_some() {
                None
            } else {
                let target = blocks
                    .iter()
                    .find(|(b, _)| *b == player.id)
                    .and_then(|(_, t)| *t)
                    .and_then(|t| snap.position_of(t))
                    .unwrap_or_else(|| stance(player, &snap));
                Some(Intent::to(target))
            }
        } else if player.is_offense() {
            Some(receiver_intent(player, &snap))
        } else if player.is_blocked {
            None
        } else {
            Some(defender_intent(player, &snap, config))
        };
        intents.push(intent);
    }

    for (player, intent) in state.players.iter_mut().zip(intents) {
        match intent {
            Some(intent) => step(player, intent, dt, config),
            None => hold(player),
        }
    }

    engage_blocks(state, &blocks, config);
}

/// Spot an unblocked defender is heading for from the current field.
#[must_use]
pub fn defender_target(state: &GameState, defender: PlayerId, config: &EngineConfig) -> Option<Vec2> {
    let player = state
        .player(defender)
        .filter(|p| p.is_defense() && !p.is_blocked)?;
    Some(defender_intent(player, &Snapshot::capture(state), config).target)
}

/// Lock blockers onto rushers they have reached.
fn engage_blocks(state: &mut GameState, blocks: &[(PlayerId, Option<PlayerId>)], config: &EngineConfig) {
    for &(blocker_id, rusher_id) in blocks {
        let Some(rusher_id) = rusher_id else { continue };
        let (Some(blocker), Some(rusher)) = (state.player(blocker_id), state.player(rusher_id))
        else {
            continue;
        };
        if blocker.position.distance(rusher.position) > config.block_radius {
            continue;
        }
        if let Some(rusher) = state.player_mut(rusher_id) {
            rusher.is_blocked = true;
            hold(rusher);
        }
        if let Some(blocker) = state.player_mut(blocker_id) {
            blocker.engaged_with = Some(rusher_id);
            hold(blocker);
        }
        trace!(blocker = blocker_id, rusher = rusher_id, "Block engaged");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{MotionBoost, PositionType};
    use crate::coverage::{CoverageResponsibility, RushLane, ZoneKind};
    use crate::field::CENTER_X;

    const DT: f32 = 1.0 / 60.0;

    fn live_state(players: Vec<Player>) -> GameState {
        let mut state = GameState::default();
        state.phase = Phase::PostSnap;
        state.players = players;
        state.sort_players();
        state
    }

    #[test]
    fn test_speed_never_exceeds_cap() {
        let config = EngineConfig::default();
        let los = GameState::default().los_y();
        let mut wr = Player::new(2, "X", PositionType::WideReceiver, Vec2::new(10.0, los));
        for _ in 0..120 {
            step(&mut wr, Intent::to(Vec2::new(10.0, 110.0)), DT, &config);
            assert!(wr.velocity.length() <= wr.top_speed + 1.0e-3);
        }
    }

    #[test]
    fn test_active_boost_raises_cap() {
        let config = EngineConfig::default();
        let mut wr = Player::new(2, "X", PositionType::WideReceiver, Vec2::new(10.0, 40.0));
        wr.motion_boost = Some(MotionBoost {
            multiplier: 1.2,
            remaining: 5.0,
            active: true,
        });
        for _ in 0..60 {
            step(&mut wr, Intent::to(Vec2::new(10.0, 110.0)), DT, &config);
        }
        assert!(wr.current_speed > wr.top_speed);
        assert!(wr.current_speed <= wr.top_speed * 1.2 + 1.0e-3);
    }

    #[test]
    fn test_sharp_turn_starts_transition() {
        let config = EngineConfig::default();
        let mut cb = Player::new(101, "LCB", PositionType::Cornerback, Vec2::new(10.0, 40.0));
        step(&mut cb, Intent::to(Vec2::new(10.0, 60.0)), DT, &config);
        assert!(cb.transition_timer.abs() < f32::EPSILON);
        step(&mut cb, Intent::to(Vec2::new(10.0, 20.0)), DT, &config);
        assert!(cb.transition_timer > 0.0);
    }

    #[test]
    fn test_blocker_stops_rusher() {
        let config = EngineConfig::default();
        let los = GameState::default().los_y();
        let mut rb = Player::new(6, "RB", PositionType::RunningBack, Vec2::new(CENTER_X - 1.0, los - 1.0));
        rb.set_blocking(true);
        let mut lb = Player::new(105, "MLB", PositionType::Linebacker, Vec2::new(CENTER_X - 1.5, los - 0.2));
        lb.responsibility = Some(CoverageResponsibility::blitz(105, RushLane::A(Side::Left), 0));
        let qb = Player::new(1, "QB", PositionType::Quarterback, Vec2::new(CENTER_X, los - 5.0));
        let mut state = live_state(vec![qb, rb, lb]);
        update(&mut state, DT, &config);
        let lb = state.player(105).unwrap();
        assert!(lb.is_blocked);
        assert_eq!(state.player(6).unwrap().engaged_with, Some(105));
        assert_eq!(state.unblocked_blitzers().count(), 0);
    }

    #[test]
    fn test_deep_zone_stays_over_threat() {
        let config = EngineConfig::default();
        let state = GameState::default();
        let los = state.los_y();
        let zone = Zone::landmark(ZoneKind::DeepMiddle, CENTER_X, los);
        let wr = Player::new(2, "X", PositionType::WideReceiver, Vec2::new(CENTER_X, los + 20.0));
        let mut fs = Player::new(101, "FS", PositionType::Safety, Vec2::new(CENTER_X, los + 15.0));
        fs.responsibility = Some(CoverageResponsibility::zone(101, zone));
        let state = live_state(vec![wr, fs.clone()]);
        let snap = Snapshot::capture(&state);
        let intent = defender_intent(&fs, &snap, &config);
        assert!((intent.target.y - (los + 20.0 + DEEP_CUSHION)).abs() < 1.0e-4);
    }

    #[test]
    fn test_bracket_halves_split_away_from_each_other() {
        let config = EngineConfig::default();
        let los = GameState::default().los_y();
        let receiver = Vec2::new(CENTER_X + 15.0, los + 6.0);
        let wr = Player::new(2, "X", PositionType::WideReceiver, receiver);
        let mut cb = Player::new(101, "RCB", PositionType::Cornerback, Vec2::new(CENTER_X + 18.0, los + 4.0));
        let mut ss = Player::new(102, "SS", PositionType::Safety, Vec2::new(CENTER_X + 9.0, los + 12.0));
        let bracket = |partner, role| ResponsibilityKind::Man {
            target: 2,
            leverage: Leverage::Inside,
            bracket: Some(Bracket { partner, role }),
        };
        cb.responsibility = Some(CoverageResponsibility {
            defender: 101,
            kind: bracket(102, BracketRole::Under),
            disguise: None,
        });
        ss.responsibility = Some(CoverageResponsibility {
            defender: 102,
            kind: bracket(101, BracketRole::Over),
            disguise: None,
        });
        let state = live_state(vec![wr, cb.clone(), ss.clone()]);
        let snap = Snapshot::capture(&state);

        let under = defender_intent(&cb, &snap, &config).target;
        let over = defender_intent(&ss, &snap, &config).target;
        // Corner is outside the receiver, so the safety takes the inside half.
        assert!(over.x < receiver.x);
        assert!(under.x > receiver.x);
        assert!((over.y - (receiver.y + BRACKET_OVER_CUSHION)).abs() < 1.0e-4);
        assert!((under.y - (receiver.y - BRACKET_UNDER_CUSHION)).abs() < 1.0e-4);

        // Partner gone: the leverage shade decides.
        let lone = live_state(vec![Player::new(2, "X", PositionType::WideReceiver, receiver), ss.clone()]);
        let snap = Snapshot::capture(&lone);
        let over = defender_intent(&ss, &snap, &config).target;
        let shade = leverage_shade(Leverage::Inside, receiver, lone.ball_x());
        assert!((over.x - (receiver.x + shade)).abs() < 1.0e-4);
    }

    #[test]
    fn test_positions_stay_in_bounds() {
        let config = EngineConfig::default();
        let mut wr = Player::new(2, "X", PositionType::WideReceiver, Vec2::new(0.5, 40.0));
        for _ in 0..60 {
            step(&mut wr, Intent::to(Vec2::new(-20.0, 40.0)), DT, &config);
        }
        assert!(wr.position.x >= 0.0);
    }
}
