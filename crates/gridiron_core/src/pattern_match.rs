//! Post-snap pattern matching.
//!
//! Route combinations are recognized from the receivers' route types once
//! enough of the play has developed, and the active scheme rotates
//! defenders to answer them. Each signature fires at most once per play.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::components::{PlayerId, PositionType};
use crate::coverage::{
    Bracket, BracketRole, Leverage, ResponsibilityKind, Zone, ZoneKind, ZoneRead,
};
use crate::field::Side;
use crate::math::Vec2;
use crate::routes::{RouteLevel, RouteType};
use crate::schemes::CoverageScheme;
use crate::state::GameState;

/// Recognizable route combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternSignature {
    /// Hitch or curl outside with a corner route inside it.
    Smash,
    /// Three receivers at three levels to one side.
    Flood,
    /// Two drags from opposite sides.
    Mesh,
    /// Four or more vertical stems.
    FourVerticals,
    /// Trips with the inside receiver running vertical.
    TripsVertical,
}

impl PatternSignature {
    /// Every signature in evaluation order.
    pub const ALL: [Self; 5] = [
        Self::Mesh,
        Self::Smash,
        Self::Flood,
        Self::TripsVertical,
        Self::FourVerticals,
    ];

    /// Seconds after the snap before the combination is readable.
    #[must_use]
    pub const fn trigger_time(self) -> f32 {
        match self {
            Self::Smash => 0.8,
            Self::Flood | Self::TripsVertical => 1.0,
            Self::Mesh => 0.6,
            Self::FourVerticals => 1.2,
        }
    }
}

/// A fired pattern match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// Recognized combination.
    pub signature: PatternSignature,
    /// Side of the formation it was run to, if one-sided.
    pub side: Option<Side>,
    /// Seconds after the snap it fired.
    pub at: f32,
}

#[derive(Debug, Clone, Copy)]
struct RouteRead {
    id: PlayerId,
    side: Side,
    route: RouteType,
    split: f32,
}

fn route_reads(state: &GameState) -> Vec<RouteRead> {
    let ball_x = state.ball_x();
    state
        .offense()
        .filter(|p| p.is_eligible_receiver())
        .filter_map(|p| {
            let route = p.route.as_ref()?;
            let start = route.start();
            Some(RouteRead {
                id: p.id,
                side: Side::of(start.x, ball_x),
                route: route.route_type,
                split: (start.x - ball_x).abs(),
            })
        })
        .collect()
}

/// Find whether `signature` is being run, returning the routes involved.
fn recognize(
    signature: PatternSignature,
    reads: &[RouteRead],
    state: &GameState,
) -> Option<(Option<Side>, Vec<PlayerId>)> {
    match signature {
        PatternSignature::Smash => [Side::Left, Side::Right].into_iter().find_map(|side| {
            let on_side = reads.iter().filter(|r| r.side == side);
            let hitch = on_side
                .clone()
                .filter(|r| matches!(r.route, RouteType::Hitch | RouteType::Curl))
                .max_by(|a, b| a.split.total_cmp(&b.split))?;
            let corner = on_side
                .filter(|r| r.route == RouteType::Corner && r.split < hitch.split)
                .max_by(|a, b| a.split.total_cmp(&b.split))?;
            Some((Some(side), vec![hitch.id, corner.id]))
        }),
        PatternSignature::Flood => [Side::Left, Side::Right].into_iter().find_map(|side| {
            let pick = |level: RouteLevel| {
                reads
                    .iter()
                    .find(|r| r.side == side && r.route.level() == level)
                    .map(|r| r.id)
            };
            let deep = pick(RouteLevel::Deep)?;
            let intermediate = pick(RouteLevel::Intermediate)?;
            let shallow = pick(RouteLevel::Shallow)?;
            Some((Some(side), vec![deep, intermediate, shallow]))
        }),
        PatternSignature::Mesh => {
            let left = reads
                .iter()
                .find(|r| r.side == Side::Left && r.route == RouteType::Drag)?;
            let right = reads
                .iter()
                .find(|r| r.side == Side::Right && r.route == RouteType::Drag)?;
            Some((None, vec![left.id, right.id]))
        }
        PatternSignature::FourVerticals => {
            let verticals: Vec<PlayerId> = reads
                .iter()
                .filter(|r| r.route.is_vertical())
                .map(|r| r.id)
                .collect();
            (verticals.len() >= 4).then_some((None, verticals))
        }
        PatternSignature::TripsVertical => {
            let side = state.analysis.trips?;
            let third = *state.analysis.side(side).get(2)?;
            let read = reads.iter().find(|r| r.id == third)?;
            matches!(read.route, RouteType::Seam | RouteType::Go)
                .then_some((Some(side), vec![third]))
        }
    }
}

/// Check every signature and apply the scheme's answer to any that fire.
///
/// Returns the number of matches fired this call.
pub fn update(state: &mut GameState, scheme: &dyn CoverageScheme) -> usize {
    let reads = route_reads(state);
    let mut fired = 0;
    for signature in PatternSignature::ALL {
        if state.elapsed < signature.trigger_time()
            || !scheme.pattern_match_eligible(signature)
            || state.pattern_matches.iter().any(|m| m.signature == signature)
        {
            continue;
        }
        let Some((side, receivers)) = recognize(signature, &reads, state) else {
            continue;
        };
        apply(state, signature, side, &receivers);
        debug!(
            signature = ?signature,
            side = ?side,
            at = state.elapsed,
            family = ?scheme.family(),
            "Pattern match"
        );
        state.pattern_matches.push(PatternMatch {
            signature,
            side,
            at: state.elapsed,
        });
        fired += 1;
    }
    fired
}

// ============================================================================
// Answers
// ============================================================================

/// A defender in coverage (not rushing or spying).
#[derive(Debug, Clone, Copy)]
struct Cover {
    id: PlayerId,
    position_type: PositionType,
    position: Vec2,
    zone: Option<ZoneKind>,
}

fn cover_defenders(state: &GameState) -> Vec<Cover> {
    state
        .defense()
        .filter_map(|d| {
            let zone = match d.responsibility.as_ref()?.kind {
                // Poachers stay on their key.
                ResponsibilityKind::Zone { read: Some(ZoneRead::Poach { .. }), .. } => return None,
                ResponsibilityKind::Zone { zone, .. } => Some(zone.kind),
                ResponsibilityKind::Man { .. } => None,
                ResponsibilityKind::Blitz { .. } | ResponsibilityKind::Spy { .. } => return None,
            };
            Some(Cover {
                id: d.id,
                position_type: d.position_type,
                position: d.position,
                zone,
            })
        })
        .collect()
}

fn set_kind(state: &mut GameState, defender: PlayerId, kind: ResponsibilityKind) {
    if let Some(resp) = state
        .player_mut(defender)
        .and_then(|d| d.responsibility.as_mut())
    {
        resp.kind = kind;
    }
}

fn man(target: PlayerId, bracket: Option<Bracket>) -> ResponsibilityKind {
    ResponsibilityKind::Man {
        target,
        leverage: Leverage::Inside,
        bracket,
    }
}

fn receiver_position(state: &GameState, id: PlayerId) -> Vec2 {
    state.player(id).map_or_else(|| state.ball_spot(), |p| p.position)
}

fn nearest_unused(
    candidates: &[Cover],
    used: &[PlayerId],
    to: Vec2,
    filter: impl Fn(PositionType, Option<ZoneKind>) -> bool,
) -> Option<PlayerId> {
    candidates
        .iter()
        .filter(|c| !used.contains(&c.id) && filter(c.position_type, c.zone))
        .min_by(|a, b| a.position.distance(to).total_cmp(&b.position.distance(to)))
        .map(|c| c.id)
}

fn apply(state: &mut GameState, signature: PatternSignature, side: Option<Side>, receivers: &[PlayerId]) {
    let candidates = cover_defenders(state);
    let ball_x = state.ball_x();
    let los_y = state.los_y();
    match signature {
        PatternSignature::Smash => {
            let (hitch, corner) = (receivers[0], receivers[1]);
            let under = nearest_unused(&candidates, &[], receiver_position(state, hitch), |ty, _| {
                ty == PositionType::Cornerback
            });
            let over = nearest_unused(
                &candidates,
                &under.into_iter().collect::<Vec<_>>(),
                receiver_position(state, corner),
                |ty, zone| ty == PositionType::Safety || zone.is_some_and(ZoneKind::is_deep),
            );
            if let (Some(under), Some(over)) = (under, over) {
                set_kind(
                    state,
                    under,
                    man(hitch, Some(Bracket { partner: over, role: BracketRole::Under })),
                );
                set_kind(
                    state,
                    over,
                    man(corner, Some(Bracket { partner: under, role: BracketRole::Over })),
                );
            }
        }
        PatternSignature::Flood => {
            let Some(side) = side else { return };
            let mut on_side: Vec<_> = candidates
                .iter()
                .filter(|c| {
                    c.zone.is_some()
                        && (c.zone.and_then(ZoneKind::side) == Some(side)
                            || Side::of(c.position.x, ball_x) == side)
                })
                .copied()
                .collect();
            // Deepest defender takes the deepest route.
            on_side.sort_by(|a, b| b.position.y.total_cmp(&a.position.y));
            for (defender, receiver) in on_side.iter().zip(receivers) {
                set_kind(state, defender.id, man(*receiver, None));
            }
        }
        PatternSignature::Mesh => {
            let mut used = Vec::new();
            for &receiver in receivers {
                let to = receiver_position(state, receiver);
                if let Some(defender) = nearest_unused(&candidates, &used, to, |_, zone| {
                    zone.is_some_and(|z| !z.is_deep())
                }) {
                    set_kind(state, defender, man(receiver, None));
                    used.push(defender);
                }
            }
        }
        PatternSignature::FourVerticals => {
            let mut deep: Vec<_> = candidates.iter().filter(|c| c.zone.is_some()).copied().collect();
            deep.sort_by(|a, b| b.position.y.total_cmp(&a.position.y));
            deep.truncate(4);
            deep.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
            let kinds = [
                ZoneKind::DeepQuarter(Side::Left),
                ZoneKind::InnerQuarter(Side::Left),
                ZoneKind::InnerQuarter(Side::Right),
                ZoneKind::DeepQuarter(Side::Right),
            ];
            let kinds: &[ZoneKind] = if deep.len() == 4 { &kinds } else { &kinds[1..3] };
            for (defender, kind) in deep.iter().zip(kinds) {
                set_kind(
                    state,
                    defender.id,
                    ResponsibilityKind::Zone {
                        zone: Zone::landmark(*kind, ball_x, los_y),
                        read: None,
                    },
                );
            }
        }
        PatternSignature::TripsVertical => {
            let Some(strength) = side else { return };
            let mut safeties: Vec<_> = candidates
                .iter()
                .filter(|c| c.position_type == PositionType::Safety)
                .copied()
                .collect();
            safeties.sort_by(|a, b| {
                let da = (a.position.x - ball_x) * strength.sign();
                let db = (b.position.x - ball_x) * strength.sign();
                db.total_cmp(&da)
            });
            if let Some(rotating) = safeties.first() {
                set_kind(
                    state,
                    rotating.id,
                    ResponsibilityKind::Zone {
                        zone: Zone::landmark(ZoneKind::DeepHalf(strength), ball_x, los_y),
                        read: None,
                    },
                );
            }
            if let Some(robber) = safeties.get(1) {
                set_kind(
                    state,
                    robber.id,
                    ResponsibilityKind::Zone {
                        zone: Zone::landmark(ZoneKind::Robber, ball_x, los_y),
                        read: Some(ZoneRead::Robber),
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_times() {
        assert!(PatternSignature::Mesh.trigger_time() < PatternSignature::Smash.trigger_time());
        assert!(
            PatternSignature::FourVerticals.trigger_time()
                > PatternSignature::Flood.trigger_time()
        );
    }

    fn read(id: PlayerId, side: Side, route: RouteType, split: f32) -> RouteRead {
        RouteRead {
            id,
            side,
            route,
            split,
        }
    }

    #[test]
    fn test_recognize_smash_needs_corner_inside() {
        let state = GameState::default();
        let smash = [
            read(2, Side::Left, RouteType::Hitch, 20.0),
            read(3, Side::Left, RouteType::Corner, 12.0),
        ];
        let found = recognize(PatternSignature::Smash, &smash, &state);
        assert_eq!(found, Some((Some(Side::Left), vec![2, 3])));

        let reversed = [
            read(2, Side::Left, RouteType::Hitch, 10.0),
            read(3, Side::Left, RouteType::Corner, 18.0),
        ];
        assert!(recognize(PatternSignature::Smash, &reversed, &state).is_none());
    }

    #[test]
    fn test_recognize_flood_three_levels() {
        let state = GameState::default();
        let flood = [
            read(2, Side::Right, RouteType::Flat, 4.0),
            read(3, Side::Right, RouteType::Out, 12.0),
            read(4, Side::Right, RouteType::Go, 20.0),
            read(5, Side::Left, RouteType::Post, 20.0),
        ];
        let (side, ids) = recognize(PatternSignature::Flood, &flood, &state).unwrap();
        assert_eq!(side, Some(Side::Right));
        assert_eq!(ids, vec![4, 3, 2]);
    }

    #[test]
    fn test_recognize_mesh_requires_both_sides() {
        let state = GameState::default();
        let one_side = [
            read(2, Side::Left, RouteType::Drag, 12.0),
            read(3, Side::Left, RouteType::Drag, 6.0),
        ];
        assert!(recognize(PatternSignature::Mesh, &one_side, &state).is_none());
        let mesh = [
            read(2, Side::Left, RouteType::Drag, 12.0),
            read(3, Side::Right, RouteType::Drag, 12.0),
        ];
        assert!(recognize(PatternSignature::Mesh, &mesh, &state).is_some());
    }

    #[test]
    fn test_recognize_four_verticals() {
        let state = GameState::default();
        let three = [
            read(2, Side::Left, RouteType::Go, 20.0),
            read(3, Side::Left, RouteType::Seam, 12.0),
            read(4, Side::Right, RouteType::Seam, 12.0),
        ];
        assert!(recognize(PatternSignature::FourVerticals, &three, &state).is_none());
        let mut four = three.to_vec();
        four.push(read(5, Side::Right, RouteType::Go, 20.0));
        assert!(recognize(PatternSignature::FourVerticals, &four, &state).is_some());
    }
}
