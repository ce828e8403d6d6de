//! Man-free and man-zero.

use crate::alignment::{
    assign_blitzers, assign_man, defender_mut, match_man, pick, safeties, take, underneath_depth,
    AlignmentContext,
};
use crate::components::{Player, PlayerId, PositionType};
use crate::coverage::{CoverageFamily, CoverageResponsibility, Leverage, ZoneKind, ZoneRead};
use crate::math::Vec2;
use crate::pattern_match::PatternSignature;
use crate::state::GameState;

use super::{travel_with_motion, CoverageScheme};

/// Free safety depth in Cover 1.
const FREE_SAFETY_DEPTH: f32 = 15.5;

fn available(defenders: &[Player], reserved: &[PlayerId]) -> Vec<PlayerId> {
    defenders
        .iter()
        .map(|d| d.id)
        .filter(|id| !reserved.contains(id))
        .collect()
}

fn man_up(
    ctx: &AlignmentContext<'_>,
    defenders: &mut [Player],
    available: &mut Vec<PlayerId>,
    leverage: Leverage,
) {
    for (defender, receiver) in match_man(ctx, defenders, available) {
        if let Some(player) = defender_mut(defenders, defender) {
            assign_man(ctx, player, receiver, leverage);
        }
        take(available, defender);
    }
}

/// Cover 0: everyone in man, everyone left over rushes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverZero;

impl CoverageScheme for CoverZero {
    fn family(&self) -> CoverageFamily {
        CoverageFamily::Cover0
    }

    fn align(&self, ctx: &AlignmentContext<'_>, defenders: &mut [Player], reserved: &[PlayerId]) {
        let mut available = available(defenders, reserved);
        man_up(ctx, defenders, &mut available, self.man_leverage());
        assign_blitzers(ctx, defenders, &available);
    }

    fn respond_to_motion(&self, state: &mut GameState, mover: PlayerId, from: Vec2) {
        travel_with_motion(state, mover, from);
    }

    fn pattern_match_eligible(&self, _signature: PatternSignature) -> bool {
        false
    }

    fn man_leverage(&self) -> Leverage {
        Leverage::Press
    }
}

/// Cover 1: man under a single free safety, one lurker, the rest rush.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverOne;

impl CoverageScheme for CoverOne {
    fn family(&self) -> CoverageFamily {
        CoverageFamily::Cover1
    }

    fn align(&self, ctx: &AlignmentContext<'_>, defenders: &mut [Player], reserved: &[PlayerId]) {
        let mut available = available(defenders, reserved);

        let free = defenders
            .iter()
            .find(|d| d.label == "FS" && available.contains(&d.id))
            .map(|d| d.id)
            .or_else(|| safeties(defenders, &available).1)
            .or_else(|| safeties(defenders, &available).0);
        if let Some(id) = free {
            if let Some(fs) = defender_mut(defenders, id) {
                fs.position = ctx.spot(ctx.ball_x, FREE_SAFETY_DEPTH);
                fs.responsibility = Some(CoverageResponsibility::zone(
                    id,
                    ctx.zone(ZoneKind::DeepMiddle),
                ));
            }
            take(&mut available, id);
        }

        man_up(ctx, defenders, &mut available, self.man_leverage());

        // Prefer a linebacker in the lurk.
        let lurker = pick(defenders, &available, |d| d.position_type == PositionType::Linebacker)
            .first()
            .copied()
            .or_else(|| available.first().copied());
        if let Some(id) = lurker {
            if let Some(player) = defender_mut(defenders, id) {
                let depth = underneath_depth(player.position_type);
                player.position = ctx.spot(ctx.ball_x, depth);
                player.responsibility = Some(CoverageResponsibility::zone_with_read(
                    id,
                    ctx.zone(ZoneKind::MiddleHook),
                    ZoneRead::Lurk,
                ));
            }
            take(&mut available, id);
        }

        assign_blitzers(ctx, defenders, &available);
    }

    fn respond_to_motion(&self, state: &mut GameState, mover: PlayerId, from: Vec2) {
        travel_with_motion(state, mover, from);
    }

    fn pattern_match_eligible(&self, signature: PatternSignature) -> bool {
        signature == PatternSignature::Mesh
    }

    fn man_leverage(&self) -> Leverage {
        Leverage::Outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::roster;
    use crate::coverage::ResponsibilityKind;
    use crate::field::{HashMark, CENTER_X};
    use crate::formation::analyze;
    use crate::personnel::DefensivePackage;

    const LOS_Y: f32 = 40.0;

    fn offense() -> Vec<Player> {
        let at = |dx: f32, depth: f32| Vec2::new(CENTER_X + dx, LOS_Y - depth);
        vec![
            Player::new(1, "QB", PositionType::Quarterback, at(0.0, 5.0)),
            Player::new(2, "X", PositionType::WideReceiver, at(-20.0, 0.5)),
            Player::new(3, "Y", PositionType::TightEnd, at(4.0, 0.5)),
            Player::new(4, "Z", PositionType::WideReceiver, at(20.0, 0.5)),
        ]
    }

    #[test]
    fn test_cover_one_shape() {
        let offense = offense();
        let analysis = analyze(&offense, CENTER_X, LOS_Y, HashMark::Middle);
        let ctx = AlignmentContext {
            offense: &offense,
            analysis: &analysis,
            ball_x: CENTER_X,
            los_y: LOS_Y,
            hash: HashMark::Middle,
            package: DefensivePackage::Base,
        };
        let mut defenders = roster(&ctx);
        CoverOne.align(&ctx, &mut defenders, &[]);

        let fs = defenders.iter().find(|d| d.label == "FS").unwrap();
        assert!((fs.position.y - LOS_Y - FREE_SAFETY_DEPTH).abs() < 1.0e-4);

        let manned = defenders
            .iter()
            .filter(|d| d.responsibility.is_some_and(|r| r.man_target().is_some()))
            .count();
        assert_eq!(manned, 3);

        let lurkers = defenders
            .iter()
            .filter(|d| {
                matches!(
                    d.responsibility.map(|r| r.kind),
                    Some(ResponsibilityKind::Zone {
                        read: Some(ZoneRead::Lurk),
                        ..
                    })
                )
            })
            .count();
        assert_eq!(lurkers, 1);
        assert_eq!(defenders.iter().filter(|d| d.is_blitzing()).count(), 2);
        for corner in defenders.iter().filter(|d| d.position_type == PositionType::Cornerback) {
            let depth = corner.position.y - LOS_Y;
            assert!((1.0..=3.0).contains(&depth));
        }
    }
}
