//! Two-high zone families: Cover 2, Tampa 2, quarters and Cover 6.

use crate::alignment::{
    assign_underneath, assign_zone, corners, defender_mut, safeties, take, AlignmentContext,
};
use crate::components::{Player, PlayerId};
use crate::config::EngineConfig;
use crate::coverage::{
    CoverageFamily, CoverageResponsibility, ResponsibilityKind, ZoneKind, ZoneRead,
};
use crate::field::Side;
use crate::pattern_match::PatternSignature;
use crate::state::GameState;

use super::{man_only_deep, CoverageScheme};

const HALF_SAFETY_DEPTH: f32 = 13.5;
const QUARTER_SAFETY_DEPTH: f32 = 10.5;
const QUARTER_CORNER_DEPTH: f32 = 8.0;
const SQUAT_CORNER_DEPTH: f32 = 5.0;
const CLOUD_CORNER_DEPTH: f32 = 5.5;

/// Safety split off the ball in a two-high shell.
const SAFETY_SPLIT: f32 = 9.0;

/// What a corner and safety play to one side of a two-high shell.
#[derive(Debug, Clone, Copy)]
struct SideCall {
    corner: ZoneKind,
    corner_depth: f32,
    safety: ZoneKind,
    safety_depth: f32,
}

impl SideCall {
    const fn halves(side: Side, corner_depth: f32) -> Self {
        Self {
            corner: ZoneKind::Flat(side),
            corner_depth,
            safety: ZoneKind::DeepHalf(side),
            safety_depth: HALF_SAFETY_DEPTH,
        }
    }

    const fn quarters(side: Side) -> Self {
        Self {
            corner: ZoneKind::DeepQuarter(side),
            corner_depth: QUARTER_CORNER_DEPTH,
            safety: ZoneKind::InnerQuarter(side),
            safety_depth: QUARTER_SAFETY_DEPTH,
        }
    }
}

/// Align the shell: corners and safeties per side, the rest underneath.
fn align_shell(
    ctx: &AlignmentContext<'_>,
    defenders: &mut [Player],
    reserved: &[PlayerId],
    left: SideCall,
    right: SideCall,
    underneath: &[&[ZoneKind]],
) {
    let mut available: Vec<PlayerId> = defenders
        .iter()
        .map(|d| d.id)
        .filter(|id| !reserved.contains(id))
        .collect();
    let strength = ctx.strength();
    let call = |side: Side| if side == Side::Left { left } else { right };

    let (lcb, rcb) = corners(defenders, &available);
    for (id, side) in [(lcb, Side::Left), (rcb, Side::Right)] {
        let Some(id) = id else { continue };
        if let Some(cb) = defender_mut(defenders, id) {
            let c = call(side);
            assign_zone(ctx, cb, c.corner, ctx.corner_x(side), c.corner_depth);
        }
        take(&mut available, id);
    }

    let (strong, weak) = safeties(defenders, &available);
    for (id, side) in [(strong, strength), (weak, strength.opposite())] {
        let Some(id) = id else { continue };
        if let Some(s) = defender_mut(defenders, id) {
            let c = call(side);
            let x = ctx.ball_x + side.sign() * SAFETY_SPLIT;
            assign_zone(ctx, s, c.safety, x, c.safety_depth);
        }
        take(&mut available, id);
    }

    assign_underneath(ctx, defenders, &available, underneath);
}

const HOOKS: [&[ZoneKind]; 3] = [
    &[ZoneKind::MiddleHook],
    &[ZoneKind::Hook(Side::Left), ZoneKind::Hook(Side::Right)],
    &[
        ZoneKind::Hook(Side::Left),
        ZoneKind::MiddleHook,
        ZoneKind::Hook(Side::Right),
    ],
];

/// Cover 2: corners squat in the flats under two deep halves.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverTwo;

impl CoverageScheme for CoverTwo {
    fn family(&self) -> CoverageFamily {
        CoverageFamily::Cover2
    }

    fn align(&self, ctx: &AlignmentContext<'_>, defenders: &mut [Player], reserved: &[PlayerId]) {
        align_shell(
            ctx,
            defenders,
            reserved,
            SideCall::halves(Side::Left, SQUAT_CORNER_DEPTH),
            SideCall::halves(Side::Right, SQUAT_CORNER_DEPTH),
            &HOOKS,
        );
    }

    fn pattern_match_eligible(&self, signature: PatternSignature) -> bool {
        matches!(signature, PatternSignature::Smash | PatternSignature::Flood)
    }
}

/// Tampa 2: Cover 2 with the middle defender running the deep hole.
#[derive(Debug, Clone, Copy, Default)]
pub struct TampaTwo;

impl CoverageScheme for TampaTwo {
    fn family(&self) -> CoverageFamily {
        CoverageFamily::Tampa2
    }

    fn align(&self, ctx: &AlignmentContext<'_>, defenders: &mut [Player], reserved: &[PlayerId]) {
        align_shell(
            ctx,
            defenders,
            reserved,
            SideCall::halves(Side::Left, SQUAT_CORNER_DEPTH),
            SideCall::halves(Side::Right, SQUAT_CORNER_DEPTH),
            &HOOKS,
        );
        let middle = defenders.iter_mut().find(|d| {
            !reserved.contains(&d.id)
                && d.responsibility
                    .as_ref()
                    .and_then(|r| r.zone_area())
                    .is_some_and(|z| z.kind == ZoneKind::MiddleHook)
        });
        if let Some(mike) = middle {
            mike.responsibility = Some(CoverageResponsibility::zone_with_read(
                mike.id,
                ctx.zone(ZoneKind::Hole),
                ZoneRead::Hole,
            ));
        }
    }

    fn pattern_match_eligible(&self, signature: PatternSignature) -> bool {
        matches!(
            signature,
            PatternSignature::Smash | PatternSignature::Flood | PatternSignature::FourVerticals
        )
    }
}

const QUARTERS_UNDER: [&[ZoneKind]; 3] = [
    &[ZoneKind::MiddleHook],
    &[ZoneKind::CurlFlat(Side::Left), ZoneKind::CurlFlat(Side::Right)],
    &[
        ZoneKind::CurlFlat(Side::Left),
        ZoneKind::MiddleHook,
        ZoneKind::CurlFlat(Side::Right),
    ],
];

/// Against trips the backside quarter safety keys #3 to the trips side.
fn poach_trips(
    ctx: &AlignmentContext<'_>,
    defenders: &mut [Player],
    reserved: &[PlayerId],
    trips: Side,
) {
    let Some(&key) = ctx.analysis.side(trips).get(2) else {
        return;
    };
    let backside = ZoneKind::InnerQuarter(trips.opposite());
    let safety = defenders.iter_mut().find(|d| {
        !reserved.contains(&d.id)
            && d.responsibility
                .as_ref()
                .and_then(|r| r.zone_area())
                .is_some_and(|z| z.kind == backside)
    });
    if let Some(safety) = safety {
        if let Some(resp) = safety.responsibility.as_mut() {
            if let ResponsibilityKind::Zone { read, .. } = &mut resp.kind {
                *read = Some(ZoneRead::Poach { key });
            }
        }
    }
}

/// Cover 4: pattern-matching quarters.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverFour;

impl CoverageScheme for CoverFour {
    fn family(&self) -> CoverageFamily {
        CoverageFamily::Cover4
    }

    fn align(&self, ctx: &AlignmentContext<'_>, defenders: &mut [Player], reserved: &[PlayerId]) {
        align_shell(
            ctx,
            defenders,
            reserved,
            SideCall::quarters(Side::Left),
            SideCall::quarters(Side::Right),
            &QUARTERS_UNDER,
        );
        if let Some(trips) = ctx.analysis.trips {
            poach_trips(ctx, defenders, reserved, trips);
        }
    }

    fn per_tick(&self, state: &mut GameState, config: &EngineConfig) {
        man_only_deep(state, config);
    }

    fn pattern_match_eligible(&self, signature: PatternSignature) -> bool {
        matches!(
            signature,
            PatternSignature::Smash
                | PatternSignature::FourVerticals
                | PatternSignature::TripsVertical
        )
    }
}

/// Cover 6: quarters to the strength, halves to the weak side.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverSix;

impl CoverageScheme for CoverSix {
    fn family(&self) -> CoverageFamily {
        CoverageFamily::Cover6
    }

    fn align(&self, ctx: &AlignmentContext<'_>, defenders: &mut [Player], reserved: &[PlayerId]) {
        let strength = ctx.strength();
        let weak = strength.opposite();
        let (left, right) = if strength == Side::Left {
            (SideCall::quarters(Side::Left), SideCall::halves(Side::Right, CLOUD_CORNER_DEPTH))
        } else {
            (SideCall::halves(Side::Left, CLOUD_CORNER_DEPTH), SideCall::quarters(Side::Right))
        };
        let under: [ZoneKind; 3] = if strength == Side::Left {
            [ZoneKind::CurlFlat(strength), ZoneKind::MiddleHook, ZoneKind::Hook(weak)]
        } else {
            [ZoneKind::Hook(weak), ZoneKind::MiddleHook, ZoneKind::CurlFlat(strength)]
        };
        let pair: [ZoneKind; 2] = [under[0], under[2]];
        let layouts: [&[ZoneKind]; 3] = [&[ZoneKind::MiddleHook], &pair, &under];
        align_shell(ctx, defenders, reserved, left, right, &layouts);
    }

    fn per_tick(&self, state: &mut GameState, config: &EngineConfig) {
        man_only_deep(state, config);
    }

    fn pattern_match_eligible(&self, signature: PatternSignature) -> bool {
        matches!(
            signature,
            PatternSignature::Smash | PatternSignature::Flood | PatternSignature::TripsVertical
        )
    }
}
