//! Single-high zone: Cover 3.

use crate::alignment::{
    assign_underneath, assign_zone, corners, defender_mut, pick, safeties, take, AlignmentContext,
};
use crate::components::{Player, PlayerId, PositionType};
use crate::coverage::{CoverageFamily, ZoneKind};
use crate::field::Side;
use crate::pattern_match::PatternSignature;

use super::CoverageScheme;

const CORNER_DEPTH: f32 = 7.0;
const FREE_SAFETY_DEPTH: f32 = 13.5;
const CURL_FLAT_DEPTH: f32 = 7.0;

/// Cover 3: three deep, four under.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverThree;

impl CoverageScheme for CoverThree {
    fn family(&self) -> CoverageFamily {
        CoverageFamily::Cover3
    }

    fn align(&self, ctx: &AlignmentContext<'_>, defenders: &mut [Player], reserved: &[PlayerId]) {
        let mut available: Vec<PlayerId> = defenders
            .iter()
            .map(|d| d.id)
            .filter(|id| !reserved.contains(id))
            .collect();
        let strength = ctx.strength();

        let (left, right) = corners(defenders, &available);
        for (id, side) in [(left, Side::Left), (right, Side::Right)] {
            let Some(id) = id else { continue };
            if let Some(cb) = defender_mut(defenders, id) {
                assign_zone(ctx, cb, ZoneKind::DeepThird(side), ctx.corner_x(side), CORNER_DEPTH);
            }
            take(&mut available, id);
        }

        let (strong, weak) = safeties(defenders, &available);
        let (middle, rotated) = match (strong, weak) {
            (Some(s), Some(w)) => (Some(w), Some(s)),
            (single, None) => (single, None),
            (None, single) => (single, None),
        };
        if let Some(id) = middle {
            if let Some(fs) = defender_mut(defenders, id) {
                assign_zone(ctx, fs, ZoneKind::DeepMiddle, ctx.ball_x, FREE_SAFETY_DEPTH);
            }
            take(&mut available, id);
        }
        if let Some(id) = rotated {
            if let Some(ss) = defender_mut(defenders, id) {
                let kind = ZoneKind::CurlFlat(strength);
                let x = ctx.zone(kind).center.x;
                assign_zone(ctx, ss, kind, x, CURL_FLAT_DEPTH);
            }
            take(&mut available, id);
        }

        // Weak curl-flat goes to a slot defender first, then the weak linebacker.
        let weak_flat = pick(defenders, &available, |d| d.position_type == PositionType::Nickel)
            .first()
            .copied()
            .or_else(|| {
                pick(defenders, &available, |d| d.label == "WLB")
                    .first()
                    .copied()
            })
            .or_else(|| available.first().copied());
        if let Some(id) = weak_flat {
            if let Some(player) = defender_mut(defenders, id) {
                let kind = ZoneKind::CurlFlat(strength.opposite());
                let depth = if player.position_type == PositionType::Nickel { 5.5 } else { 5.0 };
                assign_zone(ctx, player, kind, ctx.zone(kind).center.x, depth);
            }
            take(&mut available, id);
        }

        let hooks: [&[ZoneKind]; 3] = [
            &[ZoneKind::MiddleHook],
            &[ZoneKind::Hook(Side::Left), ZoneKind::Hook(Side::Right)],
            &[
                ZoneKind::Hook(Side::Left),
                ZoneKind::MiddleHook,
                ZoneKind::Hook(Side::Right),
            ],
        ];
        assign_underneath(ctx, defenders, &available, &hooks);
    }

    fn pattern_match_eligible(&self, signature: PatternSignature) -> bool {
        matches!(
            signature,
            PatternSignature::Flood
                | PatternSignature::FourVerticals
                | PatternSignature::TripsVertical
                | PatternSignature::Mesh
        )
    }
}
