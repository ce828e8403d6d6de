//! Coverage schemes.
//!
//! Each [`CoverageFamily`] is answered by one stateless scheme that knows
//! how to align against a formation, what to do every tick, how to answer
//! motion and which route combinations it pattern-matches.

mod man;
mod single_high;
mod two_high;

pub use man::{CoverOne, CoverZero};
pub use single_high::CoverThree;
pub use two_high::{CoverFour, CoverSix, CoverTwo, TampaTwo};

use tracing::debug;

use crate::alignment::{align_defense, AlignmentContext};
use crate::components::{Player, PlayerId};
use crate::config::EngineConfig;
use crate::coverage::{CoverageFamily, Leverage, ResponsibilityKind, ZoneKind, ZoneRead};
use crate::math::Vec2;
use crate::pattern_match::PatternSignature;
use crate::state::GameState;

/// Behavior of one coverage family.
pub trait CoverageScheme: Sync {
    /// Family this scheme plays.
    fn family(&self) -> CoverageFamily;

    /// Assign and align every defender not in `reserved`.
    fn align(&self, ctx: &AlignmentContext<'_>, defenders: &mut [Player], reserved: &[PlayerId]);

    /// Post-snap adjustments run before movement each tick.
    fn per_tick(&self, _state: &mut GameState, _config: &EngineConfig) {}

    /// Answer a completed motion by `mover`, who started at `from`.
    ///
    /// Zone families re-align the whole defense.
    fn respond_to_motion(&self, state: &mut GameState, mover: PlayerId, from: Vec2) {
        let _ = from;
        debug!(mover, family = ?self.family(), "Defense re-aligns to motion");
        align_defense(state);
    }

    /// Whether the scheme answers `signature` post-snap.
    fn pattern_match_eligible(&self, signature: PatternSignature) -> bool;

    /// Leverage man defenders play with.
    fn man_leverage(&self) -> Leverage {
        Leverage::Inside
    }
}

static COVER_ZERO: CoverZero = CoverZero;
static COVER_ONE: CoverOne = CoverOne;
static COVER_TWO: CoverTwo = CoverTwo;
static TAMPA_TWO: TampaTwo = TampaTwo;
static COVER_THREE: CoverThree = CoverThree;
static COVER_FOUR: CoverFour = CoverFour;
static COVER_SIX: CoverSix = CoverSix;

/// Scheme for `family`.
#[must_use]
pub fn scheme_for(family: CoverageFamily) -> &'static dyn CoverageScheme {
    match family {
        CoverageFamily::Cover0 => &COVER_ZERO,
        CoverageFamily::Cover1 => &COVER_ONE,
        CoverageFamily::Cover2 => &COVER_TWO,
        CoverageFamily::Tampa2 => &TAMPA_TWO,
        CoverageFamily::Cover3 => &COVER_THREE,
        CoverageFamily::Cover4 => &COVER_FOUR,
        CoverageFamily::Cover6 => &COVER_SIX,
    }
}

/// Slide the defender manned on `mover` by the mover's lateral travel.
///
/// Returns the defender that travelled, if any.
pub fn travel_with_motion(state: &mut GameState, mover: PlayerId, from: Vec2) -> Option<PlayerId> {
    let to = state.player(mover)?.position;
    let shift = to.x - from.x;
    let defender = state
        .players
        .iter_mut()
        .find(|d| d.responsibility.is_some_and(|r| r.man_target() == Some(mover)))?;
    defender.position.x += shift;
    defender.alignment = defender.position;
    if let Some(disguise) = defender
        .responsibility
        .as_mut()
        .and_then(|r| r.disguise.as_mut())
    {
        disguise.shell.x += shift;
    }
    debug!(mover, defender = defender.id, shift, "Defender travels with motion");
    Some(defender.id)
}

/// Convert quarter defenders to man on a receiver who is deep in their quarter.
///
/// A receiver counts once he is `man_only_deep_depth` yards past the line
/// inside the defender's zone. Each receiver is taken by one defender.
/// A poaching safety stays on its key.
pub fn man_only_deep(state: &mut GameState, config: &EngineConfig) -> usize {
    let los_y = state.los_y();
    let deep_receivers: Vec<(PlayerId, Vec2)> = state
        .offense()
        .filter(|p| p.is_eligible_receiver() && p.position.y - los_y >= config.man_only_deep_depth)
        .map(|p| (p.id, p.position))
        .collect();
    if deep_receivers.is_empty() {
        return 0;
    }
    let mut taken: Vec<PlayerId> = state
        .defense()
        .filter_map(|d| d.responsibility.and_then(|r| r.man_target()))
        .collect();

    let mut converted = 0;
    for defender in state.players.iter_mut().filter(|p| p.is_defense()) {
        let Some(resp) = defender.responsibility.as_mut() else {
            continue;
        };
        let ResponsibilityKind::Zone { zone, read } = resp.kind else {
            continue;
        };
        if !matches!(zone.kind, ZoneKind::DeepQuarter(_) | ZoneKind::InnerQuarter(_))
            || matches!(read, Some(ZoneRead::Poach { .. }))
        {
            continue;
        }
        let Some(&(target, _)) = deep_receivers
            .iter()
            .filter(|(id, position)| !taken.contains(id) && zone.contains(*position))
            .min_by(|a, b| {
                a.1.distance(defender.position)
                    .total_cmp(&b.1.distance(defender.position))
            })
        else {
            continue;
        };
        resp.kind = ResponsibilityKind::Man {
            target,
            leverage: Leverage::Outside,
            bracket: None,
        };
        taken.push(target);
        converted += 1;
        debug!(defender = defender.id, receiver = target, "Quarter defender locks man");
    }
    converted
}
