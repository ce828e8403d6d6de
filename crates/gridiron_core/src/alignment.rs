//! Defensive alignment.
//!
//! Builds the seven defenders for the package on the field, hands the
//! unreserved ones to the coverage scheme, then layers the coverage
//! template on top: extra blitzers, spy, robber, static spots, a
//! disguise shell and any corner/safety invert.

use tracing::debug;

use crate::components::{Player, PlayerId, PositionType, FIRST_DEFENDER_ID};
use crate::coverage::{
    CoverageResponsibility, Disguise, Leverage, RushLane, Zone, ZoneKind, ZoneRead,
};
use crate::data::{CoverageData, InvertData};
use crate::field::{clamp_to_field, HashMark, Side};
use crate::formation::{analyze, FormationAnalysis};
use crate::math::Vec2;
use crate::personnel::DefensivePackage;
use crate::schemes::scheme_for;
use crate::state::GameState;

/// Depth past the line a spy sits at.
pub const SPY_DEPTH: f32 = 6.0;

/// Depth past the line a robber sits at.
pub const ROBBER_DEPTH: f32 = 9.0;

/// Lateral split of a corner with no #1 receiver to his side.
pub const CORNER_DEFAULT_SPLIT: f32 = 14.0;

/// How a receiver is read for man matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverRole {
    /// Widest detached receiver to a side.
    Outside,
    /// Inside detached receiver (#2 or #3).
    Slot,
    /// Tight end, attached or detached.
    TightEnd,
    /// Backfield player.
    Back,
}

impl ReceiverRole {
    /// Matching penalty for a defender of `position_type` covering this role.
    #[must_use]
    pub const fn penalty(self, position_type: PositionType) -> f32 {
        use PositionType::{Cornerback, Linebacker, Nickel, Safety};
        match (self, position_type) {
            (Self::Outside, Cornerback) => 0.0,
            (Self::Outside, Nickel) => 5.0,
            (Self::Outside, Safety) => 10.0,
            (Self::Slot, Nickel) => 0.0,
            (Self::Slot, Safety) => 4.0,
            (Self::Slot, Cornerback) => 6.0,
            (Self::Slot, Linebacker) => 8.0,
            (Self::TightEnd, Safety) => 0.0,
            (Self::TightEnd, Linebacker) => 2.0,
            (Self::TightEnd, Nickel) => 3.0,
            (Self::TightEnd, Cornerback) => 8.0,
            (Self::Back, Linebacker) => 0.0,
            (Self::Back, Safety) => 4.0,
            (Self::Back, Nickel) => 5.0,
            (Self::Back, Cornerback) => 10.0,
            _ => 20.0,
        }
    }
}

/// Everything a scheme needs to align against an offense.
#[derive(Debug, Clone, Copy)]
pub struct AlignmentContext<'a> {
    /// Offensive players.
    pub offense: &'a [Player],
    /// Read of the offensive alignment.
    pub analysis: &'a FormationAnalysis,
    /// Lateral spot of the ball.
    pub ball_x: f32,
    /// Field y of the line of scrimmage.
    pub los_y: f32,
    /// Hash the ball is on.
    pub hash: HashMark,
    /// Package on the field.
    pub package: DefensivePackage,
}

impl AlignmentContext<'_> {
    /// Strength side of the formation.
    #[must_use]
    pub fn strength(&self) -> Side {
        self.analysis.strength_or_right()
    }

    /// Offensive player by id.
    #[must_use]
    pub fn offensive_player(&self, id: PlayerId) -> Option<&Player> {
        self.offense.iter().find(|p| p.id == id)
    }

    /// The quarterback's id, if he is on the field.
    #[must_use]
    pub fn quarterback_id(&self) -> Option<PlayerId> {
        self.offense.iter().find(|p| p.is_quarterback()).map(|p| p.id)
    }

    /// Receivers that need covering.
    pub fn receivers(&self) -> impl Iterator<Item = &Player> {
        self.offense.iter().filter(|p| p.is_eligible_receiver())
    }

    /// Role of receiver `id`.
    #[must_use]
    pub fn role_of(&self, id: PlayerId) -> ReceiverRole {
        if self.analysis.backfield.contains(&id) {
            return ReceiverRole::Back;
        }
        if self
            .offensive_player(id)
            .is_some_and(|p| p.position_type == PositionType::TightEnd)
        {
            return ReceiverRole::TightEnd;
        }
        match self.analysis.number_of(id) {
            Some((_, 1)) => ReceiverRole::Outside,
            _ => ReceiverRole::Slot,
        }
    }

    /// Widest detached receiver on `side`.
    #[must_use]
    pub fn number_one(&self, side: Side) -> Option<&Player> {
        self.analysis
            .side(side)
            .first()
            .and_then(|&id| self.offensive_player(id))
    }

    /// Field spot `depth` yards past the line at lateral `x`.
    #[must_use]
    pub fn spot(&self, x: f32, depth: f32) -> Vec2 {
        clamp_to_field(Vec2::new(x, self.los_y + depth))
    }

    /// Lateral spot for the corner on `side`: just outside the #1.
    #[must_use]
    pub fn corner_x(&self, side: Side) -> f32 {
        self.number_one(side).map_or_else(
            || self.ball_x + side.sign() * CORNER_DEFAULT_SPLIT,
            |wr| wr.position.x + side.sign(),
        )
    }

    /// Zone landmark for `kind` at this snap.
    #[must_use]
    pub fn zone(&self, kind: ZoneKind) -> Zone {
        Zone::landmark(kind, self.ball_x, self.los_y)
    }

    /// Side a defender label lines up on before anything else is known.
    #[must_use]
    pub fn label_side(&self, label: &str) -> Option<Side> {
        let strength = self.strength();
        match label {
            "LCB" => Some(Side::Left),
            "RCB" => Some(Side::Right),
            "SS" | "SLB" | "NB" => Some(strength),
            "FS" | "WLB" | "DB" => Some(strength.opposite()),
            _ => None,
        }
    }

    /// Nominal spot for a defender before a scheme places him.
    #[must_use]
    pub fn default_spot(&self, label: &str, position_type: PositionType) -> Vec2 {
        let (dx, depth) = static_offset(position_type);
        let sign = self.label_side(label).map_or(0.0, Side::sign);
        self.spot(self.ball_x + sign * dx, depth)
    }
}

/// Fallback (lateral split, depth) by position type.
#[must_use]
pub const fn static_offset(position_type: PositionType) -> (f32, f32) {
    match position_type {
        PositionType::Cornerback => (16.0, 7.0),
        PositionType::Safety => (10.0, 12.0),
        PositionType::Nickel => (8.0, 5.0),
        PositionType::Linebacker => (4.0, 5.0),
        PositionType::Quarterback
        | PositionType::RunningBack
        | PositionType::TightEnd
        | PositionType::WideReceiver => (0.0, 5.0),
    }
}

/// Depth past the line a rusher starts from.
#[must_use]
pub const fn blitz_depth(position_type: PositionType) -> f32 {
    match position_type {
        PositionType::Linebacker => 4.5,
        PositionType::Nickel => 4.0,
        PositionType::Safety => 5.0,
        _ => 3.0,
    }
}

// ============================================================================
// Shared placement helpers
// ============================================================================

/// Greedy man matching of `defenders` to uncovered receivers.
///
/// Cost is the role penalty plus the distance from the defender's current
/// spot. Returns `(defender, receiver)` pairs.
#[must_use]
pub fn match_man(
    ctx: &AlignmentContext<'_>,
    defenders: &[Player],
    available: &[PlayerId],
) -> Vec<(PlayerId, PlayerId)> {
    let receivers: Vec<&Player> = ctx.receivers().collect();
    let mut costs = Vec::with_capacity(available.len() * receivers.len());
    for defender in defenders.iter().filter(|d| available.contains(&d.id)) {
        for receiver in &receivers {
            let cost = ctx.role_of(receiver.id).penalty(defender.position_type)
                + defender.position.distance(receiver.position);
            costs.push((cost, defender.id, receiver.id));
        }
    }
    costs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut pairs: Vec<(PlayerId, PlayerId)> = Vec::new();
    for (_, defender, receiver) in costs {
        if pairs.iter().any(|&(d, r)| d == defender || r == receiver) {
            continue;
        }
        pairs.push((defender, receiver));
    }
    pairs
}

/// Depth a man defender lines up at over his receiver.
#[must_use]
pub const fn man_depth(position_type: PositionType, leverage: Leverage) -> f32 {
    match (leverage, position_type) {
        (Leverage::Press, PositionType::Cornerback | PositionType::Nickel) => 1.5,
        (_, PositionType::Cornerback) => 2.0,
        (_, PositionType::Nickel) => 4.0,
        (_, PositionType::Safety) => 6.0,
        _ => 5.0,
    }
}

/// Put `defender` in man on `receiver` and align him over the receiver.
pub fn assign_man(
    ctx: &AlignmentContext<'_>,
    defender: &mut Player,
    receiver: PlayerId,
    leverage: Leverage,
) {
    let Some(target) = ctx.offensive_player(receiver) else {
        return;
    };
    let inward = if target.position.x < ctx.ball_x { 1.0 } else { -1.0 };
    let shade = match leverage {
        Leverage::Inside => inward,
        Leverage::Outside => -inward,
        Leverage::Press => 0.0,
    };
    defender.position = ctx.spot(
        target.position.x + shade,
        man_depth(defender.position_type, leverage),
    );
    defender.responsibility = Some(CoverageResponsibility::man(defender.id, receiver, leverage));
}

/// Put `defender` in `kind` and align him at lateral `x`, `depth` past the line.
pub fn assign_zone(
    ctx: &AlignmentContext<'_>,
    defender: &mut Player,
    kind: ZoneKind,
    x: f32,
    depth: f32,
) {
    defender.position = ctx.spot(x, depth);
    defender.responsibility = Some(CoverageResponsibility::zone(defender.id, ctx.zone(kind)));
}

/// Underneath alignment depth by position type.
#[must_use]
pub const fn underneath_depth(position_type: PositionType) -> f32 {
    match position_type {
        PositionType::Nickel => 5.5,
        PositionType::Safety => 7.0,
        _ => 5.0,
    }
}

/// Spread the underneath defenders in `ids` across `kinds`, left to right.
///
/// `kinds` is indexed by how many defenders there are: `kinds[n - 1]`
/// lists the zones for `n` defenders. Anyone beyond the longest list is
/// left unassigned.
pub fn assign_underneath(
    ctx: &AlignmentContext<'_>,
    defenders: &mut [Player],
    ids: &[PlayerId],
    kinds: &[&[ZoneKind]],
) {
    if ids.is_empty() || kinds.is_empty() {
        return;
    }
    let mut ordered: Vec<(PlayerId, f32)> = defenders
        .iter()
        .filter(|d| ids.contains(&d.id))
        .map(|d| (d.id, d.position.x))
        .collect();
    ordered.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    let layout = kinds[ordered.len().min(kinds.len()) - 1];
    for ((id, _), kind) in ordered.iter().zip(layout) {
        if let Some(defender) = defenders.iter_mut().find(|d| d.id == *id) {
            let x = ctx.zone(*kind).center.x;
            let depth = underneath_depth(defender.position_type);
            assign_zone(ctx, defender, *kind, x, depth);
        }
    }
}

/// Ids in `available` whose defender matches `pred`, in roster order.
#[must_use]
pub fn pick(
    defenders: &[Player],
    available: &[PlayerId],
    pred: impl Fn(&Player) -> bool,
) -> Vec<PlayerId> {
    defenders
        .iter()
        .filter(|d| available.contains(&d.id) && pred(d))
        .map(|d| d.id)
        .collect()
}

/// Remove `id` from `available`.
pub fn take(available: &mut Vec<PlayerId>, id: PlayerId) {
    available.retain(|&a| a != id);
}

/// Mutable defender by id.
pub fn defender_mut(defenders: &mut [Player], id: PlayerId) -> Option<&mut Player> {
    defenders.iter_mut().find(|d| d.id == id)
}

/// Corner ids as (left, right).
#[must_use]
pub fn corners(defenders: &[Player], available: &[PlayerId]) -> (Option<PlayerId>, Option<PlayerId>) {
    let find = |label: &str| {
        defenders
            .iter()
            .find(|d| d.label == label && available.contains(&d.id))
            .map(|d| d.id)
    };
    (find("LCB"), find("RCB"))
}

/// Available safeties as (strength side, weak side).
///
/// The strong safety takes the strength side when both are available.
#[must_use]
pub fn safeties(defenders: &[Player], available: &[PlayerId]) -> (Option<PlayerId>, Option<PlayerId>) {
    let mut ids = pick(defenders, available, |d| d.position_type == PositionType::Safety);
    ids.sort_by_key(|&id| {
        defenders
            .iter()
            .find(|d| d.id == id)
            .map_or(2, |d| u8::from(d.label != "SS"))
    });
    (ids.first().copied(), ids.get(1).copied())
}

/// Turn every id in `ids` into a rusher, lanes taken from their spots.
pub fn assign_blitzers(ctx: &AlignmentContext<'_>, defenders: &mut [Player], ids: &[PlayerId]) {
    for (priority, &id) in ids.iter().enumerate() {
        let Some(defender) = defender_mut(defenders, id) else {
            continue;
        };
        let lane = RushLane::nearest(defender.position.x, ctx.ball_x);
        defender.position = ctx.spot(
            ctx.ball_x + lane.offset(),
            blitz_depth(defender.position_type),
        );
        defender.responsibility = Some(CoverageResponsibility::blitz(
            id,
            lane,
            u8::try_from(priority).unwrap_or(u8::MAX),
        ));
    }
}

// ============================================================================
// Building the defense
// ============================================================================

/// Seven defenders for `package` at their nominal spots.
#[must_use]
pub fn roster(ctx: &AlignmentContext<'_>) -> Vec<Player> {
    ctx.package
        .roster()
        .iter()
        .zip(FIRST_DEFENDER_ID..)
        .map(|(&(label, position_type), id)| {
            Player::new(id, label, position_type, ctx.default_spot(label, position_type))
        })
        .collect()
}

fn apply_reserved(ctx: &AlignmentContext<'_>, defenders: &mut [Player], coverage: &CoverageData) {
    let blitzers: Vec<PlayerId> = coverage
        .blitzers
        .iter()
        .filter_map(|label| defenders.iter().find(|d| &d.label == label).map(|d| d.id))
        .collect();
    assign_blitzers(ctx, defenders, &blitzers);

    if let (Some(label), Some(qb)) = (&coverage.spy, ctx.quarterback_id()) {
        if let Some(spy) = defenders.iter_mut().find(|d| &d.label == label) {
            spy.position = ctx.spot(ctx.ball_x, SPY_DEPTH);
            spy.responsibility = Some(CoverageResponsibility::spy(spy.id, qb));
        }
    }

    if let Some(label) = &coverage.robber {
        if let Some(robber) = defenders.iter_mut().find(|d| &d.label == label) {
            robber.position = ctx.spot(ctx.ball_x, ROBBER_DEPTH);
            robber.responsibility = Some(CoverageResponsibility::zone_with_read(
                robber.id,
                ctx.zone(ZoneKind::Robber),
                ZoneRead::Robber,
            ));
        }
    }
}

/// Widest unreserved defender of `position_type` to `side`.
fn outermost(
    ctx: &AlignmentContext<'_>,
    defenders: &[Player],
    reserved: &[PlayerId],
    position_type: PositionType,
    side: Side,
) -> Option<usize> {
    defenders
        .iter()
        .enumerate()
        .filter(|(_, d)| {
            d.position_type == position_type
                && !reserved.contains(&d.id)
                && !d.is_blitzing()
                && Side::of(d.position.x, ctx.ball_x) == side
        })
        .max_by(|(_, a), (_, b)| {
            (a.position.x - ctx.ball_x)
                .abs()
                .total_cmp(&(b.position.x - ctx.ball_x).abs())
        })
        .map(|(i, _)| i)
}

/// Trade the corner's and safety's assignments on each inverted side.
/// Both keep their alignment until the reveal.
fn apply_invert(
    ctx: &AlignmentContext<'_>,
    defenders: &mut [Player],
    reserved: &[PlayerId],
    invert: InvertData,
) {
    let sides = match invert.side {
        Some(side) => vec![side],
        None => vec![Side::Left, Side::Right],
    };
    for side in sides {
        let corner = outermost(ctx, defenders, reserved, PositionType::Cornerback, side);
        let safety = outermost(ctx, defenders, reserved, PositionType::Safety, side);
        let (Some(corner), Some(safety)) = (corner, safety) else {
            debug!(?side, "No corner and safety to invert");
            continue;
        };
        let (Some(corner_job), Some(safety_job)) = (
            defenders[corner].responsibility,
            defenders[safety].responsibility,
        ) else {
            continue;
        };
        for (i, kind) in [(corner, safety_job.kind), (safety, corner_job.kind)] {
            let defender = &mut defenders[i];
            let spot = defender.position;
            if let Some(resp) = defender.responsibility.as_mut() {
                resp.kind = kind;
                resp.disguise = Some(Disguise {
                    shell: resp.disguise.map_or(spot, |d| d.shell),
                    reveal_at: invert.reveal_at,
                    revealed: false,
                });
            }
        }
        debug!(
            ?side,
            corner = defenders[corner].id,
            safety = defenders[safety].id,
            "Corner and safety inverted"
        );
    }
}

/// Align the full defense for `coverage` against the offense in `ctx`.
#[must_use]
pub fn build_defense(ctx: &AlignmentContext<'_>, coverage: &CoverageData) -> Vec<Player> {
    let mut defenders = roster(ctx);
    let reserved: Vec<PlayerId> = defenders
        .iter()
        .filter(|d| coverage.is_reserved(&d.label))
        .map(|d| d.id)
        .collect();

    scheme_for(coverage.family).align(ctx, &mut defenders, &reserved);
    apply_reserved(ctx, &mut defenders, coverage);

    for static_position in &coverage.positions {
        if let Some(defender) = defenders.iter_mut().find(|d| d.label == static_position.label) {
            defender.position = ctx.spot(ctx.ball_x + static_position.x, static_position.depth);
        }
    }

    if let Some(disguise) = &coverage.disguise {
        let mut shell = roster(ctx);
        scheme_for(disguise.shell).align(ctx, &mut shell, &[]);
        for defender in &mut defenders {
            let Some(shown) = shell.iter().find(|s| s.id == defender.id) else {
                continue;
            };
            if let Some(resp) = defender.responsibility.as_mut() {
                resp.disguise = Some(Disguise {
                    shell: shown.position,
                    reveal_at: disguise.reveal_at,
                    revealed: false,
                });
                defender.position = shown.position;
            }
        }
    }
    if let Some(invert) = coverage.invert {
        apply_invert(ctx, &mut defenders, &reserved, invert);
    }

    for defender in &mut defenders {
        defender.alignment = defender.position;
    }
    debug!(
        coverage = %coverage.name,
        family = ?coverage.family,
        package = ?ctx.package,
        reserved = reserved.len(),
        "Defense aligned"
    );
    defenders
}

/// Re-read the offense and rebuild the defense in `state`.
///
/// Without a coverage call the defense is cleared.
pub fn align_defense(state: &mut GameState) {
    let ball_x = state.ball_x();
    let los_y = state.los_y();
    let offense: Vec<Player> = state.offense().cloned().collect();
    state.analysis = analyze(&offense, ball_x, los_y, state.drive.hash);
    state.package = DefensivePackage::for_receivers(state.analysis.wide_receivers);

    let defense = match &state.coverage {
        Some(coverage) => {
            let ctx = AlignmentContext {
                offense: &offense,
                analysis: &state.analysis,
                ball_x,
                los_y,
                hash: state.drive.hash,
                package: state.package,
            };
            build_defense(&ctx, coverage)
        }
        None => Vec::new(),
    };
    state.players = offense;
    state.players.extend(defense);
    state.sort_players();
}
