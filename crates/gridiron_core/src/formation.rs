//! Offensive formation recognition.
//!
//! Classifies the offense's alignment the way a defense reads it before
//! the snap: receiver distribution by side, trips, bunch, stack and spread
//! looks, the personnel grouping on the field, and the strength call.

use serde::{Deserialize, Serialize};

use crate::components::{Player, PlayerId, PositionType};
use crate::field::{HashMark, Side};

/// Depth behind the LOS at which a player counts as backfield.
pub const BACKFIELD_DEPTH: f32 = 2.5;

/// Lateral window around the ball for backfield players.
pub const BACKFIELD_WIDTH: f32 = 4.0;

/// A tight end inside this distance of the ball is attached.
pub const INLINE_TE_WIDTH: f32 = 5.0;

/// Largest lateral spread of a bunch.
pub const BUNCH_SPREAD: f32 = 4.0;

/// Lateral tolerance for a stack.
pub const STACK_WIDTH: f32 = 1.2;

/// Depth separation that makes two receivers a stack.
pub const STACK_DEPTH: f32 = 1.0;

/// Split beyond which a receiver counts toward a spread look.
pub const SPREAD_SPLIT: f32 = 8.0;

/// Derived facts about an offensive alignment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormationAnalysis {
    /// Detached receivers left of the ball, outside-in (#1 first).
    pub left: Vec<PlayerId>,
    /// Detached receivers right of the ball, outside-in.
    pub right: Vec<PlayerId>,
    /// Backfield players.
    pub backfield: Vec<PlayerId>,
    /// Side with three or more detached receivers.
    pub trips: Option<Side>,
    /// Trips set compressed into a bunch.
    pub bunch: bool,
    /// Two receivers stacked on the same side.
    pub stack: bool,
    /// Four or more wide splits.
    pub spread: bool,
    /// Side of the attached tight end, if any.
    pub inline_te: Option<Side>,
    /// Formation strength.
    pub strength: Option<Side>,
    /// Personnel code, `"{rb}{te}"`.
    pub personnel: String,
    /// Wide receivers on the field.
    pub wide_receivers: usize,
    /// Running backs on the field.
    pub running_backs: usize,
    /// Tight ends on the field.
    pub tight_ends: usize,
}

impl FormationAnalysis {
    /// Receivers on `side`, outside-in.
    #[must_use]
    pub fn side(&self, side: Side) -> &[PlayerId] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Receiver number (1-based, outside-in) of `id` on its side.
    #[must_use]
    pub fn number_of(&self, id: PlayerId) -> Option<(Side, usize)> {
        for side in [Side::Left, Side::Right] {
            if let Some(i) = self.side(side).iter().position(|&r| r == id) {
                return Some((side, i + 1));
            }
        }
        None
    }

    /// Strength side, defaulting to the right.
    #[must_use]
    pub fn strength_or_right(&self) -> Side {
        self.strength.unwrap_or(Side::Right)
    }
}

/// Analyze the offensive players in `players`.
#[must_use]
pub fn analyze(players: &[Player], ball_x: f32, los_y: f32, hash: HashMark) -> FormationAnalysis {
    let skill: Vec<&Player> = players.iter().filter(|p| p.is_skill_player()).collect();
    let mut analysis = FormationAnalysis::default();

    let mut left: Vec<&Player> = Vec::new();
    let mut right: Vec<&Player> = Vec::new();
    for player in &skill {
        let depth = los_y - player.position.y;
        let dx = player.position.x - ball_x;
        if depth >= BACKFIELD_DEPTH && dx.abs() <= BACKFIELD_WIDTH {
            analysis.backfield.push(player.id);
        } else if dx < 0.0 {
            left.push(player);
        } else {
            right.push(player);
        }
    }
    left.sort_by(|a, b| a.position.x.total_cmp(&b.position.x).then(a.id.cmp(&b.id)));
    right.sort_by(|a, b| b.position.x.total_cmp(&a.position.x).then(a.id.cmp(&b.id)));

    for (side, group) in [(Side::Left, &left), (Side::Right, &right)] {
        if group.len() >= 3 {
            analysis.trips = Some(side);
            analysis.bunch = lateral_spread(group) <= BUNCH_SPREAD;
        }
        if has_stack(group) {
            analysis.stack = true;
        }
    }
    analysis.spread = skill
        .iter()
        .filter(|p| (p.position.x - ball_x).abs() > SPREAD_SPLIT)
        .count()
        >= 4;

    let inline_left = count_inline(&left, ball_x);
    let inline_right = count_inline(&right, ball_x);
    analysis.inline_te = match inline_left.cmp(&inline_right) {
        std::cmp::Ordering::Greater => Some(Side::Left),
        std::cmp::Ordering::Less => Some(Side::Right),
        std::cmp::Ordering::Equal => None,
    };

    analysis.strength = Some(
        analysis
            .inline_te
            .or(analysis.trips)
            .or_else(|| match left.len().cmp(&right.len()) {
                std::cmp::Ordering::Greater => Some(Side::Left),
                std::cmp::Ordering::Less => Some(Side::Right),
                std::cmp::Ordering::Equal => None,
            })
            .unwrap_or_else(|| hash.field_side()),
    );

    analysis.running_backs = count_type(&skill, PositionType::RunningBack);
    analysis.tight_ends = count_type(&skill, PositionType::TightEnd);
    analysis.wide_receivers = count_type(&skill, PositionType::WideReceiver);
    analysis.personnel = format!("{}{}", analysis.running_backs, analysis.tight_ends);
    analysis.left = left.iter().map(|p| p.id).collect();
    analysis.right = right.iter().map(|p| p.id).collect();
    analysis
}

fn lateral_spread(group: &[&Player]) -> f32 {
    let min = group.iter().map(|p| p.position.x).fold(f32::MAX, f32::min);
    let max = group.iter().map(|p| p.position.x).fold(f32::MIN, f32::max);
    max - min
}

fn has_stack(group: &[&Player]) -> bool {
    group.iter().enumerate().any(|(i, a)| {
        group[i + 1..].iter().any(|b| {
            (a.position.x - b.position.x).abs() <= STACK_WIDTH
                && (a.position.y - b.position.y).abs() >= STACK_DEPTH
        })
    })
}

fn count_inline(group: &[&Player], ball_x: f32) -> usize {
    group
        .iter()
        .filter(|p| {
            p.position_type == PositionType::TightEnd
                && (p.position.x - ball_x).abs() <= INLINE_TE_WIDTH
        })
        .count()
}

fn count_type(players: &[&Player], position: PositionType) -> usize {
    players.iter().filter(|p| p.position_type == position).count()
}
