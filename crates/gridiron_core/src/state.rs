//! The play aggregate.
//!
//! [`GameState`] owns everything about the current play. The engine holds
//! the only instance and hands out clones; subsystems receive it
//! explicitly as `&mut GameState`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::components::{Ball, Phase, Player, PlayerId};
use crate::data::{CoverageData, PlayConcept};
use crate::drive::DriveState;
use crate::field::{yard_line_to_y, CENTER_X};
use crate::formation::FormationAnalysis;
use crate::math::{quantize, Vec2};
use crate::motion::MotionRecord;
use crate::outcome::PlayOutcome;
use crate::pattern_match::PatternMatch;
use crate::personnel::{DefensivePackage, OffensivePersonnel};
use crate::pressure::PressureTier;

/// Complete state of one play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Ticks run since the snap.
    pub tick: u64,
    /// Seconds since the snap.
    pub elapsed: f32,
    /// Current sack clock.
    pub sack_time: f32,
    /// Current pressure tier.
    pub pressure: PressureTier,
    /// Every player, sorted by id.
    pub players: Vec<Player>,
    /// The ball.
    pub ball: Ball,
    /// Active route concept.
    pub concept: Option<PlayConcept>,
    /// Active coverage call.
    pub coverage: Option<CoverageData>,
    /// Offensive personnel override.
    pub personnel: Option<OffensivePersonnel>,
    /// Read of the offensive alignment.
    pub analysis: FormationAnalysis,
    /// Defensive package on the field.
    pub package: DefensivePackage,
    /// Down and distance.
    pub drive: DriveState,
    /// Pre-snap motion used this play.
    pub motion: Option<MotionRecord>,
    /// Outcome once decided.
    pub outcome: Option<PlayOutcome>,
    /// Coverage adjustments fired this play.
    pub pattern_matches: Vec<PatternMatch>,
    /// Audibles, hot routes and sight adjustments used this play.
    pub audibles_used: u8,
}

impl GameState {
    /// Empty pre-snap state at the start of a drive.
    #[must_use]
    pub fn new(base_sack_time: f32) -> Self {
        Self {
            phase: Phase::PreSnap,
            tick: 0,
            elapsed: 0.0,
            sack_time: base_sack_time,
            pressure: PressureTier::Clean,
            players: Vec::new(),
            ball: Ball::default(),
            concept: None,
            coverage: None,
            personnel: None,
            analysis: FormationAnalysis::default(),
            package: DefensivePackage::Base,
            drive: DriveState::default(),
            motion: None,
            outcome: None,
            pattern_matches: Vec::new(),
            audibles_used: 0,
        }
    }

    /// Field y of the line of scrimmage.
    #[must_use]
    pub fn los_y(&self) -> f32 {
        yard_line_to_y(f32::from(self.drive.line_of_scrimmage))
    }

    /// Lateral spot of the ball.
    #[must_use]
    pub fn ball_x(&self) -> f32 {
        self.drive.hash.ball_x()
    }

    /// Spot of the snap.
    #[must_use]
    pub fn ball_spot(&self) -> Vec2 {
        Vec2::new(self.ball_x(), self.los_y())
    }

    /// Player by id.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.players[i])
    }

    /// Mutable player by id.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &mut self.players[i])
    }

    /// Offensive players in id order.
    pub fn offense(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_offense())
    }

    /// Defenders in id order.
    pub fn defense(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_defense())
    }

    /// The quarterback.
    #[must_use]
    pub fn quarterback(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_quarterback())
    }

    /// A live eligible receiver by id.
    #[must_use]
    pub fn eligible_receiver(&self, id: PlayerId) -> Option<&Player> {
        self.player(id).filter(|p| p.is_eligible_receiver())
    }

    /// Ids of live eligible receivers.
    #[must_use]
    pub fn eligible_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.is_eligible_receiver())
            .map(|p| p.id)
            .collect()
    }

    /// Rushers not yet picked up.
    pub fn unblocked_blitzers(&self) -> impl Iterator<Item = &Player> {
        self.defense().filter(|p| p.is_blitzing() && !p.is_blocked)
    }

    /// Number of defenders on the field.
    #[must_use]
    pub fn defender_count(&self) -> usize {
        self.defense().count()
    }

    /// Number of players with active motion.
    #[must_use]
    pub fn players_in_motion(&self) -> usize {
        self.players.iter().filter(|p| p.has_motion).count()
    }

    /// Keep players in id order after wholesale replacement.
    pub fn sort_players(&mut self) {
        self.players.sort_by_key(|p| p.id);
    }

    /// Calculate a deterministic hash of the play.
    ///
    /// Floats are quantized onto the fixed-point grid before hashing.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.phase.hash(&mut hasher);
        self.tick.hash(&mut hasher);
        quantize(self.elapsed).hash(&mut hasher);
        quantize(self.sack_time).hash(&mut hasher);
        self.drive.hash(&mut hasher);
        self.audibles_used.hash(&mut hasher);

        self.players.len().hash(&mut hasher);
        for player in &self.players {
            player.id.hash(&mut hasher);
            quantize(player.position.x).hash(&mut hasher);
            quantize(player.position.y).hash(&mut hasher);
            quantize(player.velocity.x).hash(&mut hasher);
            quantize(player.velocity.y).hash(&mut hasher);
            quantize(player.top_speed).hash(&mut hasher);
            player.eligible.hash(&mut hasher);
            player.is_blocked.hash(&mut hasher);
            player.has_motion.hash(&mut hasher);
            if let Some(resp) = &player.responsibility {
                std::mem::discriminant(&resp.kind).hash(&mut hasher);
                resp.man_target().hash(&mut hasher);
            }
        }

        self.ball.state.hash(&mut hasher);
        self.ball.target.hash(&mut hasher);
        quantize(self.ball.position.x).hash(&mut hasher);
        quantize(self.ball.position.y).hash(&mut hasher);

        if let Some(outcome) = &self.outcome {
            outcome.kind.hash(&mut hasher);
            quantize(outcome.yards).hash(&mut hasher);
        }

        self.pattern_matches.len().hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for GameState {
    fn default() -> Self {
        let mut state = Self::new(4.0);
        state.ball.position = Vec2::new(CENTER_X, state.los_y());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::PositionType;

    fn state_with_players() -> GameState {
        let mut state = GameState::default();
        state.players = vec![
            Player::new(1, "QB", PositionType::Quarterback, Vec2::new(26.0, 30.0)),
            Player::new(2, "X", PositionType::WideReceiver, Vec2::new(6.0, 34.5)),
            Player::new(101, "LCB", PositionType::Cornerback, Vec2::new(6.0, 40.0)),
        ];
        state
    }

    #[test]
    fn test_lookup_by_id() {
        let state = state_with_players();
        assert_eq!(state.player(2).map(|p| p.label.as_str()), Some("X"));
        assert!(state.player(3).is_none());
        assert!(state.eligible_receiver(1).is_none());
        assert!(state.eligible_receiver(2).is_some());
        assert_eq!(state.defender_count(), 1);
    }

    #[test]
    fn test_los_y_follows_drive() {
        let mut state = GameState::default();
        state.drive.line_of_scrimmage = 30;
        assert!((state.los_y() - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_state_hash_changes_with_position() {
        let state = state_with_players();
        let mut moved = state.clone();
        assert_eq!(state.state_hash(), moved.state_hash());
        moved.players[1].position.y += 0.5;
        assert_ne!(state.state_hash(), moved.state_hash());
    }
}
