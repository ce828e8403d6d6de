//! The play controller.
//!
//! [`PlayEngine`] owns the single [`GameState`] for a play and is the only
//! writer. Setup calls rebuild the player collection; [`PlayEngine::tick`]
//! runs every subsystem in a fixed order:
//!
//! 1. Coverage scheme per-tick adjustments
//! 2. Movement (routes, blocking, coverage pursuit)
//! 3. Pattern matching, then disguise and zone-read behaviors
//! 4. Pressure and the sack clock
//! 5. Ball flight
//! 6. Outcome resolution
//!
//! Rule violations return `false` and leave the state untouched. Callers
//! read the play through [`PlayEngine::game_state`], which is a copy.

use tracing::{debug, trace};

use crate::alignment::align_defense;
use crate::ball::{self, Flight};
use crate::behaviors;
use crate::components::{
    Ball, BallState, Phase, Player, PlayerId, PositionType, FIRST_OFFENSE_ID, MAX_ELIGIBLES,
};
use crate::config::EngineConfig;
use crate::data::{CoverageData, PlayConcept};
use crate::drive::DriveResult;
use crate::error::{PlayError, Result};
use crate::field::{clamp_to_field, HashMark};
use crate::math::Vec2;
use crate::motion::{self, MotionRecord, MotionType};
use crate::movement;
use crate::outcome::{self, PlayOutcome};
use crate::pattern_match;
use crate::personnel::OffensivePersonnel;
use crate::pressure;
use crate::replay::PlayCommand;
use crate::rng::{RandomSource, SeededRandom};
use crate::routes::{Route, RouteType};
use crate::schemes::{scheme_for, CoverageScheme};
use crate::state::GameState;

/// Cushion at or under which a receiver reads press.
pub const PRESS_CUSHION: f32 = 2.0;

/// Cushion at or beyond which a receiver reads a soft look.
pub const SOFT_CUSHION: f32 = 6.0;

/// Build the offense for `concept` with the ball at (`ball_x`, `los_y`).
///
/// Players get ids in slot order. Slots without a route, or with a
/// `Block` route, are assigned to protection.
#[must_use]
pub fn build_offense(
    concept: &PlayConcept,
    personnel: Option<&OffensivePersonnel>,
    ball_x: f32,
    los_y: f32,
) -> Vec<Player> {
    let mut slots = concept.formation.slots.clone();
    if let Some(personnel) = personnel {
        personnel.apply(&mut slots);
    }
    slots
        .iter()
        .zip(FIRST_OFFENSE_ID..)
        .map(|(slot, id)| {
            let spot = clamp_to_field(Vec2::new(ball_x + slot.x, los_y - slot.depth));
            let mut player = Player::new(id, slot.label.clone(), slot.position, spot);
            if slot.position == PositionType::Quarterback {
                return player;
            }
            match concept.route_for(&slot.label) {
                Some(assignment) if assignment.route != RouteType::Block => {
                    player.route = Some(Route::generate(
                        assignment.route,
                        spot,
                        ball_x,
                        los_y,
                        player.top_speed,
                        assignment.depth,
                    ));
                }
                _ => player.set_blocking(true),
            }
            player
        })
        .collect()
}

/// Pick a route from the defender's cushion on a receiver.
#[must_use]
pub fn sight_adjustment_route(cushion: f32) -> RouteType {
    if cushion <= PRESS_CUSHION {
        RouteType::Go
    } else if cushion >= SOFT_CUSHION {
        RouteType::Hitch
    } else {
        RouteType::Slant
    }
}

/// Play controller.
#[derive(Debug, Clone)]
pub struct PlayEngine<R: RandomSource = SeededRandom> {
    state: GameState,
    config: EngineConfig,
    rng: R,
    /// Pre-snap state saved at the last snap.
    snap_snapshot: Option<Box<GameState>>,
}

impl PlayEngine<SeededRandom> {
    /// Engine with default tuning and a seeded generator.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(EngineConfig::default(), SeededRandom::new(seed))
    }
}

impl Default for PlayEngine<SeededRandom> {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl<R: RandomSource> PlayEngine<R> {
    /// Create an engine at the start of a drive.
    #[must_use]
    pub fn new(config: EngineConfig, rng: R) -> Self {
        let mut state = GameState::new(config.base_sack_time);
        state.ball = Ball::held_at(state.ball_spot());
        Self {
            state,
            config,
            rng,
            snap_snapshot: None,
        }
    }

    /// Snapshot of the current play.
    #[must_use]
    pub fn game_state(&self) -> GameState {
        self.state.clone()
    }

    /// Borrow the current play without cloning it.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Outcome of the play, once decided.
    #[must_use]
    pub fn outcome(&self) -> Option<&PlayOutcome> {
        self.state.outcome.as_ref()
    }

    /// Tuning in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The random source.
    #[must_use]
    pub const fn rng(&self) -> &R {
        &self.rng
    }

    /// Deterministic hash of the current play.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.state.state_hash()
    }

    fn scheme(&self) -> Option<&'static dyn CoverageScheme> {
        self.state.coverage.as_ref().map(|c| scheme_for(c.family))
    }

    fn reject(&self, operation: &'static str, reason: &'static str) -> bool {
        debug!(operation, reason, phase = ?self.state.phase, "Operation rejected");
        false
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Rebuild players and ball from the current templates and drive.
    fn setup(&mut self) {
        let ball_x = self.state.ball_x();
        let los_y = self.state.los_y();
        self.state.players = match &self.state.concept {
            Some(concept) => build_offense(concept, self.state.personnel.as_ref(), ball_x, los_y),
            None => Vec::new(),
        };
        self.state.motion = None;
        self.state.audibles_used = 0;
        align_defense(&mut self.state);
        self.state.ball = Ball::held_at(self.state.ball_spot());
    }

    /// Set the route concept and rebuild the offense.
    ///
    /// Pre-snap only.
    pub fn set_play_concept(&mut self, concept: PlayConcept) -> bool {
        if self.state.phase != Phase::PreSnap {
            return self.reject("set_play_concept", "not pre-snap");
        }
        let eligible = concept.formation.eligible_count();
        if self
            .state
            .personnel
            .is_some_and(|p| usize::from(p.running_backs + p.tight_ends) > eligible)
        {
            self.state.personnel = None;
        }
        debug!(concept = %concept.name, formation = %concept.formation.name, "Concept set");
        self.state.concept = Some(concept);
        self.setup();
        true
    }

    /// Set the coverage call and re-align the defense.
    ///
    /// Pre-snap only.
    pub fn set_coverage(&mut self, coverage: CoverageData) -> bool {
        if self.state.phase != Phase::PreSnap {
            return self.reject("set_coverage", "not pre-snap");
        }
        debug!(coverage = %coverage.name, family = ?coverage.family, "Coverage set");
        self.state.coverage = Some(coverage);
        self.setup();
        true
    }

    /// Move the line of scrimmage to `yard`.
    ///
    /// Yards under 2 are a safety (ball at the 30, first and ten); yards
    /// past 99 clamp. Pre-snap only.
    pub fn set_line_of_scrimmage(&mut self, yard: i32) -> bool {
        if self.state.phase != Phase::PreSnap {
            return self.reject("set_line_of_scrimmage", "not pre-snap");
        }
        let safety = self.state.drive.set_line_of_scrimmage(yard);
        debug!(
            requested = yard,
            line_of_scrimmage = self.state.drive.line_of_scrimmage,
            safety,
            "Line of scrimmage set"
        );
        self.setup();
        true
    }

    /// Spot the ball on `hash`. Pre-snap only.
    pub fn set_hash_position(&mut self, hash: HashMark) -> bool {
        if self.state.phase != Phase::PreSnap {
            return self.reject("set_hash_position", "not pre-snap");
        }
        self.state.drive.hash = hash;
        self.setup();
        true
    }

    /// Switch offensive personnel ("11", "12", "21"...).
    ///
    /// Pre-snap only. Codes that are not two digits or that ask for more
    /// backs and tight ends than the formation has slots are rejected.
    pub fn set_personnel(&mut self, code: &str) -> bool {
        if self.state.phase != Phase::PreSnap {
            return self.reject("set_personnel", "not pre-snap");
        }
        let slots = self
            .state
            .concept
            .as_ref()
            .map_or(MAX_ELIGIBLES, |c| c.formation.eligible_count());
        let Some(personnel) = OffensivePersonnel::parse(code, slots) else {
            return self.reject("set_personnel", "invalid personnel code");
        };
        debug!(personnel = %personnel.code(), "Personnel set");
        self.state.personnel = Some(personnel);
        self.setup();
        true
    }

    // ========================================================================
    // Pre-snap adjustments
    // ========================================================================

    fn audible_allowed(&self, id: PlayerId, operation: &'static str) -> bool {
        if self.state.phase != Phase::PreSnap {
            return self.reject(operation, "not pre-snap");
        }
        if self.state.audibles_used >= self.config.max_audibles {
            return self.reject(operation, "audible limit reached");
        }
        if !self.state.player(id).is_some_and(Player::is_skill_player) {
            return self.reject(operation, "not an offensive skill player");
        }
        true
    }

    fn change_route(&mut self, id: PlayerId, route_type: RouteType) {
        let ball_x = self.state.ball_x();
        let los_y = self.state.los_y();
        let Some(player) = self.state.player_mut(id) else {
            return;
        };
        let was_blocking = player.is_blocking;
        if route_type == RouteType::Block {
            player.route = None;
            player.set_blocking(true);
        } else {
            player.set_blocking(false);
            player.route = Some(Route::generate(
                route_type,
                player.position,
                ball_x,
                los_y,
                player.top_speed,
                None,
            ));
        }
        let protection_changed = was_blocking != player.is_blocking;
        self.state.audibles_used += 1;
        debug!(
            player = id,
            route = ?route_type,
            audibles_used = self.state.audibles_used,
            "Route changed"
        );
        if protection_changed {
            align_defense(&mut self.state);
        }
    }

    /// Change a player's route. Pre-snap only, counted against the audible limit.
    pub fn audible_route(&mut self, id: PlayerId, route_type: RouteType) -> bool {
        if !self.audible_allowed(id, "audible_route") {
            return false;
        }
        self.change_route(id, route_type);
        true
    }

    /// Convert a route to a quick-game route against pressure.
    pub fn apply_hot_route(&mut self, id: PlayerId, route_type: RouteType) -> bool {
        if !route_type.is_quick() {
            return self.reject("apply_hot_route", "route is not a quick route");
        }
        self.audible_route(id, route_type)
    }

    /// Adjust a receiver's route to the cushion the nearest defender gives him.
    pub fn apply_sight_adjustment(&mut self, id: PlayerId) -> bool {
        if !self.audible_allowed(id, "apply_sight_adjustment") {
            return false;
        }
        let Some(receiver) = self.state.player(id).map(|p| p.position) else {
            return false;
        };
        let Some(cushion) = self
            .state
            .defense()
            .map(|d| d.position.distance(receiver))
            .min_by(f32::total_cmp)
        else {
            return self.reject("apply_sight_adjustment", "no defenders");
        };
        self.change_route(id, sight_adjustment_route(cushion));
        true
    }

    /// Put an eligible player in pre-snap motion. One motion per play.
    pub fn send_in_motion(&mut self, id: PlayerId, motion_type: MotionType) -> bool {
        if self.state.phase != Phase::PreSnap {
            return self.reject("send_in_motion", "not pre-snap");
        }
        if self.state.motion.is_some() {
            return self.reject("send_in_motion", "motion already used");
        }
        let ball_x = self.state.ball_x();
        let los_y = self.state.los_y();
        let Some(player) = self
            .state
            .player_mut(id)
            .filter(|p| p.is_eligible_receiver())
        else {
            return self.reject("send_in_motion", "not an eligible receiver");
        };
        player.has_motion = true;
        let record = MotionRecord::new(id, motion_type, player.position, ball_x, los_y);
        debug!(player = id, motion = ?motion_type, end = ?record.end(), "Motion started");
        self.state.motion = Some(record);
        true
    }

    /// Walk active motion one step.
    ///
    /// Returns `false` when no motion is running. Completion re-anchors
    /// the route and lets the coverage answer the motion.
    pub fn advance_motion(&mut self, dt: f32) -> bool {
        if self.state.phase != Phase::PreSnap {
            return false;
        }
        if !self.state.motion.as_ref().is_some_and(|m| !m.complete) {
            return false;
        }
        let dt = self.config.sanitize_step(dt);
        if motion::advance(&mut self.state, dt, &self.config) {
            self.complete_motion();
        }
        true
    }

    fn complete_motion(&mut self) {
        let Some((mover, from)) = motion::finish(&mut self.state, &self.config) else {
            return;
        };
        debug!(player = mover, "Motion complete");
        if let Some(scheme) = self.scheme() {
            scheme.respond_to_motion(&mut self.state, mover, from);
        }
    }

    // ========================================================================
    // Snap, throw and tick
    // ========================================================================

    /// Snap the ball.
    ///
    /// Requires pre-snap with a concept and a coverage set. Motion still
    /// running is completed first.
    pub fn snap(&mut self) -> bool {
        if self.state.phase != Phase::PreSnap {
            return self.reject("snap", "not pre-snap");
        }
        if self.state.concept.is_none() || self.state.coverage.is_none() {
            return self.reject("snap", "concept and coverage required");
        }
        self.snap_snapshot = Some(Box::new(self.state.clone()));

        self.complete_motion();
        let jitter = self.config.speed_jitter;
        for player in &mut self.state.players {
            if let Some(boost) = player.motion_boost.as_mut() {
                boost.active = true;
            }
            player.top_speed *= 1.0 + self.rng.range(-jitter, jitter);
            player.reset_transient();
        }
        self.state.sack_time = self.config.base_sack_time;
        self.state.pressure = pressure::tier(0.0, self.state.sack_time);
        self.state.phase = Phase::PostSnap;
        debug!(
            line_of_scrimmage = self.state.drive.line_of_scrimmage,
            down = self.state.drive.down,
            yards_to_go = self.state.drive.yards_to_go,
            sack_time = self.state.sack_time,
            "Snap"
        );
        true
    }

    /// Throw to `receiver`.
    ///
    /// Requires post-snap, the ball held and a live eligible receiver.
    pub fn throw_to(&mut self, receiver: PlayerId) -> bool {
        if self.state.phase != Phase::PostSnap {
            return self.reject("throw_to", "not post-snap");
        }
        if self.state.ball.state != BallState::Held {
            return self.reject("throw_to", "ball not held");
        }
        if self.state.eligible_receiver(receiver).is_none() {
            return self.reject("throw_to", "not an eligible receiver");
        }
        ball::launch(&mut self.state, receiver, &self.config, &mut self.rng)
    }

    /// Advance the play by `dt` seconds.
    ///
    /// Does nothing outside post-snap and ball-thrown. Invalid steps are
    /// replaced by the configured default.
    pub fn tick(&mut self, dt: f32) {
        if !self.state.phase.is_live() {
            return;
        }
        let dt = self.config.sanitize_step(dt);
        self.state.tick += 1;
        self.state.elapsed += dt;

        let scheme = self.scheme();
        if let Some(scheme) = scheme {
            scheme.per_tick(&mut self.state, &self.config);
        }
        movement::update(&mut self.state, dt, &self.config);
        if let Some(scheme) = scheme {
            pattern_match::update(&mut self.state, scheme);
        }
        behaviors::update(&mut self.state);

        self.update_pressure(dt);
        if self.state.phase == Phase::PostSnap && self.state.elapsed >= self.state.sack_time {
            let outcome = outcome::resolve_sack(&self.state, &self.config);
            self.finish_play(outcome);
            return;
        }

        match ball::advance(&mut self.state, dt, &self.config) {
            Flight::Held | Flight::InAir => {}
            Flight::Arrived => {
                let outcome = outcome::resolve_catch(&mut self.state, &self.config, &mut self.rng);
                self.finish_play(outcome);
            }
            Flight::Missed => {
                let outcome = outcome::resolve_miss(&mut self.state);
                self.finish_play(outcome);
            }
        }

        #[cfg(debug_assertions)]
        trace!(tick = self.state.tick, state_hash = self.state.state_hash(), "Play state hash");

        #[cfg(feature = "debug-validation")]
        self.validate_invariants();
    }

    fn update_pressure(&mut self, dt: f32) {
        let Some(qb) = self.state.quarterback().map(|qb| qb.position) else {
            return;
        };
        let (unblocked, nearest) = self
            .state
            .unblocked_blitzers()
            .fold((0usize, f32::INFINITY), |(n, nearest), p| {
                (n + 1, nearest.min(p.position.distance(qb)))
            });
        let proximity = pressure::proximity(nearest);
        self.state.sack_time = pressure::next_sack_time(
            self.state.sack_time,
            unblocked,
            proximity,
            dt,
            &self.config,
        );
        self.state.pressure = pressure::tier(self.state.elapsed, self.state.sack_time);
        trace!(
            unblocked,
            proximity,
            sack_time = self.state.sack_time,
            pressure = ?self.state.pressure,
            "Pressure updated"
        );
    }

    fn finish_play(&mut self, outcome: PlayOutcome) {
        for player in &mut self.state.players {
            player.velocity = Vec2::ZERO;
        }
        debug!(
            kind = ?outcome.kind,
            yards = outcome.yards,
            time = outcome.time,
            tick = self.state.tick,
            "Play over"
        );
        self.state.outcome = Some(outcome);
        self.state.phase = Phase::PlayOver;
    }

    #[cfg(feature = "debug-validation")]
    fn validate_invariants(&self) {
        use tracing::warn;

        if self.state.coverage.is_some() && self.state.defender_count() != crate::components::DEFENDER_COUNT {
            warn!(count = self.state.defender_count(), "Defender count drifted");
        }
        if self.state.players_in_motion() > 1 {
            warn!(count = self.state.players_in_motion(), "More than one player in motion");
        }
        for player in &self.state.players {
            if !crate::field::in_bounds(player.position) || !player.position.is_finite() {
                warn!(player = player.id, position = ?player.position, "Player out of bounds");
            }
        }
        if !self.state.players.windows(2).all(|w| w[0].id < w[1].id) {
            warn!("Players out of id order");
        }
    }

    // ========================================================================
    // Between plays
    // ========================================================================

    /// Apply the outcome to the drive and set up the next play.
    ///
    /// Returns `None` until the play is over.
    pub fn advance_to_next_play(&mut self) -> Option<DriveResult> {
        if self.state.phase != Phase::PlayOver {
            self.reject("advance_to_next_play", "play not over");
            return None;
        }
        let outcome = self.state.outcome.clone()?;
        let result = self.state.drive.apply(&outcome);
        debug!(
            result = ?result,
            down = self.state.drive.down,
            yards_to_go = self.state.drive.yards_to_go,
            line_of_scrimmage = self.state.drive.line_of_scrimmage,
            "Drive advanced"
        );
        self.snap_snapshot = None;
        self.reset_play();
        Some(result)
    }

    /// Reset play-local state, keeping the drive and templates.
    pub fn reset_play(&mut self) {
        let fresh = GameState::new(self.config.base_sack_time);
        let previous = std::mem::replace(&mut self.state, fresh);
        self.state.drive = previous.drive;
        self.state.concept = previous.concept;
        self.state.coverage = previous.coverage;
        self.state.personnel = previous.personnel;
        self.setup();
    }

    /// Start a new drive, keeping the templates and session counters.
    pub fn reset(&mut self) {
        self.state.drive.new_drive();
        self.snap_snapshot = None;
        self.reset_play();
        debug!("Drive reset");
    }

    /// Restore the pre-snap state saved at the last snap.
    pub fn replay_from_snap(&mut self) -> bool {
        let Some(snapshot) = self.snap_snapshot.as_ref() else {
            return self.reject("replay_from_snap", "no snap recorded");
        };
        self.state = (**snapshot).clone();
        debug!(tick = self.state.tick, "Restored pre-snap state");
        true
    }

    // ========================================================================
    // Persistence and commands
    // ========================================================================

    /// Serialize the play with bincode.
    pub fn serialize_state(&self) -> Result<Vec<u8>> {
        bincode::serialize(&self.state).map_err(|e| PlayError::Serialization(e.to_string()))
    }

    /// Replace the play with a serialized one.
    pub fn restore_state(&mut self, bytes: &[u8]) -> Result<()> {
        let mut state: GameState =
            bincode::deserialize(bytes).map_err(|e| PlayError::Serialization(e.to_string()))?;
        if let Some(player) = state
            .players
            .iter()
            .find(|p| p.route.as_ref().is_some_and(|r| !r.is_consistent()))
        {
            return Err(PlayError::Serialization(format!(
                "route for player {} has mismatched waypoints and timings",
                player.id
            )));
        }
        state.sort_players();
        self.state = state;
        Ok(())
    }

    /// Apply a recorded command.
    pub fn apply_command(&mut self, command: &PlayCommand) -> bool {
        match *command {
            PlayCommand::Snap => self.snap(),
            PlayCommand::Throw(id) => self.throw_to(id),
            PlayCommand::Tick(dt) => {
                let live = self.state.phase.is_live();
                self.tick(dt);
                live
            }
            PlayCommand::Motion(id, motion_type) => self.send_in_motion(id, motion_type),
            PlayCommand::AdvanceMotion(dt) => self.advance_motion(dt),
            PlayCommand::Audible(id, route_type) => self.audible_route(id, route_type),
            PlayCommand::HotRoute(id, route_type) => self.apply_hot_route(id, route_type),
            PlayCommand::SightAdjustment(id) => self.apply_sight_adjustment(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::DEFENDER_COUNT;
    use crate::data::Playbook;
    use crate::outcome::OutcomeKind;
    use crate::rng::ScriptedRandom;

    fn engine(concept: &str, coverage: &str) -> PlayEngine<ScriptedRandom> {
        let playbook = Playbook::standard();
        let mut engine = PlayEngine::new(EngineConfig::default(), ScriptedRandom::constant(0.5));
        assert!(engine.set_play_concept(playbook.concept(concept).unwrap()));
        assert!(engine.set_coverage(playbook.coverage(coverage).unwrap().clone()));
        engine
    }

    fn label_id(engine: &PlayEngine<ScriptedRandom>, label: &str) -> PlayerId {
        engine
            .game_state()
            .players
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.id)
            .unwrap()
    }

    #[test]
    fn test_setup_builds_both_sides() {
        let engine = engine("slant-flat", "cover-3");
        let state = engine.game_state();
        assert_eq!(state.defender_count(), DEFENDER_COUNT);
        assert_eq!(state.offense().count(), 6);
        assert!(state.offense().filter(|p| p.label == "RB").all(|p| p.is_blocking));
        assert_eq!(state.ball.state, BallState::Held);
    }

    #[test]
    fn test_snap_requires_templates_and_fires_once() {
        let mut bare = PlayEngine::with_seed(1);
        assert!(!bare.snap());
        let mut engine = engine("slant-flat", "cover-2");
        assert!(engine.snap());
        assert!(!engine.snap());
        assert_eq!(engine.phase(), Phase::PostSnap);
    }

    #[test]
    fn test_setup_rejected_after_snap() {
        let mut engine = engine("slant-flat", "cover-2");
        assert!(engine.snap());
        assert!(!engine.set_line_of_scrimmage(40));
        assert!(!engine.set_hash_position(HashMark::Left));
        assert!(!engine.set_personnel("12"));
        assert_eq!(engine.game_state().drive.line_of_scrimmage, 25);
    }

    #[test]
    fn test_tick_is_noop_pre_snap() {
        let mut engine = engine("slant-flat", "cover-2");
        let before = engine.state_hash();
        engine.tick(1.0 / 60.0);
        assert_eq!(engine.state_hash(), before);
    }

    #[test]
    fn test_throw_rules() {
        let mut engine = engine("slant-flat", "cover-3");
        let x = label_id(&engine, "X");
        assert!(!engine.throw_to(x));
        assert!(engine.snap());
        let rb = label_id(&engine, "RB");
        assert!(!engine.throw_to(rb));
        assert!(!engine.throw_to(999));
        assert!(!engine.throw_to(101));
        assert!(engine.throw_to(x));
        assert_eq!(engine.phase(), Phase::BallThrown);
        assert!(!engine.throw_to(x));
    }

    #[test]
    fn test_thrown_play_finishes() {
        let mut engine = engine("slant-flat", "cover-3");
        assert!(engine.snap());
        for _ in 0..30 {
            engine.tick(1.0 / 60.0);
        }
        let x = label_id(&engine, "X");
        assert!(engine.throw_to(x));
        for _ in 0..600 {
            engine.tick(1.0 / 60.0);
            if engine.phase() == Phase::PlayOver {
                break;
            }
        }
        assert_eq!(engine.phase(), Phase::PlayOver);
        let kind = engine.outcome().unwrap().kind;
        assert_ne!(kind, OutcomeKind::Sack);
    }

    #[test]
    fn test_audible_limit() {
        let mut engine = engine("slant-flat", "cover-3");
        let x = label_id(&engine, "X");
        let qb = label_id(&engine, "QB");
        assert!(!engine.audible_route(qb, RouteType::Go));
        assert!(engine.audible_route(x, RouteType::Go));
        assert!(engine.apply_hot_route(x, RouteType::Slant));
        assert!(!engine.apply_hot_route(x, RouteType::Post));
        assert!(engine.apply_sight_adjustment(x));
        assert!(!engine.audible_route(x, RouteType::Curl));
        assert_eq!(engine.game_state().audibles_used, 3);
    }

    #[test]
    fn test_audible_to_block_drops_eligibility() {
        let mut engine = engine("slant-flat", "cover-1");
        let a = label_id(&engine, "A");
        assert!(engine.audible_route(a, RouteType::Block));
        let state = engine.game_state();
        assert!(state.eligible_receiver(a).is_none());
        assert_eq!(state.defender_count(), DEFENDER_COUNT);
        assert!(state
            .defense()
            .all(|d| d.responsibility.and_then(|r| r.man_target()) != Some(a)));
    }

    #[test]
    fn test_sight_adjustment_table() {
        assert_eq!(sight_adjustment_route(1.0), RouteType::Go);
        assert_eq!(sight_adjustment_route(4.0), RouteType::Slant);
        assert_eq!(sight_adjustment_route(8.0), RouteType::Hitch);
    }

    #[test]
    fn test_single_motion_per_play() {
        let mut engine = engine("slant-flat", "cover-3");
        let a = label_id(&engine, "A");
        let b = label_id(&engine, "B");
        let qb = label_id(&engine, "QB");
        assert!(!engine.send_in_motion(qb, MotionType::Jet));
        assert!(engine.send_in_motion(a, MotionType::Shift));
        assert!(!engine.send_in_motion(b, MotionType::Jet));
        assert_eq!(engine.game_state().players_in_motion(), 1);

        let mut steps = 0;
        while engine.advance_motion(1.0 / 60.0) {
            steps += 1;
            assert!(steps < 600);
        }
        let state = engine.game_state();
        assert_eq!(state.players_in_motion(), 0);
        let mover = state.player(a).unwrap();
        assert_eq!(mover.route.as_ref().unwrap().start(), mover.position);
        assert!(mover.motion_boost.is_some_and(|b| !b.active));
        assert_eq!(state.defender_count(), DEFENDER_COUNT);
    }

    #[test]
    fn test_snap_completes_running_motion_and_activates_boost() {
        let mut engine = engine("slant-flat", "cover-1");
        let a = label_id(&engine, "A");
        assert!(engine.send_in_motion(a, MotionType::Jet));
        assert!(engine.advance_motion(1.0 / 60.0));
        assert!(engine.snap());
        let state = engine.game_state();
        let mover = state.player(a).unwrap();
        assert!(!mover.has_motion);
        assert!(mover.motion_boost.is_some_and(|b| b.active));
        assert_eq!(mover.route.as_ref().unwrap().start(), mover.alignment);
    }

    #[test]
    fn test_replay_from_snap_restores_presnap() {
        let mut engine = engine("smash", "cover-2");
        assert!(!engine.replay_from_snap());
        let presnap = engine.state_hash();
        assert!(engine.snap());
        for _ in 0..20 {
            engine.tick(1.0 / 60.0);
        }
        assert!(engine.replay_from_snap());
        assert_eq!(engine.phase(), Phase::PreSnap);
        assert_eq!(engine.state_hash(), presnap);
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut engine = engine("flood", "cover-4");
        assert!(engine.snap());
        for _ in 0..10 {
            engine.tick(1.0 / 60.0);
        }
        let bytes = engine.serialize_state().unwrap();
        let mut other = PlayEngine::new(EngineConfig::default(), ScriptedRandom::constant(0.5));
        other.restore_state(&bytes).unwrap();
        assert_eq!(other.state_hash(), engine.state_hash());
        assert!(matches!(
            other.restore_state(&[1, 2, 3]),
            Err(PlayError::Serialization(_))
        ));
    }

    #[test]
    fn test_reset_play_keeps_drive() {
        let mut engine = engine("slant-flat", "cover-3");
        assert!(engine.set_line_of_scrimmage(40));
        assert!(engine.snap());
        engine.tick(1.0 / 60.0);
        engine.reset_play();
        let state = engine.game_state();
        assert_eq!(state.phase, Phase::PreSnap);
        assert_eq!(state.drive.line_of_scrimmage, 40);
        assert_eq!(state.defender_count(), DEFENDER_COUNT);

        engine.reset();
        assert_eq!(engine.game_state().drive.line_of_scrimmage, 25);
    }

    #[test]
    fn test_advance_requires_finished_play() {
        let mut engine = engine("slant-flat", "cover-3");
        assert!(engine.advance_to_next_play().is_none());
    }
}
