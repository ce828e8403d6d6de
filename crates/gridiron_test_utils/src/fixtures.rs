//! Test fixtures and helpers.
//!
//! Engines set up from the standard playbook, and helpers that run a play
//! to completion with synthetic steps.

use gridiron_core::prelude::*;

/// Fixed step used by the helpers (one reference tick).
pub const STEP: f32 = 1.0 / TICK_RATE as f32;

/// Most ticks a helper will run before giving up on a play.
pub const MAX_TICKS: u32 = 60 * 10;

/// Engine with `concept` and `coverage` from the standard playbook.
///
/// # Panics
///
/// Panics if either name is not in the standard playbook.
#[must_use]
pub fn engine(concept: &str, coverage: &str, seed: u64) -> PlayEngine {
    let mut engine = PlayEngine::with_seed(seed);
    setup(&mut engine, concept, coverage);
    engine
}

/// Engine with a scripted random source.
///
/// # Panics
///
/// Panics if either name is not in the standard playbook.
#[must_use]
pub fn scripted_engine(concept: &str, coverage: &str, draws: Vec<f32>) -> PlayEngine<ScriptedRandom> {
    let mut engine = PlayEngine::new(EngineConfig::default(), ScriptedRandom::new(draws));
    setup(&mut engine, concept, coverage);
    engine
}

fn setup<R: RandomSource>(engine: &mut PlayEngine<R>, concept: &str, coverage: &str) {
    let playbook = Playbook::standard();
    let concept = playbook
        .concept(concept)
        .unwrap_or_else(|| panic!("unknown concept {concept}"));
    let coverage = playbook
        .coverage(coverage)
        .unwrap_or_else(|| panic!("unknown coverage {coverage}"))
        .clone();
    assert!(engine.set_play_concept(concept));
    assert!(engine.set_coverage(coverage));
}

/// Id of the player with `label`.
///
/// # Panics
///
/// Panics if no player has that label.
#[must_use]
pub fn player_id<R: RandomSource>(engine: &PlayEngine<R>, label: &str) -> PlayerId {
    engine
        .game_state()
        .players
        .iter()
        .find(|p| p.label == label)
        .map(|p| p.id)
        .unwrap_or_else(|| panic!("no player labelled {label}"))
}

/// Tick until the play is over. Returns the ticks run.
pub fn run_to_end<R: RandomSource>(engine: &mut PlayEngine<R>) -> u32 {
    let mut ticks = 0;
    while engine.phase() != Phase::PlayOver && ticks < MAX_TICKS {
        engine.tick(STEP);
        ticks += 1;
    }
    ticks
}

/// Tick `seconds` worth of reference steps.
pub fn run_for<R: RandomSource>(engine: &mut PlayEngine<R>, seconds: f32) {
    let ticks = (seconds / STEP).round() as u32;
    for _ in 0..ticks {
        engine.tick(STEP);
    }
}

/// Snap, wait `throw_after` seconds, throw to `label` and finish the play.
///
/// # Panics
///
/// Panics if the snap is rejected or no player has `label`.
pub fn throw_play<R: RandomSource>(
    engine: &mut PlayEngine<R>,
    label: &str,
    throw_after: f32,
) -> Option<PlayOutcome> {
    let target = player_id(engine, label);
    assert!(engine.snap(), "snap rejected");
    run_for(engine, throw_after);
    engine.throw_to(target);
    run_to_end(engine);
    engine.outcome().cloned()
}

/// Defender depths past the line of scrimmage, by label.
#[must_use]
pub fn defender_depths(state: &GameState) -> Vec<(String, PositionType, f32)> {
    let los_y = state.los_y();
    state
        .defense()
        .map(|d| (d.label.clone(), d.position_type, d.position.y - los_y))
        .collect()
}
