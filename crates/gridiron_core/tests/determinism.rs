//! Determinism tests.
//!
//! Same seed, same inputs, same hashes. Recordings re-execute to the hash
//! they were finalized with.

use gridiron_core::prelude::*;
use gridiron_test_utils::determinism::{first_divergence, hash_trace, verify_determinism};
use gridiron_test_utils::fixtures::{engine, player_id, run_for, run_to_end, STEP};
use gridiron_test_utils::strategies::{COVERAGES, CONCEPTS};

fn snapped(concept: &str, coverage: &str, seed: u64) -> PlayEngine {
    let mut engine = engine(concept, coverage, seed);
    assert!(engine.snap());
    engine
}

#[test]
fn same_seed_same_hash_for_every_matchup() {
    for concept in CONCEPTS {
        for coverage in COVERAGES {
            let result = verify_determinism(
                3,
                180,
                || snapped(concept, coverage, 42),
                |e| e.tick(STEP),
                |e| e.state_hash(),
            );
            assert!(result.is_deterministic, "{concept} vs {coverage}: {:?}", result.hashes);
        }
    }
}

#[test]
fn traces_match_tick_for_tick() {
    let mut a = snapped("flood", "cover-3", 9);
    let mut b = snapped("flood", "cover-3", 9);
    let trace_a = hash_trace(&mut a, 200, STEP);
    let trace_b = hash_trace(&mut b, 200, STEP);
    assert_eq!(first_divergence(&trace_a, &trace_b), None);
}

#[test]
fn different_seeds_diverge() {
    let mut a = snapped("four-verts", "cover-4", 1);
    let mut b = snapped("four-verts", "cover-4", 2);
    let trace_a = hash_trace(&mut a, 150, STEP);
    let trace_b = hash_trace(&mut b, 150, STEP);
    assert!(first_divergence(&trace_a, &trace_b).is_some());
}

#[test]
fn cloned_engine_continues_identically() {
    let mut live = snapped("mesh", "cover-1", 21);
    run_for(&mut live, 0.75);
    let mut copy = live.clone();
    let target = player_id(&live, "A");
    assert!(live.throw_to(target));
    assert!(copy.throw_to(target));
    run_to_end(&mut live);
    run_to_end(&mut copy);
    assert_eq!(live.state_hash(), copy.state_hash());
    assert_eq!(live.outcome(), copy.outcome());
}

#[test]
fn replay_from_snap_restores_pre_snap_state() {
    let mut engine = engine("smash", "cover-6", 4);
    let before = engine.state_hash();
    assert!(!engine.replay_from_snap());
    assert!(engine.snap());
    run_to_end(&mut engine);
    assert!(engine.replay_from_snap());
    assert_eq!(engine.phase(), Phase::PreSnap);
    assert_eq!(engine.state_hash(), before);
    assert!(engine.snap());
}

#[test]
fn recording_with_adjustments_verifies_after_round_trip() {
    let mut live = engine("trips-seam", "cover-3-buzz-disguise", 1234);
    let z = player_id(&live, "Z");
    let x = player_id(&live, "X");
    let h = player_id(&live, "H");
    let mut recording = PlayRecording::new(&live).unwrap();
    assert!(recording.apply(&mut live, PlayCommand::HotRoute(x, RouteType::Slant)));
    assert!(recording.apply(&mut live, PlayCommand::SightAdjustment(z)));
    assert!(recording.apply(&mut live, PlayCommand::Motion(h, MotionType::Jet)));
    for _ in 0..30 {
        recording.apply(&mut live, PlayCommand::AdvanceMotion(STEP));
    }
    assert!(recording.apply(&mut live, PlayCommand::Snap));
    for _ in 0..45 {
        recording.apply(&mut live, PlayCommand::Tick(STEP));
    }
    recording.apply(&mut live, PlayCommand::Throw(x));
    while live.phase() != Phase::PlayOver {
        recording.apply(&mut live, PlayCommand::Tick(STEP));
    }
    recording.finalize(&live);

    let bytes = recording.to_bytes().unwrap();
    let restored = PlayRecording::from_bytes(&bytes).unwrap();
    let mut player = RecordingPlayer::new(restored).unwrap();
    assert_eq!(player.verify().unwrap(), live.state_hash());
    assert_eq!(player.engine().outcome(), live.outcome());
}

#[test]
fn recording_started_mid_drive_resumes_the_generator() {
    let mut live = engine("slant-flat", "cover-2", 77);
    assert!(live.snap());
    run_to_end(&mut live);
    assert!(live.advance_to_next_play().is_some());

    let mut recording = PlayRecording::new(&live).unwrap();
    assert!(recording.draws > 0);
    recording.apply(&mut live, PlayCommand::Snap);
    for _ in 0..120 {
        recording.apply(&mut live, PlayCommand::Tick(STEP));
    }
    recording.finalize(&live);

    let mut player = RecordingPlayer::new(recording).unwrap();
    assert_eq!(player.verify().unwrap(), live.state_hash());
}
