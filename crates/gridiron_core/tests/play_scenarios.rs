//! End-to-end play scenarios driven through the public engine API.

use gridiron_core::behaviors::POACH_TRIGGER_DEPTH;
use gridiron_core::coverage::{Bracket, BracketRole, ZoneRead};
use gridiron_core::prelude::*;
use gridiron_core::{movement, pressure};
use gridiron_test_utils::fixtures::{engine, player_id, run_for, run_to_end, scripted_engine, STEP};

/// Mark every rusher as picked up by the protection.
fn block_every_rusher(engine: &mut PlayEngine) {
    let mut state = engine.game_state();
    for player in &mut state.players {
        if player.is_blitzing() {
            player.is_blocked = true;
        }
    }
    engine.restore_state(&bincode::serialize(&state).unwrap()).unwrap();
}

// =============================================================================
// Sack and throw rules
// =============================================================================

#[test]
fn slant_flat_against_cover_one_with_no_throw_is_a_sack() {
    let mut engine = engine("slant-flat", "cover-1", 11);
    assert!(engine.set_line_of_scrimmage(20));
    assert!(engine.snap());
    run_to_end(&mut engine);

    assert_eq!(engine.phase(), Phase::PlayOver);
    let outcome = engine.outcome().expect("play decided");
    assert_eq!(outcome.kind, OutcomeKind::Sack);
    assert!(outcome.yards < 0.0);
    assert!(outcome.yards >= -15.0);
    assert!(outcome.time <= EngineConfig::default().base_sack_time + 2.0 * STEP);
}

#[test]
fn sack_clock_only_recovers_when_the_rush_eases() {
    let config = EngineConfig::default();
    let mut engine = engine("four-verts", "cover-0", 3);
    assert!(engine.snap());
    let mut previous = engine.state().sack_time;
    while engine.phase() != Phase::PlayOver {
        engine.tick(STEP);
        let state = engine.state();
        if state.sack_time > previous + 1.0e-6 {
            let qb = state.quarterback().unwrap().position;
            let (unblocked, nearest) = state
                .unblocked_blitzers()
                .fold((0, f32::INFINITY), |(n, d), p| (n + 1, d.min(p.position.distance(qb))));
            let target = pressure::pressure_target(unblocked, pressure::proximity(nearest), &config);
            assert!(target > previous, "clock rose at tick {} under the same rush", state.tick);
            assert!(state.sack_time - previous <= config.sack_recovery_rate * STEP + 1.0e-5);
        }
        previous = state.sack_time;
    }
}

#[test]
fn picking_up_the_blitz_restores_the_sack_clock() {
    let config = EngineConfig::default();
    let mut engine = engine("four-verts", "cover-0", 3);
    assert!(engine.snap());
    for _ in 0..30 {
        if engine.state().sack_time < config.base_sack_time - 0.1 {
            break;
        }
        engine.tick(STEP);
    }
    let cut = engine.state().sack_time;
    assert!(cut < config.base_sack_time - 0.1, "free rushers should cut the clock");

    block_every_rusher(&mut engine);
    assert_eq!(engine.state().unblocked_blitzers().count(), 0);

    engine.tick(STEP);
    let recovered = engine.state().sack_time;
    assert!((recovered - (cut + config.sack_recovery_rate * STEP)).abs() < 1.0e-5);
    for _ in 0..5 {
        let before = engine.state().sack_time;
        engine.tick(STEP);
        assert!(engine.state().sack_time > before);
        assert!(engine.state().sack_time <= config.base_sack_time);
    }
}

#[test]
fn throw_to_ineligible_or_missing_player_keeps_ball_held() {
    let mut engine = engine("slant-flat", "cover-3", 5);
    assert!(engine.snap());
    engine.tick(STEP);

    let blocker = player_id(&engine, "RB");
    let quarterback = player_id(&engine, "QB");
    let defender = engine.game_state().defense().next().map(|d| d.id).unwrap();
    for id in [blocker, quarterback, defender, 4242] {
        assert!(!engine.throw_to(id), "throw to {id} should be rejected");
        let state = engine.game_state();
        assert_eq!(state.ball.state, BallState::Held);
        assert_eq!(state.phase, Phase::PostSnap);
    }
}

#[test]
fn nothing_moves_after_play_over() {
    let mut engine = engine("slant-flat", "cover-0", 2);
    assert!(engine.snap());
    run_to_end(&mut engine);
    let hash = engine.state_hash();
    run_for(&mut engine, 1.0);
    assert_eq!(engine.state_hash(), hash);
    assert!(!engine.snap());
}

#[test]
fn must_throw_before_snap_is_rejected() {
    let mut engine = engine("mesh", "cover-1", 2);
    let a = player_id(&engine, "A");
    assert!(!engine.throw_to(a));
    assert_eq!(engine.game_state().ball.state, BallState::Held);
}

#[test]
fn open_receiver_catch_against_soft_zone() {
    // Every draw at 0.01: no jitter surprises, every catch roll succeeds.
    let mut engine = scripted_engine("smash", "cover-2", vec![0.01]);
    let a = player_id(&engine, "A");
    assert!(engine.snap());
    run_for(&mut engine, 0.5);
    assert!(engine.throw_to(a));
    assert_eq!(engine.phase(), Phase::BallThrown);
    run_to_end(&mut engine);
    let outcome = engine.outcome().expect("play decided");
    assert_ne!(outcome.kind, OutcomeKind::Sack);
    assert_eq!(outcome.receiver, Some(a));
}

// =============================================================================
// Drive bookkeeping
// =============================================================================

#[test]
fn line_of_scrimmage_below_two_is_a_safety_reset() {
    let mut engine = engine("slant-flat", "cover-3", 1);
    assert!(engine.set_line_of_scrimmage(1));
    let drive = engine.game_state().drive;
    assert_eq!(drive.line_of_scrimmage, 30);
    assert_eq!(drive.down, 1);
    assert_eq!(drive.yards_to_go, 10);
}

#[test]
fn fifteen_yard_catch_from_the_thirty_moves_the_chains() {
    let mut engine = engine("slant-flat", "cover-3", 1);
    assert!(engine.set_line_of_scrimmage(30));
    assert!(engine.snap());

    let mut state = engine.game_state();
    state.phase = Phase::PlayOver;
    state.outcome = Some(PlayOutcome {
        kind: OutcomeKind::Catch,
        yards: 15.0,
        receiver: Some(2),
        defender: None,
        separation: Some(4.0),
        catch_probability: Some(80.0),
        time: 1.8,
        ball_spot: Vec2::new(HashMark::Middle.ball_x(), state.los_y() + 15.0),
    });
    let bytes = bincode::serialize(&state).unwrap();
    engine.restore_state(&bytes).unwrap();

    assert_eq!(engine.advance_to_next_play(), Some(DriveResult::FirstDown));
    let next = engine.game_state();
    assert_eq!(next.phase, Phase::PreSnap);
    assert_eq!(next.drive.line_of_scrimmage, 45);
    assert_eq!(next.drive.down, 1);
    assert_eq!(next.drive.yards_to_go, 10);
    assert_eq!(next.drive.play_count, 1);
    assert_eq!(next.defender_count(), 7);
}

#[test]
fn sack_then_next_play_loses_ground() {
    let mut engine = engine("four-verts", "cover-0", 9);
    assert!(engine.set_line_of_scrimmage(50));
    assert!(engine.snap());
    run_to_end(&mut engine);
    let loss = engine.outcome().map(|o| o.yards).unwrap();
    assert_eq!(engine.advance_to_next_play(), Some(DriveResult::NextDown));
    let drive = engine.game_state().drive;
    assert_eq!(drive.down, 2);
    assert_eq!(i32::from(drive.line_of_scrimmage), 50 + loss.round() as i32);
}

// =============================================================================
// Setup operations
// =============================================================================

#[test]
fn personnel_change_retypes_the_offense() {
    let mut engine = engine("slant-flat", "cover-3", 1);
    assert!(engine.set_personnel("12"));
    let state = engine.game_state();
    let tight_ends = state
        .offense()
        .filter(|p| p.position_type == PositionType::TightEnd)
        .count();
    assert_eq!(tight_ends, 2);
    assert_eq!(state.defender_count(), 7);

    assert!(!engine.set_personnel("7"));
    assert!(!engine.set_personnel("33"));
    assert!(!engine.set_personnel("ab"));
}

#[test]
fn hash_change_moves_the_ball() {
    let mut engine = engine("slant-flat", "cover-3", 1);
    assert!(engine.set_hash_position(HashMark::Left));
    let state = engine.game_state();
    assert!((state.ball_x() - HashMark::Left.ball_x()).abs() < 1.0e-4);
    let qb = state.quarterback().unwrap();
    assert!((qb.position.x - HashMark::Left.ball_x()).abs() < 1.0e-4);
}

#[test]
fn motion_then_snap_keeps_one_mover_and_reanchors() {
    let mut engine = engine("slant-flat", "cover-1", 4);
    let b = player_id(&engine, "B");
    assert!(engine.send_in_motion(b, MotionType::Orbit));
    assert!(engine.advance_motion(STEP));
    assert!(engine.game_state().players_in_motion() <= 1);
    while engine.advance_motion(STEP) {}
    let state = engine.game_state();
    let mover = state.player(b).unwrap();
    assert_eq!(state.players_in_motion(), 0);
    assert_eq!(mover.route.as_ref().unwrap().start(), mover.position);
    assert!(engine.snap());
}

#[test]
fn zero_step_motion_still_finishes() {
    let mut engine = engine("smash", "cover-2", 4);
    let a = player_id(&engine, "A");
    let start = engine.state().player(a).unwrap().position;
    assert!(engine.send_in_motion(a, MotionType::Jet));
    let mut steps = 0;
    while engine.advance_motion(0.0) {
        steps += 1;
        assert!(steps < 10_000, "motion made no progress on a zero step");
    }
    assert!(steps > 0);
    assert_eq!(engine.state().players_in_motion(), 0);
    assert_ne!(engine.state().player(a).unwrap().position, start);
}

#[test]
fn restoring_a_route_with_missing_timings_is_rejected() {
    let mut engine = engine("smash", "cover-2", 9);
    let before = engine.state_hash();
    let mut state = engine.game_state();
    let route = state
        .players
        .iter_mut()
        .find_map(|p| p.route.as_mut())
        .expect("smash has routes");
    route.timings.pop();
    let bytes = bincode::serialize(&state).unwrap();
    assert!(matches!(
        engine.restore_state(&bytes),
        Err(PlayError::Serialization(_))
    ));
    assert_eq!(engine.state_hash(), before);
}

// =============================================================================
// Coverage behaviors
// =============================================================================

#[test]
fn backside_quarter_safety_poaches_the_trips_seam() {
    let mut engine = engine("trips-seam", "cover-4", 5);
    let y = player_id(&engine, "Y");
    let (poacher, key) = engine
        .state()
        .defense()
        .find_map(|d| match d.responsibility?.kind {
            ResponsibilityKind::Zone {
                read: Some(ZoneRead::Poach { key }),
                ..
            } => Some((d.id, key)),
            _ => None,
        })
        .expect("cover 4 poaches against trips");
    assert_eq!(key, y);
    let zone_x = |state: &GameState| {
        state
            .player(poacher)
            .and_then(|p| p.responsibility)
            .and_then(|r| r.zone_area().map(|z| z.center.x))
            .expect("poacher keeps his zone")
    };
    let home = zone_x(engine.state());

    assert!(engine.snap());
    block_every_rusher(&mut engine);
    let los_y = engine.state().los_y();
    let mut jumped = false;
    while engine.phase() != Phase::PlayOver {
        engine.tick(STEP);
        let state = engine.state();
        let seam = state.player(y).unwrap().position;
        if seam.y - los_y > POACH_TRIGGER_DEPTH {
            assert!((zone_x(state) - seam.x).abs() < 1.0e-4);
            jumped = true;
            break;
        }
        assert!((zone_x(state) - home).abs() < 1.0e-4, "poached early at tick {}", state.tick);
    }
    assert!(jumped, "seam never got past the poach depth");
}

/// Receiver and bracket half for a bracketed defender.
fn bracket_of(player: &Player) -> Option<(PlayerId, Bracket)> {
    match player.responsibility?.kind {
        ResponsibilityKind::Man { target, bracket: Some(half), .. } => Some((target, half)),
        _ => None,
    }
}

#[test]
fn smash_bracket_halves_play_off_each_other() {
    let config = EngineConfig::default();
    let mut engine = engine("smash", "cover-2", 4);
    assert!(engine.snap());
    block_every_rusher(&mut engine);
    let bracketed = |engine: &PlayEngine| engine.state().defense().any(|d| bracket_of(d).is_some());
    while engine.phase() != Phase::PlayOver && !bracketed(&engine) {
        engine.tick(STEP);
    }

    let state = engine.state();
    let halves: Vec<(&Player, PlayerId, Bracket)> = state
        .defense()
        .filter_map(|d| bracket_of(d).map(|(target, half)| (d, target, half)))
        .collect();
    assert_eq!(halves.len(), 2, "smash brackets against cover 2");
    let (a, b) = (&halves[0], &halves[1]);
    assert_eq!(a.2.partner, b.0.id);
    assert_eq!(b.2.partner, a.0.id);
    assert_ne!(a.2.role, b.2.role);

    for (defender, target, half) in &halves {
        let receiver = state.player(*target).unwrap().position;
        let partner = state.player(half.partner).unwrap().position;
        let spot = movement::defender_target(state, defender.id, &config).unwrap();
        match half.role {
            BracketRole::Over => assert!(spot.y > receiver.y, "{} not over the top", defender.label),
            BracketRole::Under => assert!(spot.y < receiver.y, "{} not underneath", defender.label),
        }
        let away = receiver.x - partner.x;
        if away.abs() > 1.0e-3 {
            assert_eq!(
                (spot.x - receiver.x).signum(),
                away.signum(),
                "{} shaded toward his partner",
                defender.label
            );
        }
    }
}

#[test]
fn inverted_corner_holds_his_spot_then_bails_deep() {
    let config = EngineConfig::default();
    let mut engine = engine("mesh", "cover-2-invert", 6);
    let lcb = player_id(&engine, "LCB");
    let aligned = engine.state().player(lcb).unwrap().position;
    let los_y = engine.state().los_y();
    assert!(engine.snap());
    block_every_rusher(&mut engine);

    run_for(&mut engine, 0.4);
    let state = engine.state();
    assert!(state.player(lcb).unwrap().responsibility.unwrap().is_disguised());
    assert_eq!(movement::defender_target(state, lcb, &config), Some(aligned));

    run_for(&mut engine, 0.3);
    let state = engine.state();
    let corner = state.player(lcb).unwrap().responsibility.unwrap();
    assert!(!corner.is_disguised());
    assert_eq!(
        corner.zone_area().map(|z| z.kind),
        Some(ZoneKind::DeepHalf(Side::Left))
    );
    let target = movement::defender_target(state, lcb, &config).unwrap();
    assert!(target.y - los_y >= 14.0, "corner target only {:.1} deep", target.y - los_y);

    let flat_safety = state.defense().find(|d| {
        d.position_type == PositionType::Safety
            && d.responsibility
                .and_then(|r| r.zone_area().map(|z| z.kind))
                == Some(ZoneKind::Flat(Side::Left))
    });
    assert!(flat_safety.is_some(), "no safety rotated down to the flat");
}
