//! Quarterback decision policy for headless plays.

use gridiron_core::pressure::preferred_throw_time;
use gridiron_core::prelude::*;

use crate::scenario::ThrowPlan;

/// Distance from `id` to the nearest defender.
#[must_use]
pub fn separation(state: &GameState, id: PlayerId) -> Option<f32> {
    let at = state.player(id)?.position;
    state
        .defense()
        .map(|d| d.position.distance(at))
        .min_by(f32::total_cmp)
        .or(Some(f32::INFINITY))
}

/// The eligible receiver with the most separation. Ties go to the lower id.
#[must_use]
pub fn most_open_receiver(state: &GameState) -> Option<(PlayerId, f32)> {
    state
        .eligible_ids()
        .into_iter()
        .filter_map(|id| separation(state, id).map(|s| (id, s)))
        .fold(None, |best: Option<(PlayerId, f32)>, (id, s)| match best {
            Some((_, best_s)) if best_s >= s => best,
            _ => Some((id, s)),
        })
}

/// Decides when and where to throw.
#[derive(Debug, Clone, PartialEq)]
pub struct Quarterback {
    plan: ThrowPlan,
}

impl Quarterback {
    /// Policy following `plan`.
    #[must_use]
    pub const fn new(plan: ThrowPlan) -> Self {
        Self { plan }
    }

    /// The plan in use.
    #[must_use]
    pub const fn plan(&self) -> &ThrowPlan {
        &self.plan
    }

    /// Target to throw to this tick, if any.
    ///
    /// The most-open plan releases at the preferred time for the current
    /// sack clock, so pressure pulls the throw earlier.
    #[must_use]
    pub fn decide(&self, state: &GameState) -> Option<PlayerId> {
        if state.phase != Phase::PostSnap || state.ball.state != BallState::Held {
            return None;
        }
        match &self.plan {
            ThrowPlan::Never => None,
            ThrowPlan::MostOpen => {
                if state.elapsed < preferred_throw_time(state.sack_time) {
                    return None;
                }
                most_open_receiver(state).map(|(id, _)| id)
            }
            ThrowPlan::Target { label, after } => {
                if state.elapsed < *after {
                    return None;
                }
                state
                    .offense()
                    .find(|p| &p.label == label)
                    .and_then(|p| state.eligible_receiver(p.id))
                    .map(|p| p.id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_test_utils::fixtures::{engine, run_for};

    #[test]
    fn test_never_holds() {
        let mut engine = engine("slant-flat", "cover-3", 1);
        assert!(engine.snap());
        run_for(&mut engine, 2.0);
        assert_eq!(Quarterback::new(ThrowPlan::Never).decide(&engine.game_state()), None);
    }

    #[test]
    fn test_most_open_waits_for_preferred_time() {
        let mut engine = engine("smash", "cover-2", 1);
        let qb = Quarterback::new(ThrowPlan::MostOpen);
        assert_eq!(qb.decide(&engine.game_state()), None);
        assert!(engine.snap());
        engine.tick(1.0 / 60.0);
        assert_eq!(qb.decide(&engine.game_state()), None);

        let state = engine.game_state();
        run_for(&mut engine, preferred_throw_time(state.sack_time) + 0.1);
        let state = engine.game_state();
        let target = qb.decide(&state).unwrap();
        assert!(state.eligible_receiver(target).is_some());
        let (best, _) = most_open_receiver(&state).unwrap();
        assert_eq!(target, best);
    }

    #[test]
    fn test_target_plan_resolves_label() {
        let mut engine = engine("mesh", "cover-1", 1);
        let qb = Quarterback::new(ThrowPlan::Target {
            label: "Z".to_string(),
            after: 0.5,
        });
        assert!(engine.snap());
        run_for(&mut engine, 0.6);
        let state = engine.game_state();
        let target = qb.decide(&state).unwrap();
        assert_eq!(state.player(target).unwrap().label, "Z");
    }

    #[test]
    fn test_blocker_is_never_most_open() {
        let engine = engine("four-verts", "cover-0", 1);
        let state = engine.game_state();
        let (id, _) = most_open_receiver(&state).unwrap();
        assert_ne!(state.player(id).unwrap().label, "RB");
    }
}
