//! Sack timing and quarterback pressure.
//!
//! The sack clock starts at the configured baseline and is pulled in by
//! unblocked rushers. When protection picks everyone up the clock drifts
//! back toward the baseline.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// Distance from the quarterback at which a rusher exerts full pressure.
pub const POCKET_EDGE: f32 = 1.25;

/// Distance over which rusher proximity fades to nothing.
pub const PRESSURE_RANGE: f32 = 10.0;

/// How hurried the quarterback is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PressureTier {
    /// Clean pocket.
    #[default]
    Clean,
    /// Pocket collapsing.
    Hurried,
    /// About to go down.
    Pressured,
}

impl PressureTier {
    /// Tier from elapsed time as a fraction of the sack clock.
    #[must_use]
    pub fn from_ratio(ratio: f32) -> Self {
        if ratio < 0.6 {
            Self::Clean
        } else if ratio < 0.85 {
            Self::Hurried
        } else {
            Self::Pressured
        }
    }

    /// Throw accuracy (1.0 = on the spot).
    #[must_use]
    pub const fn accuracy(self) -> f32 {
        match self {
            Self::Clean => 1.0,
            Self::Hurried => 0.85,
            Self::Pressured => 0.65,
        }
    }

    /// Multiplier on throw speed.
    #[must_use]
    pub const fn speed_factor(self) -> f32 {
        match self {
            Self::Clean => 1.0,
            Self::Hurried => 0.95,
            Self::Pressured => 0.9,
        }
    }
}

/// Tier for the current elapsed time and sack clock.
#[must_use]
pub fn tier(elapsed: f32, sack_time: f32) -> PressureTier {
    if sack_time <= 0.0 {
        return PressureTier::Pressured;
    }
    PressureTier::from_ratio(elapsed / sack_time)
}

/// Latest time the quarterback can release the ball from a clean pocket.
#[must_use]
pub fn preferred_throw_time(sack_time: f32) -> f32 {
    sack_time * 0.6
}

/// Proximity weight in `[0, 1]` of the closest free rusher.
#[must_use]
pub fn proximity(distance_to_qb: f32) -> f32 {
    if !distance_to_qb.is_finite() {
        return 0.0;
    }
    (1.0 - (distance_to_qb - POCKET_EDGE) / PRESSURE_RANGE).clamp(0.0, 1.0)
}

/// Baseline reduction for `unblocked` free rushers at `proximity`.
#[must_use]
pub fn reduction(unblocked: usize, proximity: f32, config: &EngineConfig) -> f32 {
    let t = proximity.clamp(0.0, 1.0);
    match unblocked {
        0 => 0.0,
        1 => {
            let (low, high) = config.single_rusher_reduction;
            low + (high - low) * t
        }
        n => {
            let (low, high) = config.multi_rusher_reduction;
            low + (high - low) * t + config.extra_rusher_reduction * (n - 2) as f32
        }
    }
}

/// Sack time pressure is pulling toward, before recovery limits.
///
/// Depends only on the rush, so holding the same rush holds the same
/// target. Never below the configured floor.
#[must_use]
pub fn pressure_target(unblocked: usize, proximity: f32, config: &EngineConfig) -> f32 {
    (config.base_sack_time - reduction(unblocked, proximity, config)).max(config.min_sack_time)
}

/// Advance the sack clock by one tick.
///
/// Pressure takes effect immediately. The clock only recovers, at the
/// configured rate, once the rush eases below what already cut it: a
/// rusher is picked up or the nearest one drifts away.
#[must_use]
pub fn next_sack_time(
    current: f32,
    unblocked: usize,
    proximity: f32,
    dt: f32,
    config: &EngineConfig,
) -> f32 {
    let target = pressure_target(unblocked, proximity, config);
    let next = if target <= current {
        target
    } else {
        (current + config.sack_recovery_rate * dt.max(0.0)).min(target)
    };
    next.max(config.min_sack_time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        assert_eq!(tier(1.0, 4.0), PressureTier::Clean);
        assert_eq!(tier(3.0, 4.0), PressureTier::Hurried);
        assert_eq!(tier(3.5, 4.0), PressureTier::Pressured);
        assert_eq!(tier(0.0, 0.0), PressureTier::Pressured);
        assert!(PressureTier::Pressured.accuracy() < PressureTier::Clean.accuracy());
    }

    #[test]
    fn test_reduction_grows_with_rushers() {
        let config = EngineConfig::default();
        assert!(reduction(0, 1.0, &config).abs() < f32::EPSILON);
        assert!((reduction(1, 0.0, &config) - 0.4).abs() < 1.0e-5);
        assert!((reduction(1, 1.0, &config) - 0.8).abs() < 1.0e-5);
        assert!((reduction(2, 0.0, &config) - 1.0).abs() < 1.0e-5);
        assert!((reduction(3, 1.0, &config) - 2.1).abs() < 1.0e-5);
    }

    #[test]
    fn test_no_pressure_keeps_baseline() {
        let config = EngineConfig::default();
        let next = next_sack_time(4.0, 0, 0.0, 1.0 / 60.0, &config);
        assert!((next - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pressure_cuts_then_recovers() {
        let config = EngineConfig::default();
        let pressured = next_sack_time(4.0, 2, 1.0, 1.0 / 60.0, &config);
        assert!((pressured - 2.2).abs() < 1.0e-4);
        let relieved = next_sack_time(pressured, 0, 0.0, 0.5, &config);
        assert!((relieved - 2.7).abs() < 1.0e-4);
        let mut t = relieved;
        for _ in 0..10 {
            t = next_sack_time(t, 0, 0.0, 0.5, &config);
        }
        assert!((t - config.base_sack_time).abs() < f32::EPSILON);
    }

    #[test]
    fn test_steady_rush_never_lengthens_clock() {
        let config = EngineConfig::default();
        let mut clock = config.base_sack_time;
        let mut ticks = Vec::new();
        for _ in 0..60 {
            clock = next_sack_time(clock, 2, 0.5, 1.0 / 60.0, &config);
            ticks.push(clock);
        }
        assert!(ticks.windows(2).all(|w| w[1] <= w[0]), "{ticks:?}");
        assert!((ticks[59] - ticks[0]).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blocked_rusher_recovers_at_rate() {
        let config = EngineConfig::default();
        let two = next_sack_time(config.base_sack_time, 2, 0.5, 1.0 / 60.0, &config);
        let one = next_sack_time(two, 1, 0.5, 0.25, &config);
        assert!((one - (two + 0.25 * config.sack_recovery_rate)).abs() < 1.0e-5);
        assert!(one <= pressure_target(1, 0.5, &config));
    }

    #[test]
    fn test_floor() {
        let config = EngineConfig::default();
        let target = pressure_target(20, 1.0, &config);
        assert!((target - config.min_sack_time).abs() < f32::EPSILON);
    }

    #[test]
    fn test_proximity() {
        assert!((proximity(POCKET_EDGE) - 1.0).abs() < f32::EPSILON);
        assert!(proximity(50.0).abs() < f32::EPSILON);
        assert!(proximity(f32::INFINITY).abs() < f32::EPSILON);
    }
}
