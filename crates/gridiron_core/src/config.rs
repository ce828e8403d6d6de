//! Tunable constants for the play engine.
//!
//! Every number the engine uses lives here so a balance pass only
//! touches one RON file. Defaults reproduce the standard model.

use serde::{Deserialize, Serialize};

use crate::error::{PlayError, Result};

/// Ticks per second of the reference scheduler.
pub const TICK_RATE: u32 = 60;

/// Engine-wide tuning values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Step substituted for invalid `tick` inputs (seconds).
    pub default_step: f32,
    /// Largest step a single tick may take (seconds).
    pub max_step: f32,
    /// Ball-to-target distance that ends a pass (yards).
    pub catch_radius: f32,
    /// Extra reach a receiver has when the ball arrives at its aim point.
    pub catch_reach: f32,
    /// Separation at or under which a defender can undercut the ball.
    pub tackle_radius: f32,
    /// Distance at which a blocker engages a rusher.
    pub block_radius: f32,
    /// Ball speed on a clean throw (yd/s).
    pub throw_speed: f32,
    /// Longest a pass may stay in the air before falling incomplete.
    pub max_flight_time: f32,
    /// Chance a contested ball is intercepted rather than broken up.
    pub interception_chance: f32,
    /// Sack-time baseline before pressure (seconds).
    pub base_sack_time: f32,
    /// Lowest the sack time can be driven by pressure.
    pub min_sack_time: f32,
    /// Sack-time recovery per second when no rusher is free.
    pub sack_recovery_rate: f32,
    /// Reduction range for a single unblocked rusher (seconds).
    pub single_rusher_reduction: (f32, f32),
    /// Reduction range for two or more unblocked rushers (seconds).
    pub multi_rusher_reduction: (f32, f32),
    /// Additional reduction for each rusher beyond the second.
    pub extra_rusher_reduction: f32,
    /// Loss applied on a sack when the quarterback is not behind the line.
    pub default_sack_loss: f32,
    /// Largest loss a sack can produce.
    pub max_sack_loss: f32,
    /// Rusher speed multiplier.
    pub blitz_speed_bonus: f32,
    /// Speed multiplier while backpedaling.
    pub backpedal_multiplier: f32,
    /// Speed multiplier during the transition recovery window.
    pub transition_multiplier: f32,
    /// Length of the transition recovery window (seconds).
    pub transition_window: f32,
    /// Receiver distance beyond which a man defender stays in his pedal.
    pub backpedal_distance: f32,
    /// Direction change (radians) that triggers a transition.
    pub transition_angle: f32,
    /// Speed multiplier granted at the snap after motion.
    pub motion_boost: f32,
    /// Speed multiplier for jet and fly motion.
    pub fast_motion_boost: f32,
    /// How long the motion boost lasts (seconds).
    pub motion_boost_duration: f32,
    /// Motion pace (yd/s).
    pub motion_speed: f32,
    /// Audibles, hot routes and sight adjustments allowed per play.
    pub max_audibles: u8,
    /// Route depth that flips a quarters defender from zone to man.
    pub man_only_deep_depth: f32,
    /// Relative jitter applied to top speeds at the snap.
    pub speed_jitter: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_step: 1.0 / TICK_RATE as f32,
            max_step: 0.1,
            catch_radius: 1.0,
            catch_reach: 1.0,
            tackle_radius: 1.0,
            block_radius: 1.5,
            throw_speed: 22.0,
            max_flight_time: 4.0,
            interception_chance: 0.3,
            base_sack_time: 4.0,
            min_sack_time: 0.5,
            sack_recovery_rate: 1.0,
            single_rusher_reduction: (0.4, 0.8),
            multi_rusher_reduction: (1.0, 1.8),
            extra_rusher_reduction: 0.3,
            default_sack_loss: 7.0,
            max_sack_loss: 15.0,
            blitz_speed_bonus: 1.1,
            backpedal_multiplier: 0.75,
            transition_multiplier: 0.6,
            transition_window: 0.25,
            backpedal_distance: 5.0,
            transition_angle: std::f32::consts::FRAC_PI_3,
            motion_boost: 1.15,
            fast_motion_boost: 1.2,
            motion_boost_duration: 1.0,
            motion_speed: 7.0,
            max_audibles: 3,
            man_only_deep_depth: 8.0,
            speed_jitter: 0.03,
        }
    }
}

impl EngineConfig {
    /// Load a configuration from RON. Missing fields take their defaults.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self = ron::from_str(ron).map_err(|e| PlayError::DataParseError {
            kind: "config",
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every radius, speed and time is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("default_step", self.default_step),
            ("max_step", self.max_step),
            ("catch_radius", self.catch_radius),
            ("tackle_radius", self.tackle_radius),
            ("block_radius", self.block_radius),
            ("throw_speed", self.throw_speed),
            ("max_flight_time", self.max_flight_time),
            ("base_sack_time", self.base_sack_time),
            ("min_sack_time", self.min_sack_time),
            ("motion_speed", self.motion_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlayError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.min_sack_time > self.base_sack_time {
            return Err(PlayError::InvalidConfig(
                "min_sack_time exceeds base_sack_time".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.interception_chance) {
            return Err(PlayError::InvalidConfig(format!(
                "interception_chance must be within 0..=1, got {}",
                self.interception_chance
            )));
        }
        if self.default_step > self.max_step {
            return Err(PlayError::InvalidConfig(
                "default_step exceeds max_step".to_string(),
            ));
        }
        Ok(())
    }

    /// Substitute a safe step for invalid tick input.
    ///
    /// A zero step counts as invalid so stepping loops always progress.
    #[must_use]
    pub fn sanitize_step(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            return self.default_step;
        }
        dt.min(self.max_step)
    }
}
