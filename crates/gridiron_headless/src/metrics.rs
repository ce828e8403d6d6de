//! Play metrics collection for batch evaluation.

use std::collections::HashMap;

use gridiron_core::prelude::*;
use serde::{Deserialize, Serialize};

/// Metrics for a single play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Concept run.
    pub concept: String,
    /// Coverage faced.
    pub coverage: String,
    /// Random seed used.
    pub seed: u64,
    /// How the play ended.
    pub kind: OutcomeKind,
    /// Net yards.
    pub yards: f32,
    /// Seconds from snap to the end of the play.
    pub time: f32,
    /// Ticks run after the snap.
    pub ticks: u64,
    /// Label of the intended receiver.
    pub receiver: Option<String>,
    /// Separation at the catch point.
    pub separation: Option<f32>,
    /// Catch probability rolled against, in percent.
    pub catch_probability: Option<f32>,
    /// Line of scrimmage before the play.
    pub line_of_scrimmage: u8,
    /// Down before the play.
    pub down: u8,
    /// Yards to go before the play.
    pub yards_to_go: u8,
    /// Final state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl PlayMetrics {
    /// Collect metrics from a finished play.
    ///
    /// `before` is the drive as it stood at the snap.
    #[must_use]
    pub fn from_state(scenario: &str, seed: u64, before: &DriveState, state: &GameState) -> Option<Self> {
        let outcome = state.outcome.as_ref()?;
        let receiver = outcome
            .receiver
            .and_then(|id| state.player(id))
            .map(|p| p.label.clone());
        Some(Self {
            scenario: scenario.to_string(),
            concept: state.concept.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            coverage: state.coverage.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
            seed,
            kind: outcome.kind,
            yards: outcome.yards,
            time: outcome.time,
            ticks: state.tick,
            receiver,
            separation: outcome.separation,
            catch_probability: outcome.catch_probability,
            line_of_scrimmage: before.line_of_scrimmage,
            down: before.down,
            yards_to_go: before.yards_to_go,
            final_state_hash: state.state_hash(),
        })
    }
}

/// Metrics for a drive of consecutive plays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriveMetrics {
    /// Plays in order.
    pub plays: Vec<PlayMetrics>,
    /// Result of the last play.
    pub result: Option<DriveResult>,
    /// Net yards over the drive.
    pub total_yards: f32,
    /// First downs earned.
    pub first_downs: u32,
}

impl DriveMetrics {
    /// Record one play and its drive result.
    pub fn record(&mut self, play: PlayMetrics, result: DriveResult) {
        self.total_yards += play.yards;
        if result == DriveResult::FirstDown {
            self.first_downs += 1;
        }
        self.plays.push(play);
        self.result = Some(result);
    }
}

/// Aggregate over many plays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Plays counted.
    pub total_plays: u32,
    /// Completions.
    pub completions: u32,
    /// Incompletions.
    pub incompletions: u32,
    /// Sacks.
    pub sacks: u32,
    /// Interceptions.
    pub interceptions: u32,
    /// Completions per pass attempt.
    pub completion_rate: f64,
    /// Sacks per play.
    pub sack_rate: f64,
    /// Interceptions per pass attempt.
    pub interception_rate: f64,
    /// Mean net yards per play.
    pub avg_yards: f64,
    /// Mean seconds per play.
    pub avg_time: f64,
    /// Targets by receiver label.
    pub targets: HashMap<String, u32>,
    /// Completions by receiver label.
    pub catches: HashMap<String, u32>,
}

fn rate(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(count) / f64::from(total)
    }
}

impl BatchSummary {
    /// Summarize a set of plays.
    #[must_use]
    pub fn from_plays(plays: &[PlayMetrics]) -> Self {
        if plays.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_plays: plays.len() as u32,
            ..Default::default()
        };
        let mut yards = 0.0f64;
        let mut time = 0.0f64;

        for play in plays {
            yards += f64::from(play.yards);
            time += f64::from(play.time);
            match play.kind {
                OutcomeKind::Catch => summary.completions += 1,
                OutcomeKind::Incomplete => summary.incompletions += 1,
                OutcomeKind::Sack => summary.sacks += 1,
                OutcomeKind::Interception => summary.interceptions += 1,
            }
            if let Some(label) = &play.receiver {
                *summary.targets.entry(label.clone()).or_default() += 1;
                if play.kind == OutcomeKind::Catch {
                    *summary.catches.entry(label.clone()).or_default() += 1;
                }
            }
        }

        let attempts = summary.completions + summary.incompletions + summary.interceptions;
        summary.completion_rate = rate(summary.completions, attempts);
        summary.interception_rate = rate(summary.interceptions, attempts);
        summary.sack_rate = rate(summary.sacks, summary.total_plays);
        summary.avg_yards = yards / f64::from(summary.total_plays);
        summary.avg_time = time / f64::from(summary.total_plays);
        summary
    }
}
