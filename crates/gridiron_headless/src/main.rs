//! Headless play runner.
//!
//! Runs plays without graphics: single plays, drives, seeded batches,
//! determinism checks and an interactive JSON lines session.
//!
//! # Usage
//!
//! ```bash
//! # One play, quarterback throws to the most open receiver
//! cargo run -p gridiron_headless -- run --concept smash --coverage cover-2
//!
//! # Hold the ball (sack test)
//! cargo run -p gridiron_headless -- run --no-throw
//!
//! # A drive from a scenario file
//! cargo run -p gridiron_headless -- drive --scenario scenarios/two_minute.ron
//!
//! # Batch of 1000 seeds written to results/
//! cargo run -p gridiron_headless -- batch --count 1000 --output results/
//!
//! # Determinism
//! cargo run -p gridiron_headless -- verify --seed 12345 --runs 5
//! ```
//!
//! Logs go to stderr (`RUST_LOG` overrides `--verbose`); stdout carries
//! JSON lines only.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gridiron_core::prelude::*;
use std::result::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gridiron_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    protocol::Response,
    runner::{PlayRunner, DEFAULT_MAX_PLAYS},
    scenario::{Scenario, ThrowPlan},
    session::Session,
};

#[derive(Parser)]
#[command(name = "gridiron_headless")]
#[command(about = "Headless passing-play runner for evaluation and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum HashArg {
    Left,
    Middle,
    Right,
}

impl From<HashArg> for HashMark {
    fn from(hash: HashArg) -> Self {
        match hash {
            HashArg::Left => HashMark::Left,
            HashArg::Middle => HashMark::Middle,
            HashArg::Right => HashMark::Right,
        }
    }
}

/// Matchup options shared by every subcommand.
#[derive(Args, Clone, Default)]
struct MatchupArgs {
    /// Scenario file; flags below override its fields
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Concept name
    #[arg(long)]
    concept: Option<String>,

    /// Coverage name
    #[arg(long)]
    coverage: Option<String>,

    /// Line of scrimmage (yards from own goal line)
    #[arg(long)]
    los: Option<i32>,

    /// Hash mark
    #[arg(long, value_enum)]
    hash: Option<HashArg>,

    /// Personnel code ("11", "12", ...)
    #[arg(long)]
    personnel: Option<String>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Never throw; the play ends in a sack
    #[arg(long)]
    no_throw: bool,
}

impl MatchupArgs {
    fn scenario(&self) -> Result<Scenario, String> {
        let mut scenario = match &self.scenario {
            Some(path) => Scenario::load(path).map_err(|e| e.to_string())?,
            None => Scenario::default(),
        };
        if let Some(concept) = &self.concept {
            scenario.concept.clone_from(concept);
        }
        if let Some(coverage) = &self.coverage {
            scenario.coverage.clone_from(coverage);
        }
        if let Some(los) = self.los {
            scenario.line_of_scrimmage = los;
        }
        if let Some(hash) = self.hash {
            scenario.hash = hash.into();
        }
        if self.personnel.is_some() {
            scenario.personnel.clone_from(&self.personnel);
        }
        if let Some(seed) = self.seed {
            scenario.seed = seed;
        }
        if self.no_throw {
            scenario.throw_plan = ThrowPlan::Never;
        }
        Ok(scenario)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single play
    Run {
        #[command(flatten)]
        matchup: MatchupArgs,

        /// Write a bincode recording of the play
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Run plays until the drive ends
    Drive {
        #[command(flatten)]
        matchup: MatchupArgs,

        /// Stop after this many plays
        #[arg(long, default_value_t = DEFAULT_MAX_PLAYS)]
        max_plays: u32,
    },

    /// Run a batch of seeds in parallel
    Batch {
        #[command(flatten)]
        matchup: MatchupArgs,

        /// Number of plays to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel plays (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        #[command(flatten)]
        matchup: MatchupArgs,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Re-execute a recorded play and check its final hash
    Replay {
        /// Recording file path
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Interactive JSON lines session on stdin/stdout
    Session {
        #[command(flatten)]
        matchup: MatchupArgs,

        /// Output state after every command
        #[arg(long)]
        auto_state: bool,
    },
}

fn emit(response: &Response) {
    print!("{}", response.to_json_line());
}

fn fail(message: impl Into<String>) -> ExitCode {
    let message = message.into();
    tracing::error!(%message, "Command failed");
    emit(&Response::error(message, None));
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr; stdout is for JSON
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Some(Commands::Run { matchup, record }) => cmd_run(&matchup, record),
        Some(Commands::Drive { matchup, max_plays }) => cmd_drive(&matchup, max_plays),
        Some(Commands::Batch {
            matchup,
            count,
            parallel,
            output,
        }) => cmd_batch(&matchup, count, parallel, output),
        Some(Commands::Verify { matchup, runs }) => cmd_verify(&matchup, runs),
        Some(Commands::Replay { file }) => cmd_replay(&file),
        Some(Commands::Session {
            matchup,
            auto_state,
        }) => cmd_session(&matchup, auto_state),
        None => cmd_session(&MatchupArgs::default(), false),
    }
}

fn cmd_run(matchup: &MatchupArgs, record: Option<PathBuf>) -> ExitCode {
    let scenario = match matchup.scenario() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let mut runner = match PlayRunner::from_scenario(&scenario) {
        Ok(r) => r,
        Err(e) => return fail(e.to_string()),
    };
    if record.is_some() {
        if let Err(e) = runner.start_recording() {
            return fail(e.to_string());
        }
    }
    let play = match runner.run_play() {
        Ok(play) => play,
        Err(e) => return fail(e.to_string()),
    };
    tracing::info!(kind = ?play.kind, yards = play.yards, time = play.time, "Play complete");

    if let Some(path) = record {
        let Some(recording) = runner.take_recording() else {
            return fail("recording was not started");
        };
        let written = recording
            .to_bytes()
            .map_err(|e| e.to_string())
            .and_then(|bytes| std::fs::write(&path, bytes).map_err(|e| e.to_string()));
        if let Err(e) = written {
            return fail(format!("Failed to write recording '{}': {e}", path.display()));
        }
        tracing::info!(path = %path.display(), "Recording saved");
    }

    emit(&Response::Play { play });
    ExitCode::SUCCESS
}

fn cmd_drive(matchup: &MatchupArgs, max_plays: u32) -> ExitCode {
    let scenario = match matchup.scenario() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let drive = PlayRunner::from_scenario(&scenario).and_then(|mut r| r.run_drive(max_plays));
    match drive {
        Ok(drive) => {
            for play in &drive.plays {
                emit(&Response::Play { play: play.clone() });
            }
            emit(&Response::Drive { drive });
            ExitCode::SUCCESS
        }
        Err(e) => fail(e.to_string()),
    }
}

fn cmd_batch(matchup: &MatchupArgs, count: u32, parallel: u32, output: Option<PathBuf>) -> ExitCode {
    let scenario = match matchup.scenario() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let seed_start = scenario.seed;
    let mut config = BatchConfig::new(scenario, count).with_seed(seed_start);
    config.parallel_plays = parallel;
    if let Some(dir) = &output {
        config.output_dir.clone_from(dir);
    }

    let results = run_batch(config);
    tracing::info!(
        plays = results.plays.len(),
        errors = results.errors.len(),
        completion_rate = results.summary.completion_rate,
        sack_rate = results.summary.sack_rate,
        avg_yards = results.summary.avg_yards,
        "Batch finished"
    );

    if let Some(dir) = output {
        let path = dir.join("batch_results.json");
        if let Err(e) = results.save(&path) {
            return fail(format!("Failed to save results '{}': {e}", path.display()));
        }
        tracing::info!(path = %path.display(), "Results saved");
    }

    emit(&Response::Batch {
        summary: results.summary,
        errors: results.errors.len(),
    });
    ExitCode::SUCCESS
}

fn cmd_verify(matchup: &MatchupArgs, runs: u32) -> ExitCode {
    let scenario = match matchup.scenario() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    match verify_determinism(&scenario, runs) {
        Ok(report) => {
            let deterministic = report.deterministic;
            emit(&Response::Verify { report });
            if deterministic {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => fail(e.to_string()),
    }
}

fn cmd_replay(file: &Path) -> ExitCode {
    let bytes = match std::fs::read(file) {
        Ok(bytes) => bytes,
        Err(e) => return fail(format!("Failed to read '{}': {e}", file.display())),
    };
    let verified = PlayRecording::from_bytes(&bytes)
        .and_then(RecordingPlayer::new)
        .and_then(|mut player| {
            let hash = player.verify()?;
            Ok((player.engine().state().tick, hash))
        });
    match verified {
        Ok((tick, hash)) => {
            emit(&Response::StateHash { tick, hash });
            ExitCode::SUCCESS
        }
        Err(e) => fail(e.to_string()),
    }
}

fn cmd_session(matchup: &MatchupArgs, auto_state: bool) -> ExitCode {
    let scenario = match matchup.scenario() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let mut session = match Session::from_scenario(&scenario, auto_state) {
        Ok(s) => s,
        Err(e) => return fail(e.to_string()),
    };
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    match session.serve(stdin.lock(), stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Session IO failed");
            ExitCode::FAILURE
        }
    }
}
