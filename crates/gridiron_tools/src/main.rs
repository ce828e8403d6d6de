//! Gridiron - Development Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gridiron_core::data::Playbook;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gridiron-tools")]
#[command(about = "Development tools for the gridiron play simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate playbook data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "assets/playbook")]
        path: PathBuf,
    },
    /// Write the built-in playbook as RON
    ExportStandard {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating playbook files in: {}", path.display());
            match gridiron_tools::validate::validate_data_directory(&path) {
                Ok(report) if report.is_ok() => {
                    tracing::info!(files = report.passed.len(), "Validation passed");
                }
                Ok(report) => {
                    tracing::error!(
                        passed = report.passed.len(),
                        failed = report.failures.len(),
                        "Validation failed"
                    );
                    std::process::exit(1);
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::ExportStandard { output } => {
            let ron = match Playbook::standard().to_ron_string() {
                Ok(ron) => ron,
                Err(e) => {
                    tracing::error!("Export failed: {e}");
                    std::process::exit(1);
                }
            };
            match output {
                Some(path) => {
                    if let Err(e) = std::fs::write(&path, ron) {
                        tracing::error!("Failed to write {}: {e}", path.display());
                        std::process::exit(1);
                    }
                    tracing::info!("Wrote {}", path.display());
                }
                None => println!("{ron}"),
            }
        }
    }
}
