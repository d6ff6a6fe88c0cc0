//! `ukr` operator CLI entrypoint.
//!
//! - `ukr config check` - validate a settings file and show the effective policy
//! - `ukr simulate` - drive registrations through an in-memory gate and registry

#![forbid(unsafe_code)]

mod config;
mod settings_file;
mod simulate;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ukr_telemetry::{TelemetryConfig, init_telemetry};

/// Upkeep registration gate operator CLI.
#[derive(Parser)]
#[command(name = "ukr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level filter; overrides the settings file. `RUST_LOG` wins over both.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Settings file operations.
    Config(config::ConfigArgs),

    /// Simulate registrations against an in-memory registry.
    ///
    /// Sends N paid registrations through the token, advancing the block
    /// clock between them, and reports outcomes and the event log.
    ///
    /// Example: ukr simulate --config ukr.toml --requests 20 --blocks-per-request 50
    Simulate(simulate::SimulateArgs),
}

/// Install the global subscriber. Logs go to stderr so stdout is clean for
/// JSON output.
fn init_logging(mut config: TelemetryConfig, level_override: Option<&str>) -> anyhow::Result<()> {
    if let Some(level) = level_override {
        config.log_level = level.to_string();
    }
    init_telemetry(&config).context("failed to initialize logging")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = cli.log_level.as_deref();

    match cli.command {
        Commands::Config(args) => config::run(args, level),
        Commands::Simulate(args) => simulate::run(&args, level),
    }
}
