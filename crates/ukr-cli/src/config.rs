//! `ukr config` command implementation.
//!
//! ```text
//! # Validate a settings file
//! ukr config check ukr.toml
//!
//! # Machine-readable effective settings
//! ukr config check ukr.toml --json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use ukr_registrar::RegistrarSettings;
use ukr_telemetry::TelemetryConfig;

use crate::settings_file::LoadedSettings;

/// Arguments for the `ukr config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate a settings file and print the effective settings.
    Check(CheckArgs),
}

/// Arguments for the `ukr config check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Settings file (TOML).
    pub file: PathBuf,

    /// Output JSON instead of human-readable format.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    status: &'static str,
    file: String,
    settings: &'a RegistrarSettings,
    telemetry: &'a TelemetryConfig,
}

/// Run the config command.
pub fn run(args: ConfigArgs, log_level: Option<&str>) -> Result<()> {
    match args.command {
        ConfigCommands::Check(check_args) => run_check(&check_args, log_level),
    }
}

fn run_check(args: &CheckArgs, log_level: Option<&str>) -> Result<()> {
    crate::init_logging(TelemetryConfig::new("ukr").with_log_level("warn"), log_level)?;

    let loaded = LoadedSettings::load(&args.file)?;
    tracing::debug!(file = %args.file.display(), "settings validated");

    let report = CheckReport {
        status: "ok",
        file: args.file.display().to_string(),
        settings: &loaded.settings,
        telemetry: &loaded.telemetry,
    };

    if args.json {
        let payload =
            serde_json::to_string_pretty(&report).context("failed to serialize settings")?;
        println!("{payload}");
        return Ok(());
    }

    let settings = report.settings;
    let policy = &settings.policy;
    println!("Settings OK: {}", report.file);
    println!();
    println!("Token:       {}", settings.token);
    println!("Owner:       {}", settings.owner);
    println!("Registrar:   {}", settings.registrar);
    println!("Min payment: {}", settings.min_payment);
    println!();
    println!("Policy:");
    println!("  auto_approve_enabled: {}", policy.auto_approve_enabled);
    println!("  window_size_blocks:   {}", policy.window_size_blocks);
    println!("  approval_threshold:   {}", policy.approval_threshold);
    println!("  registry_target:      {}", policy.registry_target);
    if !policy.auto_approve_enabled {
        println!("  (auto-approval off: every registration waits for manual approval)");
    } else if policy.approval_threshold == 0 {
        println!("  (zero threshold: nothing is auto-approved)");
    }
    println!();
    println!("Telemetry:");
    println!("  log_level: {}", report.telemetry.log_level);
    println!("  json_logs: {}", report.telemetry.json_logs);

    Ok(())
}
