//! `ukr simulate` command implementation.
//!
//! Builds a gate from a settings file, wires it to an in-memory token and
//! registry, and sends a series of paid registrations through
//! transfer-and-call. The block clock advances by a fixed step after every
//! request, so the window throttle can be observed end to end.
//!
//! ```text
//! ukr simulate --config ukr.toml --requests 12 --blocks-per-request 100 --json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use ukr_core::{Address, ManualBlockClock, RegistrationPayload, TimeSource};
use ukr_registrar::{
    AdmissionGate, InMemoryUpkeepRegistry, PaymentToken, RegistrationConfigSnapshot,
    RegistrationOutcome, TokenError,
};
use ukr_telemetry::redact_sensitive;

use crate::settings_file::LoadedSettings;

/// Arguments for the `ukr simulate` command.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Settings file (TOML).
    #[arg(long, short = 'c')]
    pub config: PathBuf,

    /// Number of registrations to send.
    #[arg(long, short = 'n', default_value_t = 10)]
    pub requests: u64,

    /// Blocks the clock advances after each registration.
    #[arg(long, short = 'b', default_value_t = 1)]
    pub blocks_per_request: u64,

    /// Block height of the first registration.
    #[arg(long, default_value_t = 0)]
    pub start_block: u64,

    /// Amount paid per registration (defaults to the minimum payment).
    #[arg(long)]
    pub amount: Option<u128>,

    /// Output JSON instead of human-readable format.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// One registration attempt and what became of it.
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum Attempt {
    Accepted {
        block: u64,
        #[serde(flatten)]
        outcome: RegistrationOutcome,
    },
    Rejected {
        block: u64,
        code: String,
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    requests: u64,
    approved: usize,
    pending: usize,
    rejected: usize,
    upkeep_count: u64,
    final_block: u64,
    registration_config: RegistrationConfigSnapshot,
    attempts: Vec<Attempt>,
    events: Vec<serde_json::Value>,
}

/// Run the simulate command.
pub fn run(args: &SimulateArgs, log_level: Option<&str>) -> Result<()> {
    let loaded = LoadedSettings::load(&args.config)?;
    crate::init_logging(loaded.telemetry.clone(), log_level)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?;
    let report = runtime.block_on(simulate(args, &loaded))?;

    output_report(&report, args.json)
}

async fn simulate(args: &SimulateArgs, loaded: &LoadedSettings) -> Result<SimulationReport> {
    let settings = &loaded.settings;
    let amount = args.amount.unwrap_or(settings.min_payment);

    let clock = Arc::new(ManualBlockClock::new(args.start_block));
    let registry = Arc::new(InMemoryUpkeepRegistry::new(settings.policy.registry_target));
    registry.set_registrar(settings.registrar);
    let gate = AdmissionGate::from_settings(settings, clock.clone()).with_registry(registry.clone());

    let token = PaymentToken::new(settings.token);
    let sender = Address::from_label("simulated-sender");
    let funds = amount
        .checked_mul(u128::from(args.requests))
        .context("amount times requests overflows")?;
    token.mint(sender, funds).context("failed to fund sender")?;

    tracing::info!(
        requests = args.requests,
        blocks_per_request = args.blocks_per_request,
        amount = %amount,
        "simulation started"
    );

    let mut attempts = Vec::new();
    for i in 0..args.requests {
        let block = clock.current_unit();
        let payload = RegistrationPayload {
            name: format!("sim-upkeep-{i}"),
            check_data: i.to_be_bytes().to_vec(),
            target: Address::from_label("simulated-target"),
            execute_gas: 500_000,
            admin: sender,
            admin_extra_info: b"operator@example.com".to_vec(),
            source: 0,
        };
        let data = payload.encode().context("failed to encode payload")?;

        match token.transfer_and_call(sender, &gate, amount, &data).await {
            Ok(outcome) => attempts.push(Attempt::Accepted { block, outcome }),
            Err(TokenError::Rejected(err)) => attempts.push(Attempt::Rejected {
                block,
                code: err.code().to_string(),
                message: err.to_string(),
            }),
            Err(err) => bail!("payment for request {i} failed: {err}"),
        }

        clock.advance(args.blocks_per_request);
    }

    let approved = attempts
        .iter()
        .filter(|a| matches!(a, Attempt::Accepted { outcome, .. } if outcome.is_approved()))
        .count();
    let rejected = attempts
        .iter()
        .filter(|a| matches!(a, Attempt::Rejected { .. }))
        .count();

    let redact = &loaded.telemetry.redact_fields;
    let events = gate
        .events()
        .await
        .iter()
        .map(|record| serde_json::to_value(record).map(|v| redact_sensitive(&v, redact)))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to serialize events")?;

    Ok(SimulationReport {
        requests: args.requests,
        approved,
        pending: gate.pending_count().await,
        rejected,
        upkeep_count: registry.count(),
        final_block: clock.current_unit(),
        registration_config: gate.registration_config().await,
        attempts,
        events,
    })
}

fn output_report(report: &SimulationReport, json: bool) -> Result<()> {
    if json {
        let payload =
            serde_json::to_string_pretty(report).context("failed to serialize simulation report")?;
        println!("{payload}");
        return Ok(());
    }

    let throttle = &report.registration_config.throttle;
    println!("Requests:     {}", report.requests);
    println!("Approved:     {}", report.approved);
    println!("Pending:      {}", report.pending);
    println!("Rejected:     {}", report.rejected);
    println!("Upkeeps:      {}", report.upkeep_count);
    println!("Final block:  {}", report.final_block);
    println!(
        "Window:       start {} / {} of {} used / ends at {}",
        throttle.window_start, throttle.approvals_in_window, throttle.threshold, throttle.window_ends_at
    );

    println!();
    println!("Attempts:");
    for (i, attempt) in report.attempts.iter().enumerate() {
        match attempt {
            Attempt::Accepted { block, outcome } => match outcome {
                RegistrationOutcome::Approved { id, upkeep_id } => {
                    println!("  {i:>4} @{block:<8} approved  {id} -> upkeep {upkeep_id}");
                }
                RegistrationOutcome::Pending { id, reason } => {
                    println!("  {i:>4} @{block:<8} pending   {id} ({reason:?})");
                }
            },
            Attempt::Rejected {
                block,
                code,
                message,
            } => println!("  {i:>4} @{block:<8} rejected  {code}: {message}"),
        }
    }

    println!();
    println!("Events: {}", report.events.len());
    for event in &report.events {
        println!(
            "  #{:<4} {:<24} {}",
            event["seq"],
            event["event"]["event"].as_str().unwrap_or("?"),
            event["event"]["id"].as_str().unwrap_or("")
        );
    }

    Ok(())
}
