//! Settings file shared by all subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use ukr_registrar::RegistrarSettings;
use ukr_telemetry::TelemetryConfig;

/// The optional `[telemetry]` table of a settings file.
#[derive(Debug, Default, Deserialize)]
struct TelemetrySection {
    #[serde(default)]
    telemetry: TelemetryConfig,
}

/// Gate settings plus logging settings from one file.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: RegistrarSettings,
    pub telemetry: TelemetryConfig,
}

impl LoadedSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let settings = RegistrarSettings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?;

        let input = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let section: TelemetrySection =
            toml::from_str(&input).context("invalid [telemetry] table")?;

        Ok(Self {
            settings,
            telemetry: section.telemetry,
        })
    }
}
