//! UKR Telemetry - structured logging for registrar binaries
//!
//! - **Structured Logging**: JSON or human-readable output on stderr
//! - **Filtering**: `RUST_LOG` wins over the configured level
//! - **Redaction**: scrub admin contact data and secrets before logging payloads
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ukr_telemetry::{TelemetryConfig, init_telemetry};
//!
//! init_telemetry(&TelemetryConfig::new("ukr").with_json_logs(false))?;
//! tracing::info!(request_id = %id, "registration received");
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod logging;

pub use logging::*;

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Configuration installed by the first successful [`init_telemetry`].
static TELEMETRY: OnceLock<TelemetryConfig> = OnceLock::new();

/// Configuration for telemetry initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every log line.
    pub service_name: String,

    /// Log level filter (e.g., "info", "debug", "ukr_registrar=trace").
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,

    /// Fields redacted by [`redact_sensitive`].
    pub redact_fields: Vec<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "ukr".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            redact_fields: vec![
                "admin_extra_info".to_string(),
                "password".to_string(),
                "secret".to_string(),
                "api_key".to_string(),
            ],
        }
    }
}

impl TelemetryConfig {
    /// Create a new configuration with the given service name.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable or disable JSON logs.
    #[must_use]
    pub const fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Add fields to redact from logs.
    #[must_use]
    pub fn with_redact_fields(mut self, fields: Vec<String>) -> Self {
        self.redact_fields.extend(fields);
        self
    }
}

/// Initialize the logging subsystem.
///
/// Call once at startup.
///
/// # Errors
///
/// Returns `TelemetryError::AlreadyInitialized` on a second call, or
/// `TelemetryError::LoggingInit` if a global subscriber was installed elsewhere.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    if TELEMETRY.get().is_some() {
        return Err(TelemetryError::AlreadyInitialized);
    }

    init_logging(config)?;
    let _ = TELEMETRY.set(config.clone());

    tracing::debug!(service = %config.service_name, level = %config.log_level, "telemetry initialized");
    Ok(())
}

/// Configuration passed to the first successful [`init_telemetry`], if any.
#[must_use]
pub fn active_config() -> Option<&'static TelemetryConfig> {
    TELEMETRY.get()
}

/// Telemetry error type.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// `init_telemetry` was already called.
    #[error("Telemetry already initialized")]
    AlreadyInitialized,
}
