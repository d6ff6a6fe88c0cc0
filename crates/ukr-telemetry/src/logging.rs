//! Structured logging with JSON output and sensitive data redaction.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for machine-readable command output.
pub(crate) fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config.json_logs {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);

        subscriber
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let pretty_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);

        subscriber
            .with(pretty_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Redact sensitive fields from a JSON value.
///
/// A key is redacted when it contains any of `fields`, case-insensitively.
#[must_use]
pub fn redact_sensitive(value: &serde_json::Value, fields: &[String]) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (key, val) in map {
                if fields
                    .iter()
                    .any(|f| key.to_lowercase().contains(&f.to_lowercase()))
                {
                    result.insert(
                        key.clone(),
                        serde_json::Value::String("[REDACTED]".to_string()),
                    );
                } else {
                    result.insert(key.clone(), redact_sensitive(val, fields));
                }
            }
            serde_json::Value::Object(result)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(|v| redact_sensitive(v, fields)).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redact_sensitive() {
        let value = json!({
            "event": "RegistrationRequested",
            "admin_extra_info": "0x656d61696c",
            "nested": {
                "api_key": "key-abc",
                "name": "SampleUpkeep"
            },
            "list": [{"Secret": "s"}, {"source": 100}]
        });

        let redacted = redact_sensitive(&value, &TelemetryConfig::default().redact_fields);

        assert_eq!(redacted["event"], "RegistrationRequested");
        assert_eq!(redacted["admin_extra_info"], "[REDACTED]");
        assert_eq!(redacted["nested"]["api_key"], "[REDACTED]");
        assert_eq!(redacted["nested"]["name"], "SampleUpkeep");
        assert_eq!(redacted["list"][0]["Secret"], "[REDACTED]");
        assert_eq!(redacted["list"][1]["source"], 100);
    }

    #[test]
    fn test_redact_leaves_scalars() {
        let value = json!("plain");
        assert_eq!(redact_sensitive(&value, &["plain".to_string()]), value);
    }
}
