//! Tracing configuration for test output.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize tracing for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Uses `RUST_LOG` if set, otherwise `info` with debug output for the gate.
///
/// # Example
///
/// ```rust
/// use ukr_testkit::init_test_tracing;
///
/// init_test_tracing();
/// init_test_tracing();
/// ```
pub fn init_test_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,ukr_registrar=debug"));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_ansi(true)
                    .compact(),
            )
            .try_init();
    });
}

/// Initialize silent tracing (suppresses all output).
///
/// Useful for tests that intentionally trigger errors and don't want log noise.
pub fn init_test_tracing_silent() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new("off"))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}
