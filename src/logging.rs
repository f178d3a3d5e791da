//! Logging setup for the runner
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary. Output goes to stderr, filtered by `RUST_LOG` (default
//! `info`).

use crate::error::RunError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber
///
/// Fails if a subscriber is already installed.
pub fn init_logging() -> Result<(), RunError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| RunError::LoggingInit(e.to_string()))
}
