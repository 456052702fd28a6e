//! # Telemetry
//!
//! Installs the global `tracing` subscriber. Libraries only emit events;
//! binaries call [`init_tracing`] once at startup.

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Builds the filter: `RUST_LOG` wins, otherwise the configured directive.
///
/// An unparsable configured directive falls back to `info`.
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=cartwright=trace` - Show trace for cartwright crates only
/// - Default: `logging.filter` from the config
///
/// Calling this twice is harmless; the second call keeps the first
/// subscriber.
pub fn init_tracing(config: &LoggingConfig) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .with_target(true)
        .try_init()
        .is_ok();

    if !installed {
        debug!("Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
