//! # Telemetry
//!
//! Process-wide tracing subscriber setup.

use crate::config::TelemetryConfig;
use crate::error::{Error, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` directives take precedence; otherwise the configured level
/// applies. Output is JSON lines or plain text per `config.json`.
///
/// # Errors
///
/// Returns `Error::Telemetry` if a global subscriber is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(config.level).into())
        .from_env_lossy();

    let installed = if config.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    installed.map_err(|e| Error::Telemetry {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_second_init_fails() {
        let config = TelemetryConfig {
            level: LogLevel::Debug,
            json: false,
        };
        let _ = init_tracing(&config);
        let err = init_tracing(&TelemetryConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Telemetry { .. }));
    }
}
