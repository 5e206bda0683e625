//! # Chain Telemetry
//!
//! Tracing initialization for Ferrite-Chain services.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chain_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(&config).expect("failed to init telemetry");
//!     // spans and events now flow to the configured subscriber
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FC_LOG_LEVEL` | `info` | Log level filter (EnvFilter syntax) |
//! | `FC_LOG_JSON` | `false` | JSON output for containers/production |

#![warn(missing_docs)]
#![warn(clippy::all)]

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry initialization failure.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Subscriber could not be installed (typically already set).
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Telemetry configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log level filter in `EnvFilter` syntax.
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Build a configuration from `FC_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: std::env::var("FC_LOG_LEVEL").unwrap_or(defaults.log_level),
            json_logs: std::env::var("FC_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.json_logs),
        }
    }
}

/// Guard returned by [`init_telemetry`]; keeps the subscriber installed
/// for the life of the process.
pub struct TelemetryGuard {
    _private: (),
}

/// Install the global tracing subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_ansi(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;
    }

    tracing::info!(level = %config.log_level, json = config.json_logs, "telemetry initialized");
    Ok(TelemetryGuard { _private: () })
}
