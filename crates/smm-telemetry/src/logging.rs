//! Structured logging setup driven by the `[logging]` config section.

use crate::error::{TelemetryError, TelemetryResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Multi-line, human readable.
    #[default]
    Pretty,
    /// One JSON object per event, with span context.
    Json,
    /// Single-line text.
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format. `RUST_ENV=production` forces `json`.
    #[serde(default)]
    pub format: LogFormat,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info,smm=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_filter(),
        }
    }
}

impl LoggingConfig {
    /// Format after applying the `RUST_ENV` override.
    pub fn effective_format(&self, rust_env: Option<&str>) -> LogFormat {
        match rust_env {
            Some("production") => LogFormat::Json,
            _ => self.format,
        }
    }

    /// `RUST_LOG` when set, the configured directives otherwise.
    fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.filter)
                .map_err(|e| TelemetryError::LoggingInit(format!("bad filter {:?}: {e}", self.filter))),
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> TelemetryResult<()> {
    let env_filter = config.env_filter()?;
    let rust_env = std::env::var("RUST_ENV").ok();
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.effective_format(rust_env.as_deref()) {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(true))
            .try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty().with_target(true)).try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
