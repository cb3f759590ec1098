//! Application configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use smm_executor::PaperConfig;
use smm_feed::PollerConfig;
use smm_mm::MakerConfig;
use smm_telemetry::LoggingConfig;
use std::path::Path;

/// Market data polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// REST base URL of the candle source.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the venue candles come from. Informational.
    #[serde(default = "default_candle_exchange")]
    pub candle_exchange: String,
    /// Kline interval. Default: "1m".
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Poll period (ms). Default: 5,000.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Klines requested per poll (1..=1000). Default: 100.
    #[serde(default = "default_kline_limit")]
    pub kline_limit: u16,
}

fn default_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_candle_exchange() -> String {
    "binance".to_string()
}

fn default_interval() -> String {
    "1m".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_kline_limit() -> u16 {
    100
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            candle_exchange: default_candle_exchange(),
            interval: default_interval(),
            poll_interval_ms: default_poll_interval_ms(),
            kline_limit: default_kline_limit(),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Serve `/metrics` and `/status`. Default: true.
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,
    /// HTTP port for the diagnostics server. Default: 9090.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    /// How often the status report is logged (secs). 0 disables. Default: 60.
    #[serde(default = "default_status_log_interval_secs")]
    pub status_log_interval_secs: u64,
}

fn default_telemetry_enabled() -> bool {
    true
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_status_log_interval_secs() -> u64 {
    60
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            metrics_port: default_metrics_port(),
            status_log_interval_secs: default_status_log_interval_secs(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Quoting parameters.
    #[serde(default)]
    pub maker: MakerConfig,
    /// Paper account.
    #[serde(default)]
    pub exchange: PaperConfig,
    /// Market data source.
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Log format and default filter.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Outer loop period (ms). Default: 1,000.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

impl AppConfig {
    /// Load from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject inconsistent settings.
    pub fn validate(&self) -> AppResult<()> {
        self.maker
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        self.exchange.validate()?;

        if self.tick_interval_ms == 0 {
            return Err(AppError::Config("tick_interval_ms must be positive".to_string()));
        }
        if self.feed.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "feed.poll_interval_ms must be positive".to_string(),
            ));
        }
        if !(1..=1000).contains(&self.feed.kline_limit) {
            return Err(AppError::Config(format!(
                "feed.kline_limit must be in 1..=1000, got {}",
                self.feed.kline_limit
            )));
        }
        Ok(())
    }

    /// Poller settings for the configured pair.
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            symbol: self.maker.trading_pair.exchange_symbol(),
            interval: self.feed.interval.clone(),
            kline_limit: self.feed.kline_limit,
            poll_interval_ms: self.feed.poll_interval_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval_ms, 1_000);
        assert_eq!(config.maker.order_refresh_interval_ms, 15_000);
        assert_eq!(config.poller_config().symbol, "ETHUSDT");
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.feed.interval, "1m");
        assert_eq!(config.exchange.name, "binance_paper_trade");
        assert!(config.telemetry.enabled);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_logging_section() {
        let config = AppConfig::from_toml(
            r#"
            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.format, smm_telemetry::LogFormat::Json);
        assert_eq!(config.logging.filter, "info,smm=debug");

        assert!(AppConfig::from_toml(r#"[logging]
format = "xml""#).is_err());
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            tick_interval_ms = 500

            [maker]
            trading_pair = "BTC-USDT"
            base_order_amount = "0.001"

            [exchange.initial_balances]
            BTC = "0.1"
            USDT = "5000"

            [feed]
            poll_interval_ms = 2000
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.maker.trading_pair.base(), "BTC");
        assert_eq!(config.maker.base_order_amount, dec!(0.001));
        assert_eq!(config.exchange.initial_balances.get("BTC"), Some(&dec!(0.1)));
        assert_eq!(config.feed.poll_interval_ms, 2000);
        assert_eq!(config.feed.kline_limit, 100);
        assert_eq!(config.poller_config().symbol, "BTCUSDT");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = AppConfig::from_toml(
            r#"
            [maker]
            min_spread = "0.01"
            max_spread = "0.005"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        assert!(AppConfig::from_toml("tick_interval_ms = 0").is_err());
        assert!(AppConfig::from_toml("[feed]\nkline_limit = 0").is_err());
        assert!(AppConfig::from_toml("[exchange]\nlot_size = \"0\"").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("tick_interval_ms"));
        assert!(toml_str.contains("[maker]"));

        let back = AppConfig::from_toml(&toml_str).unwrap();
        assert_eq!(back.maker.trading_pair, config.maker.trading_pair);
    }
}
