//! Market making configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smm_core::{CoreError, TradingPair};
use smm_feed::WindowConfig;

use crate::connector::PriceType;

/// Market making configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerConfig {
    /// Pair to quote, `BASE-QUOTE`.
    #[serde(default = "default_trading_pair")]
    pub trading_pair: TradingPair,

    /// Which book price the quotes are centred on.
    #[serde(default)]
    pub price_type: PriceType,

    /// Half-spread before the volatility term, as a fraction of the reference price.
    #[serde(default = "default_base_spread")]
    pub base_spread: Decimal,

    /// Lower clamp on the half-spread.
    #[serde(default = "default_min_spread")]
    pub min_spread: Decimal,

    /// Upper clamp on the half-spread.
    #[serde(default = "default_max_spread")]
    pub max_spread: Decimal,

    /// Multiplier applied to volatility before it is added to `base_spread`.
    #[serde(default = "default_volatility_weight")]
    pub volatility_weight: Decimal,

    /// Minimum time between two reconciles.
    #[serde(default = "default_order_refresh_interval_ms")]
    pub order_refresh_interval_ms: u64,

    /// Order amount per side in base units.
    #[serde(default = "default_base_order_amount")]
    pub base_order_amount: Decimal,

    /// Fraction of `base_order_amount` quoted while inventory is skewed.
    #[serde(default = "default_skewed_size_factor")]
    pub skewed_size_factor: Decimal,

    /// Inventory ratio below which size is reduced.
    #[serde(default = "default_inventory_skew_low")]
    pub inventory_skew_low: Decimal,

    /// Inventory ratio above which size is reduced.
    #[serde(default = "default_inventory_skew_high")]
    pub inventory_skew_high: Decimal,

    /// Quoting is suppressed while the trend signal is below this.
    #[serde(default = "default_trend_lower")]
    pub trend_lower: f64,

    /// Quoting is suppressed while the trend signal is above this.
    #[serde(default = "default_trend_upper")]
    pub trend_upper: f64,

    /// RSI length.
    #[serde(default = "default_trend_lookback")]
    pub trend_lookback: usize,

    /// Closes in the volatility estimate.
    #[serde(default = "default_volatility_lookback")]
    pub volatility_lookback: usize,

    /// Candle window capacity.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            trading_pair: default_trading_pair(),
            price_type: PriceType::default(),
            base_spread: default_base_spread(),
            min_spread: default_min_spread(),
            max_spread: default_max_spread(),
            volatility_weight: default_volatility_weight(),
            order_refresh_interval_ms: default_order_refresh_interval_ms(),
            base_order_amount: default_base_order_amount(),
            skewed_size_factor: default_skewed_size_factor(),
            inventory_skew_low: default_inventory_skew_low(),
            inventory_skew_high: default_inventory_skew_high(),
            trend_lower: default_trend_lower(),
            trend_upper: default_trend_upper(),
            trend_lookback: default_trend_lookback(),
            volatility_lookback: default_volatility_lookback(),
            max_records: default_max_records(),
        }
    }
}

impl MakerConfig {
    /// Candle window parameters derived from this config.
    pub fn window_config(&self) -> WindowConfig {
        WindowConfig {
            capacity: self.max_records,
            trend_lookback: self.trend_lookback,
            volatility_lookback: self.volatility_lookback,
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> smm_core::Result<()> {
        let invalid = |msg: String| Err(CoreError::InvalidConfig(msg));

        if self.base_spread.is_sign_negative() {
            return invalid(format!("base_spread must be >= 0, got {}", self.base_spread));
        }
        if self.volatility_weight.is_sign_negative() {
            return invalid(format!(
                "volatility_weight must be >= 0, got {}",
                self.volatility_weight
            ));
        }
        if self.min_spread.is_sign_negative() {
            return invalid(format!("min_spread must be >= 0, got {}", self.min_spread));
        }
        if self.min_spread > self.max_spread {
            return invalid(format!(
                "min_spread ({}) must not exceed max_spread ({})",
                self.min_spread, self.max_spread
            ));
        }
        if self.max_spread >= Decimal::ONE {
            return invalid(format!("max_spread must be < 1, got {}", self.max_spread));
        }
        if self.base_order_amount <= Decimal::ZERO {
            return invalid(format!(
                "base_order_amount must be > 0, got {}",
                self.base_order_amount
            ));
        }
        if self.skewed_size_factor <= Decimal::ZERO || self.skewed_size_factor > Decimal::ONE {
            return invalid(format!(
                "skewed_size_factor must be in (0, 1], got {}",
                self.skewed_size_factor
            ));
        }
        let unit = Decimal::ZERO..=Decimal::ONE;
        if !unit.contains(&self.inventory_skew_low) || !unit.contains(&self.inventory_skew_high) {
            return invalid(format!(
                "inventory skew bounds must be in [0, 1], got {} / {}",
                self.inventory_skew_low, self.inventory_skew_high
            ));
        }
        if self.inventory_skew_low > self.inventory_skew_high {
            return invalid(format!(
                "inventory_skew_low ({}) must not exceed inventory_skew_high ({})",
                self.inventory_skew_low, self.inventory_skew_high
            ));
        }
        if !(0.0..=100.0).contains(&self.trend_lower)
            || !(0.0..=100.0).contains(&self.trend_upper)
            || self.trend_lower > self.trend_upper
        {
            return invalid(format!(
                "trend thresholds must satisfy 0 <= lower <= upper <= 100, got {} / {}",
                self.trend_lower, self.trend_upper
            ));
        }
        if self.trend_lookback == 0 {
            return invalid("trend_lookback must be > 0".to_string());
        }
        if self.volatility_lookback < 2 {
            return invalid(format!(
                "volatility_lookback must be >= 2, got {}",
                self.volatility_lookback
            ));
        }
        if self.max_records < self.window_config().min_candles() {
            return invalid(format!(
                "max_records ({}) cannot hold the {} candles indicators need",
                self.max_records,
                self.window_config().min_candles()
            ));
        }
        Ok(())
    }
}

fn default_trading_pair() -> TradingPair {
    TradingPair::new("ETH", "USDT")
}
fn default_base_spread() -> Decimal {
    Decimal::new(1, 3) // 0.1%
}
fn default_min_spread() -> Decimal {
    Decimal::new(5, 4) // 0.05%
}
fn default_max_spread() -> Decimal {
    Decimal::new(5, 3) // 0.5%
}
fn default_volatility_weight() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_order_refresh_interval_ms() -> u64 {
    15_000 // 15 seconds
}
fn default_base_order_amount() -> Decimal {
    Decimal::new(1, 2) // 0.01 base units
}
fn default_skewed_size_factor() -> Decimal {
    Decimal::new(5, 1) // half size
}
fn default_inventory_skew_low() -> Decimal {
    Decimal::new(2, 1) // 0.2
}
fn default_inventory_skew_high() -> Decimal {
    Decimal::new(8, 1) // 0.8
}
fn default_trend_lower() -> f64 {
    25.0
}
fn default_trend_upper() -> f64 {
    75.0
}
fn default_trend_lookback() -> usize {
    14
}
fn default_volatility_lookback() -> usize {
    10
}
fn default_max_records() -> usize {
    1000
}
