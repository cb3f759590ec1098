//! Bounded candle window with lazily computed indicators.
//!
//! The window owns the recent OHLC history for the quoted pair. Indicator
//! values are recomputed on each query from the stored closes, so they always
//! reflect exactly the candles currently held.

use crate::indicators::{rolling_std, rolling_std_series, rsi, rsi_series};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use smm_core::Candle;
use std::collections::VecDeque;
use tracing::debug;

/// Window sizing and indicator lookbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Maximum candles held; the oldest is evicted beyond this.
    pub capacity: usize,
    /// RSI length. The trend signal needs `trend_lookback + 1` candles.
    pub trend_lookback: usize,
    /// Number of trailing closes in the volatility estimate.
    pub volatility_lookback: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            trend_lookback: 14,
            volatility_lookback: 10,
        }
    }
}

impl WindowConfig {
    /// Candles required before both indicators are available.
    pub fn min_candles(&self) -> usize {
        (self.trend_lookback + 1).max(self.volatility_lookback)
    }
}

/// Result of offering a candle to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Stored. `evicted` is true when the oldest candle was dropped to make room.
    Appended { evicted: bool },
    /// Ignored: timestamp not newer than the last stored candle, or the
    /// window has no room at all (`last_timestamp_ms` is then `None`).
    Dropped { last_timestamp_ms: Option<i64> },
}

impl AppendOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, Self::Appended { .. })
    }
}

/// Indicator snapshot for the newest candle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Indicators {
    Ready { trend_signal: f64, volatility: f64 },
    NotReady,
}

impl Indicators {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// A stored candle alongside the indicator values at its position.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub candle: Candle,
    pub trend_signal: Option<f64>,
    pub volatility: Option<f64>,
}

/// Time-ordered, bounded sequence of candles.
#[derive(Debug, Clone)]
pub struct IndicatorWindow {
    config: WindowConfig,
    candles: VecDeque<Candle>,
}

impl IndicatorWindow {
    /// Create an empty window.
    pub fn new(config: WindowConfig) -> Self {
        Self {
            candles: VecDeque::with_capacity(config.capacity.min(4096)),
            config,
        }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Newest stored candle.
    pub fn latest(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn last_timestamp_ms(&self) -> Option<i64> {
        self.candles.back().map(|c| c.timestamp_ms)
    }

    /// Append a candle, evicting the oldest when full.
    ///
    /// A candle whose timestamp does not strictly exceed the newest stored
    /// one is dropped without modifying the window, as is every candle
    /// offered to a zero-capacity window.
    pub fn append(&mut self, candle: Candle) -> AppendOutcome {
        if let Some(last) = self.last_timestamp_ms() {
            if candle.timestamp_ms <= last {
                debug!(
                    timestamp_ms = candle.timestamp_ms,
                    last_timestamp_ms = last,
                    "Dropping out-of-order candle"
                );
                return AppendOutcome::Dropped {
                    last_timestamp_ms: Some(last),
                };
            }
        }

        if self.config.capacity == 0 {
            return AppendOutcome::Dropped {
                last_timestamp_ms: None,
            };
        }

        let mut evicted = false;
        while self.candles.len() >= self.config.capacity {
            self.candles.pop_front();
            evicted = true;
        }
        self.candles.push_back(candle);

        AppendOutcome::Appended { evicted }
    }

    /// Append a batch in order. Returns the number of candles stored.
    pub fn extend<I>(&mut self, candles: I) -> usize
    where
        I: IntoIterator<Item = Candle>,
    {
        candles
            .into_iter()
            .map(|c| self.append(c))
            .filter(AppendOutcome::is_appended)
            .count()
    }

    /// RSI of the newest candle, once `trend_lookback + 1` candles are held.
    pub fn trend_signal(&self) -> Option<f64> {
        if self.len() < self.config.trend_lookback + 1 {
            return None;
        }
        rsi(&self.closes(), self.config.trend_lookback)
    }

    /// Sample standard deviation of the trailing `volatility_lookback` closes.
    pub fn volatility(&self) -> Option<f64> {
        rolling_std(&self.closes(), self.config.volatility_lookback)
    }

    /// Both indicators for the newest candle, or `NotReady`.
    pub fn latest_indicators(&self) -> Indicators {
        if self.len() < self.config.min_candles() {
            return Indicators::NotReady;
        }
        match (self.trend_signal(), self.volatility()) {
            (Some(trend_signal), Some(volatility)) => Indicators::Ready {
                trend_signal,
                volatility,
            },
            _ => Indicators::NotReady,
        }
    }

    /// The newest `n` candles with their indicator values, newest first.
    pub fn rows(&self, n: usize) -> Vec<IndicatorRow> {
        let closes = self.closes();
        let trend = rsi_series(&closes, self.config.trend_lookback);
        let vol = rolling_std_series(&closes, self.config.volatility_lookback);

        self.candles
            .iter()
            .enumerate()
            .rev()
            .take(n)
            .map(|(i, candle)| IndicatorRow {
                candle: candle.clone(),
                trend_signal: trend[i],
                volatility: vol[i],
            })
            .collect()
    }

    // === Private helpers ===

    fn closes(&self) -> Vec<f64> {
        self.candles
            .iter()
            .map(|c| c.close.inner().to_f64().unwrap_or(f64::NAN))
            .collect()
    }
}
