//! Human-readable status report.

use std::fmt;

use rust_decimal::Decimal;
use smm_core::{ActiveOrder, TradingPair};
use smm_feed::{IndicatorRow, IndicatorWindow};

use crate::connector::Connector;

/// Indicator rows shown in the status report.
pub const STATUS_CANDLE_ROWS: usize = 5;

/// One asset's balances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow {
    pub asset: String,
    pub total: Decimal,
    pub available: Decimal,
}

/// Point-in-time view of the account and indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub connector: String,
    pub balances: Vec<BalanceRow>,
    pub orders: Vec<ActiveOrder>,
    /// Newest first.
    pub candles: Vec<IndicatorRow>,
    pub trend_lookback: usize,
    pub now_ms: u64,
}

/// Status as shown to operators.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusSnapshot {
    NotReady,
    Ready(StatusReport),
}

impl StatusSnapshot {
    /// Capture the current status for `pair`.
    pub fn capture<C>(connector: &C, window: &IndicatorWindow, pair: &TradingPair, now_ms: u64) -> Self
    where
        C: Connector + ?Sized,
    {
        if !connector.is_ready_to_trade() {
            return Self::NotReady;
        }

        let balances = [pair.base(), pair.quote()]
            .into_iter()
            .map(|asset| BalanceRow {
                asset: asset.to_string(),
                total: connector.balance(asset).unwrap_or_default(),
                available: connector.available_balance(asset).unwrap_or_default(),
            })
            .collect();

        Self::Ready(StatusReport {
            connector: connector.name().to_string(),
            balances,
            orders: connector.active_orders(pair),
            candles: window.rows(STATUS_CANDLE_ROWS),
            trend_lookback: window.config().trend_lookback,
            now_ms,
        })
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => f.write_str("Bot not ready"),
            Self::Ready(report) => fmt::Display::fmt(report, f),
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "  Balances:")?;
        writeln!(f, "    {:<10} {:<8} {:>18} {:>18}", "Exchange", "Asset", "Total", "Available")?;
        for row in &self.balances {
            writeln!(
                f,
                "    {:<10} {:<8} {:>18.4} {:>18.4}",
                self.connector, row.asset, row.total, row.available
            )?;
        }

        writeln!(f)?;
        if self.orders.is_empty() {
            writeln!(f, "  No active orders")?;
        } else {
            writeln!(f, "  Orders:")?;
            writeln!(
                f,
                "    {:<10} {:<10} {:<5} {:>12} {:>10} {:>8}",
                "Exchange", "Market", "Side", "Price", "Amount", "Age"
            )?;
            for order in &self.orders {
                writeln!(
                    f,
                    "    {:<10} {:<10} {:<5} {:>12.2} {:>10.4} {:>7}s",
                    self.connector,
                    order.pair.to_string(),
                    order.side.to_string(),
                    order.price.inner(),
                    order.amount.inner(),
                    order.age_secs(self.now_ms)
                )?;
            }
        }

        writeln!(f)?;
        writeln!(f, "--- Candles & Indicators ---")?;
        writeln!(f)?;
        let rsi_label = format!("RSI_{}", self.trend_lookback);
        write!(
            f,
            "    {:<20} {:>12} {:>12} {:>12} {:>12} {:>14} {:>8} {:>10}",
            "timestamp", "open", "high", "low", "close", "volume", rsi_label, "volatility"
        )?;
        for row in &self.candles {
            let c = &row.candle;
            let ts = chrono::DateTime::from_timestamp_millis(c.timestamp_ms)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| c.timestamp_ms.to_string());
            write!(
                f,
                "\n    {:<20} {:>12} {:>12} {:>12} {:>12} {:>14} {:>8} {:>10}",
                ts,
                c.open.inner(),
                c.high.inner(),
                c.low.inner(),
                c.close.inner(),
                c.volume,
                fmt_opt(row.trend_signal, 2),
                fmt_opt(row.volatility, 4)
            )?;
        }
        Ok(())
    }
}

fn fmt_opt(value: Option<f64>, dp: usize) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.dp$}"))
}
