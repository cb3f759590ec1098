//! Prometheus metrics for the smart market maker.
//!
//! Covers:
//! - Tick outcomes (quoted / skipped by reason)
//! - Order submissions, failures, cancels and fills
//! - Candle window ingestion
//! - Latest quote inputs (trend, volatility, half-spread, inventory ratio)
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_int_counter, register_int_gauge, CounterVec,
    Encoder, Gauge, IntCounter, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

// =============================================================================
// Tick Metrics
// =============================================================================

/// Ticks by outcome.
/// Labels: outcome (quoted/not_ready/not_due/suppressed_by_trend/...)
pub static TICKS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!("smm_ticks_total", "Total ticks by outcome", &["outcome"]).unwrap()
});

/// Timestamp (Unix ms) of the next allowed reconcile.
pub static NEXT_REFRESH_MS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "smm_next_refresh_ms",
        "Earliest time the next reconcile may run (Unix ms)"
    )
    .unwrap()
});

// =============================================================================
// Order Metrics
// =============================================================================

/// Orders accepted by the connector.
pub static ORDERS_SUBMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "smm_orders_submitted_total",
        "Orders accepted by the connector",
        &["side"]
    )
    .unwrap()
});

/// Orders the connector refused.
pub static ORDERS_FAILED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "smm_orders_failed_total",
        "Order submissions refused by the connector",
        &["side"]
    )
    .unwrap()
});

/// Cancels issued.
pub static ORDERS_CANCELLED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("smm_orders_cancelled_total", "Cancels issued").unwrap()
});

/// Fills received.
pub static FILLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!("smm_fills_total", "Fills received", &["side"]).unwrap()
});

// =============================================================================
// Feed Metrics
// =============================================================================

/// Candles stored in the window.
pub static CANDLES_APPENDED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("smm_candles_appended_total", "Candles appended to the window").unwrap()
});

/// Candles dropped for not advancing the window's last timestamp.
pub static CANDLES_DROPPED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "smm_candles_dropped_total",
        "Candles dropped as stale or duplicate"
    )
    .unwrap()
});

/// Candles currently held.
pub static WINDOW_LEN: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("smm_window_len", "Candles currently in the indicator window").unwrap()
});

/// Feed poll errors.
pub static FEED_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("smm_feed_errors_total", "Market data poll failures").unwrap()
});

// =============================================================================
// Quote Inputs
// =============================================================================

/// Latest trend signal (RSI).
pub static TREND_SIGNAL: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("smm_trend_signal", "Latest trend signal (RSI, 0-100)").unwrap()
});

/// Latest volatility.
pub static VOLATILITY: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("smm_volatility", "Latest close-price volatility").unwrap()
});

/// Latest half-spread in basis points.
pub static HALF_SPREAD_BPS: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("smm_half_spread_bps", "Latest half-spread in basis points").unwrap()
});

/// Latest inventory ratio.
pub static INVENTORY_RATIO: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "smm_inventory_ratio",
        "Share of portfolio value held in the base asset"
    )
    .unwrap()
});

/// Metrics helper for recording values.
pub struct Metrics;

impl Metrics {
    /// Record a tick outcome.
    pub fn tick(outcome: &str) {
        TICKS_TOTAL.with_label_values(&[outcome]).inc();
    }

    /// Update next allowed refresh time.
    pub fn next_refresh(next_allowed_ms: u64) {
        NEXT_REFRESH_MS.set(i64::try_from(next_allowed_ms).unwrap_or(i64::MAX));
    }

    /// Record accepted order.
    pub fn order_submitted(side: &str) {
        ORDERS_SUBMITTED_TOTAL.with_label_values(&[side]).inc();
    }

    /// Record refused order.
    pub fn order_failed(side: &str) {
        ORDERS_FAILED_TOTAL.with_label_values(&[side]).inc();
    }

    /// Record cancels issued.
    pub fn orders_cancelled(count: usize) {
        ORDERS_CANCELLED_TOTAL.inc_by(count as u64);
    }

    /// Record fill.
    pub fn fill(side: &str) {
        FILLS_TOTAL.with_label_values(&[side]).inc();
    }

    /// Record candle ingestion.
    pub fn candles(appended: usize, dropped: usize, window_len: usize) {
        CANDLES_APPENDED_TOTAL.inc_by(appended as u64);
        CANDLES_DROPPED_TOTAL.inc_by(dropped as u64);
        WINDOW_LEN.set(window_len as i64);
    }

    /// Record feed error.
    pub fn feed_error() {
        FEED_ERRORS_TOTAL.inc();
    }

    /// Update quote inputs.
    pub fn quote_inputs(trend_signal: f64, volatility: f64, half_spread: f64, inventory_ratio: f64) {
        TREND_SIGNAL.set(trend_signal);
        VOLATILITY.set(volatility);
        HALF_SPREAD_BPS.set(half_spread * 10_000.0);
        INVENTORY_RATIO.set(inventory_ratio);
    }

    /// Update trend signal alone (suppressed ticks).
    pub fn trend_signal(trend_signal: f64) {
        TREND_SIGNAL.set(trend_signal);
    }

    /// Render the default registry in Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
