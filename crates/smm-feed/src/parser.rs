//! Response parsing for REST market data.
//!
//! Supports the Binance-compatible spot formats:
//! 1. `klines`: array of arrays `[openTime, open, high, low, close, volume, closeTime, ...]`
//! 2. `ticker/bookTicker`: `{"symbol", "bidPrice", "bidQty", "askPrice", "askQty"}`
//!
//! Numeric fields arrive as strings and are parsed straight into decimals.

use crate::error::{FeedError, FeedResult};
use rust_decimal::Decimal;
use serde::Deserialize;
use smm_core::{Bbo, Candle, Price};
use std::str::FromStr;

/// A parsed kline with its close time, used to tell closed bars from the
/// one still forming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kline {
    pub candle: Candle,
    pub close_time_ms: i64,
}

impl Kline {
    /// Whether the bar has closed at `now_ms`.
    pub fn is_closed(&self, now_ms: i64) -> bool {
        self.close_time_ms <= now_ms
    }
}

/// Raw bookTicker response.
#[derive(Debug, Deserialize)]
pub struct RawBookTicker {
    pub symbol: String,
    #[serde(rename = "bidPrice")]
    pub bid_price: String,
    #[serde(rename = "askPrice")]
    pub ask_price: String,
}

/// Parse a klines response body.
pub fn parse_klines(data: &serde_json::Value) -> FeedResult<Vec<Kline>> {
    let rows = data
        .as_array()
        .ok_or_else(|| FeedError::ParseError("klines response is not an array".to_string()))?;

    rows.iter().map(parse_kline).collect()
}

/// Parse a bookTicker response body.
pub fn parse_book_ticker(data: &serde_json::Value) -> FeedResult<Bbo> {
    let raw: RawBookTicker = serde_json::from_value(data.clone())
        .map_err(|e| FeedError::ParseError(format!("Invalid bookTicker: {e}")))?;

    let bbo = Bbo::new(parse_price(&raw.bid_price)?, parse_price(&raw.ask_price)?);
    if !bbo.is_valid() {
        return Err(FeedError::InvalidData(format!(
            "{}: unusable book bid={} ask={}",
            raw.symbol, bbo.bid, bbo.ask
        )));
    }
    Ok(bbo)
}

// === Private helpers ===

fn parse_kline(row: &serde_json::Value) -> FeedResult<Kline> {
    let fields = row
        .as_array()
        .ok_or_else(|| FeedError::ParseError("kline row is not an array".to_string()))?;
    if fields.len() < 7 {
        return Err(FeedError::ParseError(format!(
            "kline row has {} fields, expected at least 7",
            fields.len()
        )));
    }

    let candle = Candle {
        timestamp_ms: parse_millis(&fields[0])?,
        open: parse_price(str_field(&fields[1])?)?,
        high: parse_price(str_field(&fields[2])?)?,
        low: parse_price(str_field(&fields[3])?)?,
        close: parse_price(str_field(&fields[4])?)?,
        volume: parse_decimal(str_field(&fields[5])?)?,
    };

    Ok(Kline {
        candle,
        close_time_ms: parse_millis(&fields[6])?,
    })
}

fn str_field(value: &serde_json::Value) -> FeedResult<&str> {
    value
        .as_str()
        .ok_or_else(|| FeedError::ParseError(format!("Expected string field, got {value}")))
}

fn parse_millis(value: &serde_json::Value) -> FeedResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| FeedError::ParseError(format!("Invalid timestamp: {value}")))
}

fn parse_price(s: &str) -> FeedResult<Price> {
    Ok(Price::new(parse_decimal(s)?))
}

fn parse_decimal(s: &str) -> FeedResult<Decimal> {
    Decimal::from_str(s).map_err(|_| FeedError::ParseError(format!("Invalid decimal: {s}")))
}
