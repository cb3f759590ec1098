//! Market data snapshots: OHLC candles and best bid/offer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Price;

/// One OHLC bar. `timestamp_ms` is the bar's open time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Decimal,
    pub timestamp_ms: i64,
}

impl Candle {
    /// Create a candle whose OHLC are all `close`. Mostly useful in tests.
    pub fn flat(timestamp_ms: i64, close: Price) -> Self {
        Self {
            open: close,
            high: close,
            low: close,
            close,
            volume: Decimal::ZERO,
            timestamp_ms,
        }
    }
}

/// Best bid and offer (top of book).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bbo {
    pub bid: Price,
    pub ask: Price,
}

impl Bbo {
    pub fn new(bid: Price, ask: Price) -> Self {
        Self { bid, ask }
    }

    /// Mid price: (bid + ask) / 2.
    pub fn mid(&self) -> Price {
        Price::new((self.bid.inner() + self.ask.inner()) / Decimal::TWO)
    }

    /// A usable book has positive prices and is not crossed.
    pub fn is_valid(&self) -> bool {
        self.bid.is_positive() && self.ask.is_positive() && self.bid <= self.ask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bbo_mid() {
        let bbo = Bbo::new(Price::new(dec!(1999.5)), Price::new(dec!(2000.5)));
        assert_eq!(bbo.mid(), Price::new(dec!(2000)));
    }

    #[test]
    fn test_bbo_validity() {
        assert!(Bbo::new(Price::new(dec!(1)), Price::new(dec!(2))).is_valid());
        assert!(!Bbo::new(Price::new(dec!(2)), Price::new(dec!(1))).is_valid());
        assert!(!Bbo::new(Price::ZERO, Price::new(dec!(1))).is_valid());
    }

    #[test]
    fn test_flat_candle() {
        let c = Candle::flat(60_000, Price::new(dec!(100)));
        assert_eq!(c.open, c.close);
        assert_eq!(c.high, c.low);
        assert_eq!(c.timestamp_ms, 60_000);
    }
}
