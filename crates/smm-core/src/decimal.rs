//! Precision-safe decimal types for quoting.
//!
//! Prices and sizes are kept as `rust_decimal::Decimal` so that spread and
//! budget arithmetic never picks up floating-point residue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quote-currency price of one unit of the base asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Round down to a multiple of `tick_size`. Used for bids.
    #[inline]
    pub fn round_down_to_tick(&self, tick_size: Price) -> Self {
        if tick_size.is_zero() {
            return *self;
        }
        Self((self.0 / tick_size.0).floor() * tick_size.0)
    }

    /// Round up to a multiple of `tick_size`. Used for asks.
    #[inline]
    pub fn round_up_to_tick(&self, tick_size: Price) -> Self {
        if tick_size.is_zero() {
            return *self;
        }
        Self((self.0 / tick_size.0).ceil() * tick_size.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order amount in units of the base asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Size(pub Decimal);

impl Size {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Round down to lot size.
    #[inline]
    pub fn round_to_lot(&self, lot_size: Size) -> Self {
        if lot_size.is_zero() {
            return *self;
        }
        Self((self.0 / lot_size.0).floor() * lot_size.0)
    }

    /// Quote-currency value: size * price.
    #[inline]
    pub fn notional(&self, price: Price) -> Decimal {
        self.0 * price.0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_round_down_to_tick() {
        let price = Price::new(dec!(1996.0049));
        let tick = Price::new(dec!(0.01));

        assert_eq!(price.round_down_to_tick(tick).0, dec!(1996.00));
    }

    #[test]
    fn test_price_round_up_to_tick() {
        let price = Price::new(dec!(2003.9951));
        let tick = Price::new(dec!(0.01));

        assert_eq!(price.round_up_to_tick(tick).0, dec!(2004.00));
    }

    #[test]
    fn test_zero_tick_is_noop() {
        let price = Price::new(dec!(1.23456789));
        assert_eq!(price.round_down_to_tick(Price::ZERO), price);
        assert_eq!(price.round_up_to_tick(Price::ZERO), price);
    }

    #[test]
    fn test_size_round_to_lot() {
        let size = Size::new(dec!(0.01234));
        let lot = Size::new(dec!(0.0001));

        assert_eq!(size.round_to_lot(lot).0, dec!(0.0123));
    }

    #[test]
    fn test_notional_calculation() {
        let size = Size::new(dec!(0.01));
        let price = Price::new(dec!(2000));

        assert_eq!(size.notional(price), dec!(20));
    }
}
