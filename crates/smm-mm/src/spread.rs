//! Volatility-driven spread and quote prices.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use smm_core::Price;

use crate::config::MakerConfig;

/// Half-spread as a fraction of the reference price.
///
/// `clamp(base_spread + volatility * volatility_weight, min_spread, max_spread)`.
/// A non-finite volatility yields `max_spread`.
pub fn compute_half_spread(volatility: f64, config: &MakerConfig) -> Decimal {
    let Some(vol) = Decimal::from_f64(volatility) else {
        return config.max_spread;
    };

    (config.base_spread + vol * config.volatility_weight)
        .max(config.min_spread)
        .min(config.max_spread)
}

/// Bid and ask placed `half_spread` either side of `reference`.
///
/// No tick rounding happens here; the venue rounds on submission.
pub fn quote_prices(reference: Price, half_spread: Decimal) -> (Price, Price) {
    let r = reference.inner();
    (
        Price::new(r * (Decimal::ONE - half_spread)),
        Price::new(r * (Decimal::ONE + half_spread)),
    )
}
