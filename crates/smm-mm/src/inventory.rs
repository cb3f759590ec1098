//! Inventory-based order sizing.
//!
//! Quotes shrink to a fraction of the base amount while the account's
//! base-asset share of total value sits outside the configured band.

use rust_decimal::Decimal;
use smm_core::{Price, Size};

use crate::config::MakerConfig;

/// Outcome of sizing one tick's quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizingDecision {
    /// Amount for each side, in base units.
    pub amount: Size,
    /// Base-asset value over total account value.
    pub inventory_ratio: Decimal,
    /// Whether the reduced size was chosen.
    pub skewed: bool,
}

/// Base-asset share of total account value, or 0.5 when the account is empty.
pub fn inventory_ratio(base_balance: Decimal, quote_balance: Decimal, reference: Price) -> Decimal {
    let base_value = base_balance * reference.inner();
    let total = quote_balance + base_value;
    if total > Decimal::ZERO {
        base_value / total
    } else {
        Decimal::new(5, 1)
    }
}

/// Pick the order amount for this tick.
///
/// Two tiers only: `base_order_amount`, or `base_order_amount * skewed_size_factor`
/// when the ratio is strictly outside `[inventory_skew_low, inventory_skew_high]`.
pub fn compute_amount(
    base_balance: Decimal,
    quote_balance: Decimal,
    reference: Price,
    config: &MakerConfig,
) -> SizingDecision {
    let ratio = inventory_ratio(base_balance, quote_balance, reference);
    let skewed = ratio > config.inventory_skew_high || ratio < config.inventory_skew_low;

    let amount = if skewed {
        config.base_order_amount * config.skewed_size_factor
    } else {
        config.base_order_amount
    };

    SizingDecision {
        amount: Size::new(amount),
        inventory_ratio: ratio,
        skewed,
    }
}
