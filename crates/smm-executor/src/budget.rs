//! Collateral reservation for proposals.
//!
//! Buys reserve quote (notional plus maker fee), sells reserve base. Legs are
//! funded in proposal order from a shared pool, so the second leg only sees
//! what the first left behind.

use std::collections::HashMap;

use rust_decimal::Decimal;
use smm_core::{OrderIntent, OrderSide, Proposal, Size};
use tracing::debug;

/// Per-asset funds left to reserve against.
#[derive(Debug, Clone, Default)]
pub struct BudgetPool {
    remaining: HashMap<String, Decimal>,
}

impl BudgetPool {
    /// Create a pool from available balances.
    pub fn new<I, S>(available: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        Self {
            remaining: available.into_iter().map(|(a, v)| (a.into(), v)).collect(),
        }
    }

    pub fn remaining(&self, asset: &str) -> Decimal {
        self.remaining.get(asset).copied().unwrap_or_default()
    }

    fn reserve(&mut self, asset: &str, amount: Decimal) {
        *self.remaining.entry(asset.to_string()).or_default() -= amount;
    }
}

/// Asset and amount a leg locks while resting.
pub fn collateral(intent_side: OrderSide, amount: Size, price: Decimal, maker_fee: Decimal) -> Decimal {
    match intent_side {
        OrderSide::Buy => amount.inner() * price * (Decimal::ONE + maker_fee),
        OrderSide::Sell => amount.inner(),
    }
}

/// Trim `proposal` to what `pool` can fund.
///
/// Amounts are rounded down to `lot_size`. With `all_or_none`, one unfundable
/// or zero-sized leg empties the whole result. Otherwise an underfunded leg is
/// shrunk to what remains, and dropped if that rounds to zero.
pub fn fit_to_budget(
    proposal: Proposal,
    pool: &mut BudgetPool,
    lot_size: Size,
    maker_fee: Decimal,
    all_or_none: bool,
) -> Proposal {
    let mut funded = Vec::with_capacity(proposal.len());

    for intent in proposal {
        match fund_leg(&intent, pool, lot_size, maker_fee, all_or_none) {
            Some(leg) => funded.push(leg),
            None if all_or_none => {
                debug!(side = %intent.side, amount = %intent.amount, "Leg unfundable, dropping proposal");
                return Proposal::empty();
            }
            None => debug!(side = %intent.side, amount = %intent.amount, "Leg unfundable, dropping leg"),
        }
    }

    Proposal::from_intents(funded)
}

// === Private helpers ===

fn fund_leg(
    intent: &OrderIntent,
    pool: &mut BudgetPool,
    lot_size: Size,
    maker_fee: Decimal,
    all_or_none: bool,
) -> Option<OrderIntent> {
    let asset = match intent.side {
        OrderSide::Buy => intent.pair.quote(),
        OrderSide::Sell => intent.pair.base(),
    };
    let available = pool.remaining(asset);
    let price = intent.price.inner();

    let mut amount = intent.amount.round_to_lot(lot_size);
    if amount.is_zero() || !price.is_sign_positive() || price.is_zero() {
        return None;
    }

    if collateral(intent.side, amount, price, maker_fee) > available {
        if all_or_none {
            return None;
        }
        let affordable = match intent.side {
            OrderSide::Buy => available / (price * (Decimal::ONE + maker_fee)),
            OrderSide::Sell => available,
        };
        amount = Size::new(affordable.max(Decimal::ZERO)).round_to_lot(lot_size);
        if amount.is_zero() {
            return None;
        }
    }

    pool.reserve(asset, collateral(intent.side, amount, price, maker_fee));
    Some(intent.with_amount(amount))
}
