//! Venue seams the quoting pipeline talks through.
//!
//! The pipeline never reaches a venue directly: prices, balances, resting
//! orders and submissions all go through [`Connector`], and sizing against
//! available funds goes through [`BudgetChecker`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smm_core::{ActiveOrder, ClientOrderId, OrderType, Price, Proposal, Size, TradingPair};

use crate::error::ConnectorResult;

/// Book price used as the quoting reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceType {
    #[default]
    Mid,
    BestBid,
    BestAsk,
}

/// Trims a proposal to what the account can fund.
pub trait BudgetChecker {
    /// Return the fundable subset of `proposal`.
    ///
    /// With `all_or_none`, any leg that cannot be funded empties the result.
    /// Intents may come back with smaller amounts but never larger ones,
    /// and side and price are never changed.
    fn adjust(&self, proposal: Proposal, all_or_none: bool) -> Proposal;
}

/// A single venue account trading one or more pairs.
pub trait Connector {
    /// Venue name for logs.
    fn name(&self) -> &str;

    /// Whether the venue has the market data and account state needed to quote.
    fn is_ready_to_trade(&self) -> bool;

    /// Current book price of the requested type.
    fn reference_price(&self, pair: &TradingPair, price_type: PriceType) -> Option<Price>;

    /// Total balance of `asset`, including amounts locked in resting orders.
    fn balance(&self, asset: &str) -> Option<Decimal>;

    /// Balance of `asset` not locked in resting orders.
    fn available_balance(&self, asset: &str) -> Option<Decimal> {
        self.balance(asset)
    }

    /// Resting orders the bot placed on `pair`.
    fn active_orders(&self, pair: &TradingPair) -> Vec<ActiveOrder>;

    /// Request cancellation. Unknown ids are ignored.
    fn cancel(&mut self, pair: &TradingPair, client_order_id: &ClientOrderId);

    /// Submit a buy order.
    fn submit_buy(
        &mut self,
        pair: &TradingPair,
        amount: Size,
        order_type: OrderType,
        price: Price,
    ) -> ConnectorResult<ClientOrderId>;

    /// Submit a sell order.
    fn submit_sell(
        &mut self,
        pair: &TradingPair,
        amount: Size,
        order_type: OrderType,
        price: Price,
    ) -> ConnectorResult<ClientOrderId>;

    /// The budget checker bound to this account.
    fn budget_checker(&self) -> &dyn BudgetChecker;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        price_type: PriceType,
    }

    #[test]
    fn test_price_type_serde_names() {
        let w: Wrapper = toml::from_str("price_type = \"best_ask\"").unwrap();
        assert_eq!(w.price_type, PriceType::BestAsk);
        let w: Wrapper = toml::from_str("price_type = \"mid\"").unwrap();
        assert_eq!(w.price_type, PriceType::Mid);
    }
}
