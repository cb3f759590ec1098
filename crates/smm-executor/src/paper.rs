//! Paper-trading connector.
//!
//! Simulated account against live top-of-book prices. Orders rest until the
//! book crosses them, then fill in full at their limit price with the maker
//! fee charged in quote.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smm_core::{
    ActiveOrder, Bbo, ClientOrderId, FillEvent, OrderSide, OrderType, Price, Proposal, Size,
    TradingPair,
};
use smm_mm::{BudgetChecker, Connector, ConnectorError, ConnectorResult, PriceType};
use tracing::{debug, info, warn};

use crate::budget::{collateral, fit_to_budget, BudgetPool};
use crate::error::{ExecutorError, ExecutorResult};

// ============================================================================
// Configuration
// ============================================================================

/// Paper account settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Venue name shown in logs and status.
    #[serde(default = "default_name")]
    pub name: String,

    /// Starting balance per asset.
    #[serde(default = "default_initial_balances")]
    pub initial_balances: BTreeMap<String, Decimal>,

    /// Price increment. Buys round down, sells round up.
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,

    /// Amount increment. Amounts round down.
    #[serde(default = "default_lot_size")]
    pub lot_size: Decimal,

    /// Maker fee as a fraction of notional (0.001 = 10 bps).
    #[serde(default = "default_maker_fee")]
    pub maker_fee: Decimal,
}

fn default_name() -> String {
    "binance_paper_trade".to_string()
}

fn default_initial_balances() -> BTreeMap<String, Decimal> {
    BTreeMap::from([
        ("ETH".to_string(), Decimal::ONE),
        ("USDT".to_string(), Decimal::from(2000)),
    ])
}

fn default_tick_size() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_lot_size() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}

fn default_maker_fee() -> Decimal {
    Decimal::new(1, 3) // 0.001
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            initial_balances: default_initial_balances(),
            tick_size: default_tick_size(),
            lot_size: default_lot_size(),
            maker_fee: default_maker_fee(),
        }
    }
}

impl PaperConfig {
    /// Reject settings the simulator cannot honour.
    pub fn validate(&self) -> ExecutorResult<()> {
        if self.tick_size <= Decimal::ZERO {
            return Err(ExecutorError::InvalidConfig(format!(
                "tick_size must be positive, got {}",
                self.tick_size
            )));
        }
        if self.lot_size <= Decimal::ZERO {
            return Err(ExecutorError::InvalidConfig(format!(
                "lot_size must be positive, got {}",
                self.lot_size
            )));
        }
        if self.maker_fee < Decimal::ZERO || self.maker_fee >= Decimal::ONE {
            return Err(ExecutorError::InvalidConfig(format!(
                "maker_fee must be in [0, 1), got {}",
                self.maker_fee
            )));
        }
        if let Some((asset, amount)) = self.initial_balances.iter().find(|(_, v)| v.is_sign_negative()) {
            return Err(ExecutorError::InvalidConfig(format!(
                "initial balance for {asset} is negative: {amount}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Connector
// ============================================================================

/// Simulated single-pair venue account.
#[derive(Debug)]
pub struct PaperConnector {
    config: PaperConfig,
    pair: TradingPair,
    balances: BTreeMap<String, Decimal>,
    orders: Vec<ActiveOrder>,
    bbo: Option<Bbo>,
    now_ms: u64,
}

impl PaperConnector {
    /// Create a connector for `pair` funded with the configured balances.
    pub fn new(config: PaperConfig, pair: TradingPair) -> ExecutorResult<Self> {
        config.validate()?;
        let mut balances = config.initial_balances.clone();
        balances.entry(pair.base().to_string()).or_default();
        balances.entry(pair.quote().to_string()).or_default();

        info!(
            venue = %config.name,
            pair = %pair,
            balances = ?balances,
            "Paper account opened"
        );

        Ok(Self {
            config,
            pair,
            balances,
            orders: Vec::new(),
            bbo: None,
            now_ms: 0,
        })
    }

    pub fn config(&self) -> &PaperConfig {
        &self.config
    }

    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    /// Latest top of book, if any.
    pub fn bbo(&self) -> Option<Bbo> {
        self.bbo
    }

    /// Clock used to stamp new orders and fills.
    pub fn set_now_ms(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    /// Apply a book update and fill every resting order it crosses.
    ///
    /// Buys fill when `price >= ask`, sells when `price <= bid`. Invalid
    /// books are ignored.
    pub fn on_bbo(&mut self, bbo: Bbo) -> Vec<FillEvent> {
        if !bbo.is_valid() {
            warn!(bid = %bbo.bid, ask = %bbo.ask, "Ignoring invalid book");
            return Vec::new();
        }
        self.bbo = Some(bbo);

        let (crossed, resting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.orders)
            .into_iter()
            .partition(|o| match o.side {
                OrderSide::Buy => o.price >= bbo.ask,
                OrderSide::Sell => o.price <= bbo.bid,
            });
        self.orders = resting;

        crossed.into_iter().map(|order| self.settle(order)).collect()
    }

    /// Amount of `asset` held by resting orders.
    pub fn locked(&self, asset: &str) -> Decimal {
        self.orders
            .iter()
            .filter(|o| locked_asset(o.side, &o.pair) == asset)
            .map(|o| collateral(o.side, o.amount, o.price.inner(), self.config.maker_fee))
            .sum()
    }

    // === Private helpers ===

    fn settle(&mut self, order: ActiveOrder) -> FillEvent {
        let notional = order.amount.notional(order.price);
        let fee = notional * self.config.maker_fee;
        let base = order.pair.base().to_string();
        let quote = order.pair.quote().to_string();

        match order.side {
            OrderSide::Buy => {
                *self.balances.entry(quote).or_default() -= notional + fee;
                *self.balances.entry(base).or_default() += order.amount.inner();
            }
            OrderSide::Sell => {
                *self.balances.entry(base).or_default() -= order.amount.inner();
                *self.balances.entry(quote).or_default() += notional - fee;
            }
        }

        debug!(
            client_order_id = %order.client_order_id,
            side = %order.side,
            price = %order.price,
            amount = %order.amount,
            fee = %fee,
            "Paper order filled"
        );

        FillEvent {
            pair: order.pair,
            side: order.side,
            amount: order.amount,
            price: order.price,
            client_order_id: order.client_order_id,
            timestamp_ms: self.now_ms,
        }
    }

    fn submit(
        &mut self,
        side: OrderSide,
        pair: &TradingPair,
        amount: Size,
        order_type: OrderType,
        price: Price,
    ) -> ConnectorResult<ClientOrderId> {
        if pair != &self.pair {
            return Err(ConnectorError::UnknownPair(pair.to_string()));
        }
        if order_type != OrderType::Limit {
            return Err(ConnectorError::InvalidOrder(format!(
                "{order_type:?} orders are not supported"
            )));
        }
        if self.bbo.is_none() {
            return Err(ConnectorError::NotReady);
        }

        let tick = Price::new(self.config.tick_size);
        let price = match side {
            OrderSide::Buy => price.round_down_to_tick(tick),
            OrderSide::Sell => price.round_up_to_tick(tick),
        };
        let amount = amount.round_to_lot(Size::new(self.config.lot_size));
        if amount.is_zero() || !price.is_positive() {
            return Err(ConnectorError::InvalidOrder(format!(
                "amount {amount} at price {price} is below venue minimums"
            )));
        }

        let asset = locked_asset(side, pair);
        let required = collateral(side, amount, price.inner(), self.config.maker_fee);
        let available = self.available(asset);
        if required > available {
            return Err(ConnectorError::InsufficientBalance {
                asset: asset.to_string(),
                required,
                available,
            });
        }

        let id = ClientOrderId::new(side);
        self.orders.push(ActiveOrder {
            pair: pair.clone(),
            client_order_id: id.clone(),
            side,
            price,
            amount,
            created_at_ms: self.now_ms,
        });
        Ok(id)
    }

    fn available(&self, asset: &str) -> Decimal {
        self.balances.get(asset).copied().unwrap_or_default() - self.locked(asset)
    }
}

impl Connector for PaperConnector {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn is_ready_to_trade(&self) -> bool {
        self.bbo.is_some() && self.balances.values().any(|v| v.is_sign_positive() && !v.is_zero())
    }

    fn reference_price(&self, pair: &TradingPair, price_type: PriceType) -> Option<Price> {
        if pair != &self.pair {
            return None;
        }
        let bbo = self.bbo?;
        Some(match price_type {
            PriceType::Mid => bbo.mid(),
            PriceType::BestBid => bbo.bid,
            PriceType::BestAsk => bbo.ask,
        })
    }

    fn balance(&self, asset: &str) -> Option<Decimal> {
        self.balances.get(asset).copied()
    }

    fn available_balance(&self, asset: &str) -> Option<Decimal> {
        self.balances.contains_key(asset).then(|| self.available(asset))
    }

    fn active_orders(&self, pair: &TradingPair) -> Vec<ActiveOrder> {
        self.orders.iter().filter(|o| &o.pair == pair).cloned().collect()
    }

    fn cancel(&mut self, pair: &TradingPair, client_order_id: &ClientOrderId) {
        let before = self.orders.len();
        self.orders
            .retain(|o| !(&o.pair == pair && &o.client_order_id == client_order_id));
        if self.orders.len() == before {
            debug!(client_order_id = %client_order_id, "Cancel for unknown order ignored");
        }
    }

    fn submit_buy(
        &mut self,
        pair: &TradingPair,
        amount: Size,
        order_type: OrderType,
        price: Price,
    ) -> ConnectorResult<ClientOrderId> {
        self.submit(OrderSide::Buy, pair, amount, order_type, price)
    }

    fn submit_sell(
        &mut self,
        pair: &TradingPair,
        amount: Size,
        order_type: OrderType,
        price: Price,
    ) -> ConnectorResult<ClientOrderId> {
        self.submit(OrderSide::Sell, pair, amount, order_type, price)
    }

    fn budget_checker(&self) -> &dyn BudgetChecker {
        self
    }
}

impl BudgetChecker for PaperConnector {
    fn adjust(&self, proposal: Proposal, all_or_none: bool) -> Proposal {
        let mut pool = BudgetPool::new(
            self.balances
                .keys()
                .map(|asset| (asset.clone(), self.available(asset))),
        );
        fit_to_budget(
            proposal,
            &mut pool,
            Size::new(self.config.lot_size),
            self.config.maker_fee,
            all_or_none,
        )
    }
}

fn locked_asset(side: OrderSide, pair: &TradingPair) -> &str {
    match side {
        OrderSide::Buy => pair.quote(),
        OrderSide::Sell => pair.base(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use smm_core::OrderIntent;

    fn pair() -> TradingPair {
        TradingPair::new("ETH", "USDT")
    }

    fn connector() -> PaperConnector {
        let mut paper = PaperConnector::new(PaperConfig::default(), pair()).unwrap();
        paper.on_bbo(Bbo::new(Price::new(dec!(1999)), Price::new(dec!(2001))));
        paper
    }

    fn buy(paper: &mut PaperConnector, price: Decimal, amount: Decimal) -> ConnectorResult<ClientOrderId> {
        paper.submit_buy(&pair(), Size::new(amount), OrderType::Limit, Price::new(price))
    }

    fn sell(paper: &mut PaperConnector, price: Decimal, amount: Decimal) -> ConnectorResult<ClientOrderId> {
        paper.submit_sell(&pair(), Size::new(amount), OrderType::Limit, Price::new(price))
    }

    #[test]
    fn test_not_ready_without_book() {
        let paper = PaperConnector::new(PaperConfig::default(), pair()).unwrap();
        assert!(!paper.is_ready_to_trade());
        assert_eq!(paper.reference_price(&pair(), PriceType::Mid), None);
    }

    #[test]
    fn test_not_ready_when_unfunded() {
        let config = PaperConfig {
            initial_balances: BTreeMap::new(),
            ..Default::default()
        };
        let mut paper = PaperConnector::new(config, pair()).unwrap();
        paper.on_bbo(Bbo::new(Price::new(dec!(1999)), Price::new(dec!(2001))));
        assert!(!paper.is_ready_to_trade());
        assert_eq!(paper.balance("ETH"), Some(Decimal::ZERO));
    }

    #[test]
    fn test_reference_prices() {
        let paper = connector();
        assert!(paper.is_ready_to_trade());
        assert_eq!(paper.reference_price(&pair(), PriceType::Mid), Some(Price::new(dec!(2000))));
        assert_eq!(paper.reference_price(&pair(), PriceType::BestBid), Some(Price::new(dec!(1999))));
        assert_eq!(paper.reference_price(&pair(), PriceType::BestAsk), Some(Price::new(dec!(2001))));
        assert_eq!(paper.reference_price(&TradingPair::new("BTC", "USDT"), PriceType::Mid), None);
    }

    #[test]
    fn test_invalid_book_ignored() {
        let mut paper = connector();
        let fills = paper.on_bbo(Bbo::new(Price::new(dec!(2010)), Price::new(dec!(2000))));
        assert!(fills.is_empty());
        assert_eq!(paper.bbo(), Some(Bbo::new(Price::new(dec!(1999)), Price::new(dec!(2001)))));
    }

    #[test]
    fn test_submit_rounds_to_venue_increments() {
        let mut paper = connector();
        buy(&mut paper, dec!(1995.678), dec!(0.012345)).unwrap();
        sell(&mut paper, dec!(2004.321), dec!(0.012345)).unwrap();

        let orders = paper.active_orders(&pair());
        assert_eq!(orders[0].price, Price::new(dec!(1995.67)));
        assert_eq!(orders[0].amount, Size::new(dec!(0.0123)));
        assert_eq!(orders[1].price, Price::new(dec!(2004.33)));
    }

    #[test]
    fn test_submit_locks_funds() {
        let mut paper = connector();
        buy(&mut paper, dec!(1990), dec!(0.01)).unwrap();
        sell(&mut paper, dec!(2010), dec!(0.25)).unwrap();

        assert_eq!(paper.balance("USDT"), Some(dec!(2000)));
        // 0.01 * 1990 * 1.001
        assert_eq!(paper.available_balance("USDT"), Some(dec!(2000) - dec!(19.91990)));
        assert_eq!(paper.available_balance("ETH"), Some(dec!(0.75)));
    }

    #[test]
    fn test_submit_rejections() {
        let mut paper = connector();

        assert!(matches!(
            buy(&mut paper, dec!(1990), dec!(0.00001)),
            Err(ConnectorError::InvalidOrder(_))
        ));
        assert!(matches!(
            sell(&mut paper, dec!(2010), dec!(5)),
            Err(ConnectorError::InsufficientBalance { .. })
        ));
        assert!(matches!(
            paper.submit_buy(&pair(), Size::new(dec!(0.01)), OrderType::Market, Price::new(dec!(1990))),
            Err(ConnectorError::InvalidOrder(_))
        ));
        assert!(matches!(
            paper.submit_buy(
                &TradingPair::new("BTC", "USDT"),
                Size::new(dec!(0.01)),
                OrderType::Limit,
                Price::new(dec!(1990))
            ),
            Err(ConnectorError::UnknownPair(_))
        ));
        assert!(paper.active_orders(&pair()).is_empty());
    }

    #[test]
    fn test_cancel_unknown_is_noop() {
        let mut paper = connector();
        let id = buy(&mut paper, dec!(1990), dec!(0.01)).unwrap();

        paper.cancel(&pair(), &ClientOrderId::new(OrderSide::Buy));
        assert_eq!(paper.active_orders(&pair()).len(), 1);

        paper.cancel(&pair(), &id);
        assert!(paper.active_orders(&pair()).is_empty());
        assert_eq!(paper.locked("USDT"), Decimal::ZERO);
    }

    #[test]
    fn test_crossing_book_fills_buy() {
        let mut paper = connector();
        paper.set_now_ms(42_000);
        let id = buy(&mut paper, dec!(1996), dec!(0.01)).unwrap();

        assert!(paper.on_bbo(Bbo::new(Price::new(dec!(1997)), Price::new(dec!(1998)))).is_empty());

        let fills = paper.on_bbo(Bbo::new(Price::new(dec!(1994)), Price::new(dec!(1996))));
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].client_order_id, id);
        assert_eq!(fills[0].timestamp_ms, 42_000);
        assert_eq!(fills[0].summary(), "BUY 0.0100 ETH-USDT at 1996.00");

        // 19.96 notional + 0.01996 fee
        assert_eq!(paper.balance("USDT"), Some(dec!(1980.02004)));
        assert_eq!(paper.balance("ETH"), Some(dec!(1.01)));
        assert!(paper.active_orders(&pair()).is_empty());
    }

    #[test]
    fn test_crossing_book_fills_sell() {
        let mut paper = connector();
        sell(&mut paper, dec!(2004), dec!(0.01)).unwrap();

        let fills = paper.on_bbo(Bbo::new(Price::new(dec!(2004)), Price::new(dec!(2005))));
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].side, OrderSide::Sell);
        assert_eq!(paper.balance("ETH"), Some(dec!(0.99)));
        // 20.04 notional - 0.02004 fee
        assert_eq!(paper.balance("USDT"), Some(dec!(2020.01996)));
    }

    #[test]
    fn test_budget_checker_all_or_none() {
        let paper = connector();
        let proposal = |amount: Decimal| {
            Proposal::two_sided(
                OrderIntent::limit_maker(pair(), OrderSide::Buy, Price::new(dec!(1996)), Size::new(amount)),
                OrderIntent::limit_maker(pair(), OrderSide::Sell, Price::new(dec!(2004)), Size::new(amount)),
            )
        };

        let out = paper.budget_checker().adjust(proposal(dec!(0.01)), true);
        assert_eq!(out, proposal(dec!(0.01)));

        // Sell leg needs 2 ETH, only 1 available.
        assert!(paper.budget_checker().adjust(proposal(dec!(2)), true).is_empty());
    }

    #[test]
    fn test_budget_checker_sees_locked_funds() {
        let mut paper = connector();
        sell(&mut paper, dec!(2010), dec!(0.995)).unwrap();

        let proposal = Proposal::two_sided(
            OrderIntent::limit_maker(pair(), OrderSide::Buy, Price::new(dec!(1996)), Size::new(dec!(0.01))),
            OrderIntent::limit_maker(pair(), OrderSide::Sell, Price::new(dec!(2004)), Size::new(dec!(0.01))),
        );
        assert!(paper.adjust(proposal, true).is_empty());
    }

    #[test]
    fn test_config_validation() {
        assert!(PaperConfig::default().validate().is_ok());

        let bad_tick = PaperConfig {
            tick_size: Decimal::ZERO,
            ..Default::default()
        };
        assert!(matches!(bad_tick.validate(), Err(ExecutorError::InvalidConfig(_))));

        let bad_fee = PaperConfig {
            maker_fee: dec!(1.5),
            ..Default::default()
        };
        assert!(bad_fee.validate().is_err());
        assert!(PaperConnector::new(bad_fee, pair()).is_err());
    }

    #[test]
    fn test_config_toml_defaults() {
        let config: PaperConfig = toml::from_str(
            r#"
            name = "paper"
            maker_fee = "0"

            [initial_balances]
            ETH = "2"
            USDT = "500"
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "paper");
        assert_eq!(config.maker_fee, Decimal::ZERO);
        assert_eq!(config.initial_balances.get("USDT"), Some(&dec!(500)));
        assert_eq!(config.tick_size, dec!(0.01));
    }
}
