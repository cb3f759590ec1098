//! In-memory connector for tests.

use std::collections::HashMap;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use smm_core::{ActiveOrder, ClientOrderId, OrderSide, OrderType, Price, Proposal, Size, TradingPair};

use crate::connector::{BudgetChecker, Connector, PriceType};
use crate::error::{ConnectorError, ConnectorResult};

/// A submission the mock accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSubmission {
    pub side: OrderSide,
    pub pair: TradingPair,
    pub amount: Size,
    pub order_type: OrderType,
    pub price: Price,
}

/// Mock connector for testing.
///
/// Quotes a single price for every [`PriceType`], keeps submitted orders as
/// resting until cancelled, and records every call for verification.
#[derive(Debug)]
pub struct MockConnector {
    ready: bool,
    price: Option<Price>,
    balances: HashMap<String, Decimal>,
    orders: Vec<ActiveOrder>,
    submissions: Vec<RecordedSubmission>,
    cancels: Vec<ClientOrderId>,
    /// Sides whose next submission fails.
    fail_sides: Vec<OrderSide>,
    budget: MockBudget,
    now_ms: u64,
}

/// Budget checker half of the mock.
#[derive(Debug)]
struct MockBudget {
    ok: bool,
    calls: Mutex<Vec<Proposal>>,
}

impl BudgetChecker for MockBudget {
    fn adjust(&self, proposal: Proposal, _all_or_none: bool) -> Proposal {
        self.calls.lock().push(proposal.clone());
        if self.ok {
            proposal
        } else {
            Proposal::empty()
        }
    }
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    /// Create a ready, empty mock.
    pub fn new() -> Self {
        Self {
            ready: true,
            price: None,
            balances: HashMap::new(),
            orders: Vec::new(),
            submissions: Vec::new(),
            cancels: Vec::new(),
            fail_sides: Vec::new(),
            budget: MockBudget {
                ok: true,
                calls: Mutex::new(Vec::new()),
            },
            now_ms: 0,
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn set_price(&mut self, price: Price) {
        self.price = Some(price);
    }

    pub fn clear_price(&mut self) {
        self.price = None;
    }

    pub fn set_balance(&mut self, asset: &str, amount: Decimal) {
        self.balances.insert(asset.to_string(), amount);
    }

    /// Whether the budget checker passes proposals through or empties them.
    pub fn set_budget_ok(&mut self, ok: bool) {
        self.budget.ok = ok;
    }

    /// Make the next submission on `side` fail.
    pub fn fail_next(&mut self, side: OrderSide) {
        self.fail_sides.push(side);
    }

    /// Timestamp stamped on new resting orders.
    pub fn set_now_ms(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    /// Seed a resting order directly.
    pub fn add_resting(&mut self, order: ActiveOrder) {
        self.orders.push(order);
    }

    pub fn submissions(&self) -> &[RecordedSubmission] {
        &self.submissions
    }

    pub fn cancels(&self) -> &[ClientOrderId] {
        &self.cancels
    }

    /// Number of `adjust` calls so far.
    pub fn budget_calls(&self) -> usize {
        self.budget.calls.lock().len()
    }

    fn submit(
        &mut self,
        side: OrderSide,
        pair: &TradingPair,
        amount: Size,
        order_type: OrderType,
        price: Price,
    ) -> ConnectorResult<ClientOrderId> {
        if let Some(pos) = self.fail_sides.iter().position(|s| *s == side) {
            self.fail_sides.remove(pos);
            return Err(ConnectorError::Rejected(format!("mock {side} failure")));
        }

        let id = ClientOrderId::new(side);
        self.submissions.push(RecordedSubmission {
            side,
            pair: pair.clone(),
            amount,
            order_type,
            price,
        });
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
}

impl Connector for MockConnector {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_ready_to_trade(&self) -> bool {
        self.ready
    }

    fn reference_price(&self, _pair: &TradingPair, _price_type: PriceType) -> Option<Price> {
        self.price
    }

    fn balance(&self, asset: &str) -> Option<Decimal> {
        self.balances.get(asset).copied()
    }

    fn active_orders(&self, pair: &TradingPair) -> Vec<ActiveOrder> {
        self.orders.iter().filter(|o| &o.pair == pair).cloned().collect()
    }

    fn cancel(&mut self, _pair: &TradingPair, client_order_id: &ClientOrderId) {
        self.cancels.push(client_order_id.clone());
        self.orders.retain(|o| &o.client_order_id != client_order_id);
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
        &self.budget
    }
}
