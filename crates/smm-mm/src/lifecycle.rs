//! Order lifecycle: cancel everything resting, then place the new proposal.

use smm_core::{ClientOrderId, OrderIntent, OrderSide, Price, Size, TradingPair};
use smm_feed::IndicatorWindow;
use tracing::{debug, info, warn};

use crate::config::MakerConfig;
use crate::connector::Connector;
use crate::error::ConnectorError;
use crate::proposer::{propose, ProposalOutcome};

/// A submission the connector refused.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedSubmission {
    pub side: OrderSide,
    pub price: Price,
    pub amount: Size,
    pub error: ConnectorError,
}

/// What one reconcile did.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    /// Resting orders a cancel was issued for.
    pub cancelled: usize,
    /// Orders accepted by the connector, in submission order.
    pub submitted: Vec<(OrderSide, ClientOrderId)>,
    /// Orders the connector refused. Not retried.
    pub failed: Vec<FailedSubmission>,
    /// The proposal step's result.
    pub outcome: ProposalOutcome,
}

/// Cancel all resting orders for the pair, propose, and submit what survives.
///
/// Cancels are fire-and-forget. A failed leg is logged and reported but
/// does not stop its sibling.
pub fn reconcile<C>(connector: &mut C, window: &IndicatorWindow, config: &MakerConfig) -> ReconcileReport
where
    C: Connector + ?Sized,
{
    let cancelled = cancel_all(connector, &config.trading_pair);
    let outcome = propose(&*connector, window, config);

    let mut submitted = Vec::new();
    let mut failed = Vec::new();

    if let Some(proposal) = outcome.proposal() {
        for intent in proposal {
            match submit(connector, intent) {
                Ok(id) => {
                    info!(
                        connector = connector.name(),
                        side = %intent.side,
                        price = %intent.price,
                        amount = %intent.amount,
                        client_order_id = %id,
                        "Order submitted"
                    );
                    submitted.push((intent.side, id));
                }
                Err(error) => {
                    warn!(
                        connector = connector.name(),
                        side = %intent.side,
                        price = %intent.price,
                        amount = %intent.amount,
                        error = %error,
                        "Order submission failed"
                    );
                    failed.push(FailedSubmission {
                        side: intent.side,
                        price: intent.price,
                        amount: intent.amount,
                        error,
                    });
                }
            }
        }
    }

    ReconcileReport {
        cancelled,
        submitted,
        failed,
        outcome,
    }
}

/// Issue a cancel for every resting order on `pair`. Returns how many.
pub fn cancel_all<C>(connector: &mut C, pair: &TradingPair) -> usize
where
    C: Connector + ?Sized,
{
    let orders = connector.active_orders(pair);
    for order in &orders {
        debug!(client_order_id = %order.client_order_id, side = %order.side, "Cancelling order");
        connector.cancel(pair, &order.client_order_id);
    }
    orders.len()
}

// === Private helpers ===

fn submit<C>(connector: &mut C, intent: &OrderIntent) -> Result<ClientOrderId, ConnectorError>
where
    C: Connector + ?Sized,
{
    match intent.side {
        OrderSide::Buy => {
            connector.submit_buy(&intent.pair, intent.amount, intent.order_type, intent.price)
        }
        OrderSide::Sell => {
            connector.submit_sell(&intent.pair, intent.amount, intent.order_type, intent.price)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockConnector;
    use crate::proposer::SkipReason;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use smm_core::{ActiveOrder, Candle, OrderType};

    fn ready_window() -> IndicatorWindow {
        let mut window = IndicatorWindow::new(MakerConfig::default().window_config());
        for i in 0..20 {
            let close = if i % 2 == 0 { 2000 } else { 2001 };
            window.append(Candle::flat(i * 60_000, Price::new(Decimal::from(close))));
        }
        window
    }

    fn funded_connector() -> MockConnector {
        let mut connector = MockConnector::new();
        connector.set_price(Price::new(dec!(2000)));
        connector.set_balance("ETH", dec!(0.5));
        connector.set_balance("USDT", dec!(1000));
        connector
    }

    fn resting(side: OrderSide) -> ActiveOrder {
        ActiveOrder {
            pair: TradingPair::new("ETH", "USDT"),
            client_order_id: ClientOrderId::new(side),
            side,
            price: Price::new(dec!(1999)),
            amount: Size::new(dec!(0.01)),
            created_at_ms: 0,
        }
    }

    #[test]
    fn test_reconcile_cancels_then_places() {
        let mut connector = funded_connector();
        connector.add_resting(resting(OrderSide::Buy));
        connector.add_resting(resting(OrderSide::Sell));

        let report = reconcile(&mut connector, &ready_window(), &MakerConfig::default());

        assert_eq!(report.cancelled, 2);
        assert_eq!(connector.cancels().len(), 2);
        assert_eq!(report.submitted.len(), 2);
        assert_eq!(report.submitted[0].0, OrderSide::Buy);
        assert_eq!(report.submitted[1].0, OrderSide::Sell);
        assert!(report.failed.is_empty());
        // Only the two new orders rest.
        assert_eq!(connector.active_orders(&TradingPair::new("ETH", "USDT")).len(), 2);
    }

    #[test]
    fn test_submission_preserves_intent() {
        let mut connector = funded_connector();
        let report = reconcile(&mut connector, &ready_window(), &MakerConfig::default());

        let proposal = report.outcome.proposal().unwrap();
        for (intent, sub) in proposal.iter().zip(connector.submissions()) {
            assert_eq!(sub.side, intent.side);
            assert_eq!(sub.price, intent.price);
            assert_eq!(sub.amount, intent.amount);
            assert_eq!(sub.order_type, OrderType::Limit);
        }
    }

    #[test]
    fn test_failed_leg_does_not_block_sibling() {
        let mut connector = funded_connector();
        connector.fail_next(OrderSide::Buy);

        let report = reconcile(&mut connector, &ready_window(), &MakerConfig::default());

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].side, OrderSide::Buy);
        assert_eq!(report.submitted.len(), 1);
        assert_eq!(report.submitted[0].0, OrderSide::Sell);
    }

    #[test]
    fn test_skipped_proposal_still_cancels() {
        let mut connector = funded_connector();
        connector.add_resting(resting(OrderSide::Buy));
        let empty = IndicatorWindow::new(MakerConfig::default().window_config());

        let report = reconcile(&mut connector, &empty, &MakerConfig::default());

        assert_eq!(report.cancelled, 1);
        assert!(report.submitted.is_empty());
        assert_eq!(report.outcome.skip_reason(), Some(SkipReason::IndicatorsNotReady));
        assert!(connector.submissions().is_empty());
    }

    #[test]
    fn test_cancel_all_only_touches_pair() {
        let mut connector = funded_connector();
        connector.add_resting(resting(OrderSide::Buy));
        let mut other = resting(OrderSide::Sell);
        other.pair = TradingPair::new("BTC", "USDT");
        connector.add_resting(other);

        assert_eq!(cancel_all(&mut connector, &TradingPair::new("ETH", "USDT")), 1);
        assert_eq!(connector.active_orders(&TradingPair::new("BTC", "USDT")).len(), 1);
    }
}
