//! End-to-end tick pipeline against the paper connector.
//!
//! Each test drives a `MarketMaker` with candles and a book, runs ticks, and
//! checks what the paper account ends up holding.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use smm_core::{Bbo, Candle, OrderSide, OrderType, Price, Size, TradingPair};
use smm_executor::{PaperConfig, PaperConnector};
use smm_mm::{Connector, MakerConfig, MarketMaker, SkipReason, TickOutcome};

// ============================================================================
// Helpers
// ============================================================================

fn pair() -> TradingPair {
    TradingPair::new("ETH", "USDT")
}

fn paper(eth: Decimal, usdt: Decimal) -> PaperConnector {
    let config = PaperConfig {
        initial_balances: BTreeMap::from([("ETH".to_string(), eth), ("USDT".to_string(), usdt)]),
        ..PaperConfig::default()
    };
    let mut connector = PaperConnector::new(config, pair()).unwrap();
    // Mid is exactly 2000.
    connector.on_bbo(Bbo::new(Price::new(dec!(1999.99)), Price::new(dec!(2000.01))));
    connector
}

/// 20 one-minute candles whose closes alternate between `low` and `high`.
fn alternating(low: Decimal, high: Decimal) -> Vec<Candle> {
    (0..20)
        .map(|i| {
            let close = if i % 2 == 0 { low } else { high };
            Candle::flat(i * 60_000, Price::new(close))
        })
        .collect()
}

fn maker_with(candles: Vec<Candle>) -> MarketMaker {
    let mut maker = MarketMaker::new(MakerConfig::default());
    maker.on_candles(candles);
    maker
}

fn leg_price(connector: &PaperConnector, side: OrderSide) -> Price {
    connector
        .active_orders(&pair())
        .into_iter()
        .find(|o| o.side == side)
        .map(|o| o.price)
        .unwrap()
}

fn reconciled(outcome: TickOutcome) -> smm_mm::ReconcileReport {
    match outcome {
        TickOutcome::Reconciled(report) => report,
        other => panic!("expected a reconcile, got {other:?}"),
    }
}

// ============================================================================
// Quote shape
// ============================================================================

#[test]
fn test_low_volatility_quotes_near_two_bps_of_mid() {
    // Sample std of the last ten closes is ~0.002.
    let mut maker = maker_with(alternating(dec!(2000), dec!(2000.0038)));
    let mut connector = paper(dec!(1), dec!(2000));

    let report = reconciled(maker.on_tick(0, &mut connector));

    let ctx = report.outcome.context().copied().unwrap();
    assert!((ctx.volatility - 0.002).abs() < 1e-5, "volatility={}", ctx.volatility);
    assert!((ctx.half_spread - dec!(0.002)).abs() < dec!(0.00001));

    let bid = leg_price(&connector, OrderSide::Buy).inner();
    let ask = leg_price(&connector, OrderSide::Sell).inner();
    assert!((bid - dec!(1996)).abs() <= dec!(0.01), "bid={bid}");
    assert!((ask - dec!(2004)).abs() <= dec!(0.01), "ask={ask}");
    assert!(bid < dec!(2000) && dec!(2000) < ask);

    for order in connector.active_orders(&pair()) {
        assert_eq!(order.amount, Size::new(dec!(0.01)));
    }
}

#[test]
fn test_skewed_inventory_halves_size() {
    // 0.85 ETH * 2000 = 1700 of 2000 total.
    let mut maker = maker_with(alternating(dec!(2000), dec!(2001)));
    let mut connector = paper(dec!(0.85), dec!(300));

    let report = reconciled(maker.on_tick(0, &mut connector));

    let ctx = report.outcome.context().copied().unwrap();
    assert_eq!(ctx.sizing.inventory_ratio, dec!(0.85));
    assert!(ctx.sizing.skewed);
    assert_eq!(report.submitted.len(), 2);
    for order in connector.active_orders(&pair()) {
        assert_eq!(order.amount, Size::new(dec!(0.005)));
    }
}

// ============================================================================
// Skips
// ============================================================================

#[test]
fn test_strong_trend_places_nothing_and_waits() {
    let rising = (0..20)
        .map(|i| Candle::flat(i * 60_000, Price::new(Decimal::from(2000 + i))))
        .collect();
    let mut maker = maker_with(rising);
    let mut connector = paper(dec!(1), dec!(2000));

    let report = reconciled(maker.on_tick(0, &mut connector));

    match report.outcome.skip_reason() {
        Some(SkipReason::SuppressedByTrend { trend_signal }) => assert!(trend_signal > 75.0),
        other => panic!("expected trend suppression, got {other:?}"),
    }
    assert!(report.submitted.is_empty());
    assert!(connector.active_orders(&pair()).is_empty());
    assert_eq!(maker.scheduler().refresh().next_allowed_ms, 15_000);
}

#[test]
fn test_unfunded_proposal_cancels_prior_orders_and_advances_timer() {
    let mut maker = maker_with(alternating(dec!(2000), dec!(2001)));
    let mut connector = paper(dec!(1), dec!(8));
    connector
        .submit_buy(&pair(), Size::new(dec!(0.001)), OrderType::Limit, Price::new(dec!(1000)))
        .unwrap();

    let report = reconciled(maker.on_tick(0, &mut connector));

    assert_eq!(report.cancelled, 1);
    assert_eq!(report.outcome.skip_reason(), Some(SkipReason::InsufficientBudget));
    assert!(report.submitted.is_empty());
    assert!(connector.active_orders(&pair()).is_empty());
    assert_eq!(connector.available_balance("USDT"), Some(dec!(8)));
    assert_eq!(maker.scheduler().refresh().next_allowed_ms, 15_000);
}

#[test]
fn test_tick_inside_refresh_window_is_noop() {
    let mut maker = maker_with(alternating(dec!(2000), dec!(2001)));
    let mut connector = paper(dec!(1), dec!(2000));

    reconciled(maker.on_tick(0, &mut connector));
    let before: Vec<_> = connector
        .active_orders(&pair())
        .into_iter()
        .map(|o| o.client_order_id)
        .collect();

    assert_eq!(
        maker.on_tick(5_000, &mut connector),
        TickOutcome::NotDue { next_allowed_ms: 15_000 }
    );
    let after: Vec<_> = connector
        .active_orders(&pair())
        .into_iter()
        .map(|o| o.client_order_id)
        .collect();
    assert_eq!(before, after);

    // Due again once the window has elapsed: old quotes replaced.
    let report = reconciled(maker.on_tick(15_000, &mut connector));
    assert_eq!(report.cancelled, 2);
    assert_eq!(report.submitted.len(), 2);
    assert!(connector
        .active_orders(&pair())
        .iter()
        .all(|o| !before.contains(&o.client_order_id)));
}

#[test]
fn test_warmup_waits_for_enough_candles() {
    let mut maker = maker_with(alternating(dec!(2000), dec!(2001)).into_iter().take(14).collect());
    let mut connector = paper(dec!(1), dec!(2000));

    let report = reconciled(maker.on_tick(0, &mut connector));
    assert_eq!(report.outcome.skip_reason(), Some(SkipReason::IndicatorsNotReady));

    maker.on_candles(vec![Candle::flat(14 * 60_000, Price::new(dec!(2000)))]);
    let report = reconciled(maker.on_tick(15_000, &mut connector));
    assert_eq!(report.outcome.skip_reason(), None);
    assert_eq!(report.submitted.len(), 2);
}

// ============================================================================
// Fills
// ============================================================================

#[test]
fn test_fill_moves_inventory_and_next_quote_follows() {
    let mut maker = maker_with(alternating(dec!(2000), dec!(2001)));
    let mut connector = paper(dec!(1), dec!(2000));
    reconciled(maker.on_tick(0, &mut connector));

    let bid = leg_price(&connector, OrderSide::Buy);
    let fills = connector.on_bbo(Bbo::new(Price::new(bid.inner() - dec!(1)), bid));
    assert_eq!(fills.len(), 1);
    assert_eq!(maker.on_fill(&fills[0]), format!("BUY 0.0100 ETH-USDT at {:.2}", bid.inner()));
    assert_eq!(connector.balance("ETH"), Some(dec!(1.01)));

    // The sell leg still rests until the next refresh replaces it.
    assert_eq!(connector.active_orders(&pair()).len(), 1);
    let report = reconciled(maker.on_tick(15_000, &mut connector));
    assert_eq!(report.cancelled, 1);
    assert_eq!(report.submitted.len(), 2);
}
