//! The market maker: window, scheduler and lifecycle wired together.

use smm_core::{Candle, FillEvent};
use smm_feed::{AppendOutcome, IndicatorWindow};
use tracing::{debug, info};

use crate::config::MakerConfig;
use crate::connector::Connector;
use crate::lifecycle::{cancel_all, reconcile, ReconcileReport};
use crate::scheduler::{TickDecision, TickScheduler};
use crate::status::StatusSnapshot;

/// Result of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Connector not ready; nothing done.
    NotReady,
    /// Refresh interval still running; nothing done.
    NotDue { next_allowed_ms: u64 },
    /// A full cancel-propose-place cycle ran.
    Reconciled(ReconcileReport),
}

impl TickOutcome {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotReady => "not_ready",
            Self::NotDue { .. } => "not_due",
            Self::Reconciled(report) => match report.outcome.skip_reason() {
                None => "quoted",
                Some(reason) => reason.as_str(),
            },
        }
    }
}

/// Counts from feeding a candle batch into the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendSummary {
    pub appended: usize,
    pub dropped: usize,
}

/// Single-pair market maker.
///
/// Owns the candle window and the refresh state. The caller drives it with
/// candles, ticks and fills from one task.
#[derive(Debug)]
pub struct MarketMaker {
    config: MakerConfig,
    window: IndicatorWindow,
    scheduler: TickScheduler,
}

impl MarketMaker {
    /// Create a new market maker.
    pub fn new(config: MakerConfig) -> Self {
        let window = IndicatorWindow::new(config.window_config());
        let scheduler = TickScheduler::new(config.order_refresh_interval_ms);
        Self {
            config,
            window,
            scheduler,
        }
    }

    pub fn config(&self) -> &MakerConfig {
        &self.config
    }

    pub fn window(&self) -> &IndicatorWindow {
        &self.window
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Append candles in order, counting stored and dropped ones.
    pub fn on_candles(&mut self, candles: Vec<Candle>) -> AppendSummary {
        let mut summary = AppendSummary::default();
        for candle in candles {
            match self.window.append(candle) {
                AppendOutcome::Appended { .. } => summary.appended += 1,
                AppendOutcome::Dropped { .. } => summary.dropped += 1,
            }
        }
        if summary.appended > 0 {
            debug!(
                appended = summary.appended,
                dropped = summary.dropped,
                window_len = self.window.len(),
                "Candles appended"
            );
        }
        summary
    }

    /// Run one tick: reconcile if ready and the refresh interval has elapsed.
    ///
    /// Skipped proposals still count as a completed reconcile.
    pub fn on_tick<C>(&mut self, now_ms: u64, connector: &mut C) -> TickOutcome
    where
        C: Connector + ?Sized,
    {
        match self.scheduler.poll(now_ms, connector.is_ready_to_trade()) {
            TickDecision::NotReady => {
                debug!("Connector not ready, skipping tick");
                TickOutcome::NotReady
            }
            TickDecision::NotDue { next_allowed_ms } => TickOutcome::NotDue { next_allowed_ms },
            TickDecision::Due => {
                let report = reconcile(connector, &self.window, &self.config);
                self.scheduler.complete(now_ms);
                debug!(
                    cancelled = report.cancelled,
                    submitted = report.submitted.len(),
                    failed = report.failed.len(),
                    next_allowed_ms = self.scheduler.refresh().next_allowed_ms,
                    "Reconcile complete"
                );
                TickOutcome::Reconciled(report)
            }
        }
    }

    /// Log a fill and return its notification text.
    pub fn on_fill(&self, fill: &FillEvent) -> String {
        let msg = fill.summary();
        info!(
            side = %fill.side,
            amount = %fill.amount,
            price = %fill.price,
            client_order_id = %fill.client_order_id,
            "{msg}"
        );
        msg
    }

    /// Current status for operators.
    pub fn status<C>(&self, connector: &C, now_ms: u64) -> StatusSnapshot
    where
        C: Connector + ?Sized,
    {
        StatusSnapshot::capture(connector, &self.window, &self.config.trading_pair, now_ms)
    }

    /// Cancel every resting order for the pair. Used on shutdown.
    pub fn shutdown<C>(&mut self, connector: &mut C) -> usize
    where
        C: Connector + ?Sized,
    {
        let cancelled = cancel_all(connector, &self.config.trading_pair);
        info!(cancelled, "Cancelled resting orders on shutdown");
        cancelled
    }
}
