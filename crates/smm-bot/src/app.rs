//! Main application orchestration.
//!
//! Coordinates all components:
//! - Market data poller (candles + book ticker)
//! - Paper connector (balances, resting orders, fills)
//! - Market maker tick (cancel, propose, place)
//! - Status reporting and diagnostics server
//!
//! The maker and connector are owned by the event loop and touched from one
//! task only. Feed events, ticks and status refreshes are handled serially.

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::server::{run_server, StatusBoard};
use rust_decimal::prelude::ToPrimitive;
use smm_executor::PaperConnector;
use smm_feed::{FeedEvent, FeedPoller, RestClient};
use smm_mm::{MarketMaker, SkipReason, TickOutcome};
use smm_telemetry::Metrics;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Feed channel capacity.
const FEED_CHANNEL_CAPACITY: usize = 64;

/// Main application.
pub struct Application {
    config: AppConfig,
    maker: MarketMaker,
    connector: PaperConnector,
    status_board: StatusBoard,
    fill_count: u64,
}

impl Application {
    /// Create a new application.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;
        let connector =
            PaperConnector::new(config.exchange.clone(), config.maker.trading_pair.clone())?;
        let maker = MarketMaker::new(config.maker.clone());

        Ok(Self {
            config,
            maker,
            connector,
            status_board: StatusBoard::new(),
            fill_count: 0,
        })
    }

    pub fn maker(&self) -> &MarketMaker {
        &self.maker
    }

    pub fn connector(&self) -> &PaperConnector {
        &self.connector
    }

    pub fn status_board(&self) -> &StatusBoard {
        &self.status_board
    }

    /// Number of fills seen so far.
    pub fn fill_count(&self) -> u64 {
        self.fill_count
    }

    /// Apply one feed event. Returns fill notifications it produced.
    pub fn handle_feed_event(&mut self, event: FeedEvent, now_ms: u64) -> Vec<String> {
        match event {
            FeedEvent::Candles(candles) => {
                let summary = self.maker.on_candles(candles);
                Metrics::candles(summary.appended, summary.dropped, self.maker.window().len());
                Vec::new()
            }
            FeedEvent::Bbo(bbo) => {
                self.connector.set_now_ms(now_ms);
                let fills = self.connector.on_bbo(bbo);
                self.fill_count += fills.len() as u64;

                fills
                    .iter()
                    .map(|fill| {
                        Metrics::fill(fill.side.as_str());
                        self.maker.on_fill(fill)
                    })
                    .collect()
            }
            FeedEvent::Error(_) => {
                Metrics::feed_error();
                Vec::new()
            }
        }
    }

    /// Run one tick of the market maker and record its metrics.
    pub fn handle_tick(&mut self, now_ms: u64) -> TickOutcome {
        self.connector.set_now_ms(now_ms);
        let outcome = self.maker.on_tick(now_ms, &mut self.connector);
        Metrics::tick(outcome.label());

        if let TickOutcome::Reconciled(report) = &outcome {
            Metrics::orders_cancelled(report.cancelled);
            for (side, _) in &report.submitted {
                Metrics::order_submitted(side.as_str());
            }
            for failed in &report.failed {
                Metrics::order_failed(failed.side.as_str());
            }

            if let Some(ctx) = report.outcome.context() {
                Metrics::quote_inputs(
                    ctx.trend_signal,
                    ctx.volatility,
                    ctx.half_spread.to_f64().unwrap_or_default(),
                    ctx.sizing.inventory_ratio.to_f64().unwrap_or_default(),
                );
            } else if let Some(SkipReason::SuppressedByTrend { trend_signal }) =
                report.outcome.skip_reason()
            {
                Metrics::trend_signal(trend_signal);
            }
            Metrics::next_refresh(self.maker.scheduler().refresh().next_allowed_ms);
        }

        outcome
    }

    /// Render the status report and publish it for `/status`.
    pub fn refresh_status(&self, now_ms: u64) -> String {
        let text = self.maker.status(&self.connector, now_ms).to_string();
        self.status_board.publish(text.clone());
        text
    }

    /// Cancel resting orders. Returns how many were cancelled.
    pub fn shutdown(&mut self) -> usize {
        let cancelled = self.maker.shutdown(&mut self.connector);
        Metrics::orders_cancelled(cancelled);
        cancelled
    }

    /// Run the application until ctrl-c.
    pub async fn run(mut self) -> AppResult<()> {
        info!(
            pair = %self.config.maker.trading_pair,
            venue = %self.config.exchange.name,
            candle_exchange = %self.config.feed.candle_exchange,
            "Starting application"
        );

        let (feed_tx, mut feed_rx) = mpsc::channel::<FeedEvent>(FEED_CHANNEL_CAPACITY);

        let client = RestClient::new(&self.config.feed.base_url)?;
        let poller = FeedPoller::new(client, self.config.poller_config());
        let feed_handle = tokio::spawn(poller.run(feed_tx));

        let server_handle = if self.config.telemetry.enabled {
            let board = self.status_board.clone();
            let port = self.config.telemetry.metrics_port;
            Some(tokio::spawn(async move {
                if let Err(e) = run_server(board, port).await {
                    error!(error = %e, "Diagnostics server stopped");
                }
            }))
        } else {
            None
        };

        let mut tick_interval =
            tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // A zero period would panic in `interval`; the log simply never fires then.
        let status_secs = self.config.telemetry.status_log_interval_secs;
        let mut status_interval =
            tokio::time::interval(Duration::from_secs(status_secs.max(1)));

        info!("Entering main event loop");

        loop {
            tokio::select! {
                Some(event) = feed_rx.recv() => {
                    self.handle_feed_event(event, now_ms());
                }

                _ = tick_interval.tick() => {
                    let now = now_ms();
                    self.handle_tick(now);
                    self.refresh_status(now);
                }

                _ = status_interval.tick() => {
                    if status_secs > 0 {
                        let status = self.refresh_status(now_ms());
                        info!("Status:\n{status}");
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        let cancelled = self.shutdown();
        info!(cancelled, fills = self.fill_count, "Shutting down");

        feed_handle.abort();
        if let Some(handle) = server_handle {
            handle.abort();
        }

        Ok(())
    }
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
