//! Background task that polls market data and forwards it over a channel.

use crate::parser::Kline;
use crate::rest::RestClient;
use smm_core::{Bbo, Candle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Event emitted by the poller.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Newly closed candles, oldest first.
    Candles(Vec<Candle>),
    /// Latest top of book.
    Bbo(Bbo),
    /// A fetch failed. The poller retries on its next interval.
    Error(String),
}

/// Poller settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Venue symbol, e.g. "ETHUSDT".
    pub symbol: String,
    /// Kline interval, e.g. "1m".
    pub interval: String,
    /// Klines requested per poll.
    pub kline_limit: u16,
    /// Delay between polls.
    pub poll_interval_ms: u64,
}

/// Polls klines and book ticker on a fixed interval.
pub struct FeedPoller {
    client: RestClient,
    config: PollerConfig,
    last_emitted_ms: Option<i64>,
}

impl FeedPoller {
    /// Create a new poller.
    pub fn new(client: RestClient, config: PollerConfig) -> Self {
        Self {
            client,
            config,
            last_emitted_ms: None,
        }
    }

    /// Run until the receiving side of `tx` is dropped.
    ///
    /// Fetch failures are logged, forwarded as `FeedEvent::Error`, and retried
    /// on the next interval.
    pub async fn run(mut self, tx: mpsc::Sender<FeedEvent>) {
        info!(
            symbol = %self.config.symbol,
            interval = %self.config.interval,
            poll_interval_ms = self.config.poll_interval_ms,
            "Feed poller started"
        );

        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.poll_interval_ms));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if !self.poll_once(&tx).await {
                info!("Feed channel closed, stopping poller");
                break;
            }
        }
    }

    /// One poll cycle. Returns false once the channel is closed.
    async fn poll_once(&mut self, tx: &mpsc::Sender<FeedEvent>) -> bool {
        match self
            .client
            .fetch_klines(&self.config.symbol, &self.config.interval, self.config.kline_limit)
            .await
        {
            Ok(klines) => {
                let now_ms = chrono::Utc::now().timestamp_millis();
                let fresh = closed_since(&klines, self.last_emitted_ms, now_ms);
                if let Some(last) = fresh.last() {
                    self.last_emitted_ms = Some(last.timestamp_ms);
                    debug!(count = fresh.len(), "Forwarding closed candles");
                    if tx.send(FeedEvent::Candles(fresh)).await.is_err() {
                        return false;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, symbol = %self.config.symbol, "Kline fetch failed");
                if tx.send(FeedEvent::Error(e.to_string())).await.is_err() {
                    return false;
                }
            }
        }

        match self.client.fetch_book_ticker(&self.config.symbol).await {
            Ok(bbo) => {
                if tx.send(FeedEvent::Bbo(bbo)).await.is_err() {
                    return false;
                }
            }
            Err(e) => {
                warn!(error = %e, symbol = %self.config.symbol, "Book ticker fetch failed");
                if tx.send(FeedEvent::Error(e.to_string())).await.is_err() {
                    return false;
                }
            }
        }

        true
    }
}

/// Closed klines newer than `last_emitted_ms`, oldest first.
pub fn closed_since(klines: &[Kline], last_emitted_ms: Option<i64>, now_ms: i64) -> Vec<Candle> {
    klines
        .iter()
        .filter(|k| k.is_closed(now_ms))
        .filter(|k| last_emitted_ms.map_or(true, |last| k.candle.timestamp_ms > last))
        .map(|k| k.candle.clone())
        .collect()
}
