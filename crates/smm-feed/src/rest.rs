//! HTTP client for public market-data endpoints.

use crate::error::{FeedError, FeedResult};
use crate::parser::{parse_book_ticker, parse_klines, Kline};
use reqwest::Client;
use smm_core::Bbo;
use std::time::Duration;
use tracing::debug;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Binance-compatible `klines` and `bookTicker` endpoints.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// Create a new REST client.
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. "https://api.binance.com"
    pub fn new(base_url: impl Into<String>) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| FeedError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the most recent `limit` klines, oldest first.
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u16,
    ) -> FeedResult<Vec<Kline>> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.to_string();
        let body = self
            .get_json(&url, &[("symbol", symbol), ("interval", interval), ("limit", &limit)])
            .await?;

        let klines = parse_klines(&body)?;
        debug!(symbol, interval, count = klines.len(), "Fetched klines");
        Ok(klines)
    }

    /// Fetch the current best bid and offer.
    pub async fn fetch_book_ticker(&self, symbol: &str) -> FeedResult<Bbo> {
        let url = format!("{}/api/v3/ticker/bookTicker", self.base_url);
        let body = self.get_json(&url, &[("symbol", symbol)]).await?;
        parse_book_ticker(&body)
    }

    // === Private helpers ===

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> FeedResult<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FeedError::Http(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Http(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| FeedError::Http(format!("Failed to parse response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = RestClient::new("https://api.binance.com/").unwrap();
        assert_eq!(client.base_url(), "https://api.binance.com");
    }
}
