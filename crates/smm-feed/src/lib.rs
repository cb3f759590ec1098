//! Market data for the smart market maker.
//!
//! Polls a public REST API for candles and top of book, and keeps the
//! bounded candle window the quoting pipeline reads its indicators from.

pub mod error;
pub mod indicators;
pub mod parser;
pub mod poller;
pub mod rest;
pub mod window;

pub use error::{FeedError, FeedResult};
pub use parser::Kline;
pub use poller::{FeedEvent, FeedPoller, PollerConfig};
pub use rest::RestClient;
pub use window::{AppendOutcome, IndicatorRow, IndicatorWindow, Indicators, WindowConfig};
