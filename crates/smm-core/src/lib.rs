//! Core domain types for the smart market maker.
//!
//! This crate provides the fundamental types shared by every other crate:
//! - `Price`, `Size`: precision-safe numeric types
//! - `TradingPair`: the single `BASE-QUOTE` pair being quoted
//! - `Candle`, `Bbo`: market data snapshots
//! - `OrderIntent`, `Proposal`: what the quoting pipeline wants to place
//! - `ActiveOrder`, `FillEvent`: what the venue reports back

pub mod candle;
pub mod decimal;
pub mod error;
pub mod execution;
pub mod intent;
pub mod order;
pub mod pair;

pub use candle::{Bbo, Candle};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use execution::{ActiveOrder, FillEvent};
pub use intent::{OrderIntent, Proposal};
pub use order::{ClientOrderId, OrderSide, OrderType};
pub use pair::TradingPair;
