//! Venue-reported execution state: resting orders and fills.

use serde::{Deserialize, Serialize};

use crate::order::{ClientOrderId, OrderSide};
use crate::pair::TradingPair;
use crate::{Price, Size};

// ============================================================================
// Resting Orders
// ============================================================================

/// An order resting on the venue that the bot placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveOrder {
    /// Pair the order rests on.
    pub pair: TradingPair,
    /// Identifier assigned at submission.
    pub client_order_id: ClientOrderId,
    /// Order side (buy/sell).
    pub side: OrderSide,
    /// Limit price.
    pub price: Price,
    /// Remaining amount in base units.
    pub amount: Size,
    /// Creation timestamp (Unix milliseconds).
    pub created_at_ms: u64,
}

impl ActiveOrder {
    /// Age of the order in whole seconds at `now_ms`.
    #[must_use]
    pub fn age_secs(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms) / 1000
    }
}

// ============================================================================
// Fills
// ============================================================================

/// A (possibly partial) execution of one of the bot's orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEvent {
    pub pair: TradingPair,
    pub side: OrderSide,
    /// Filled amount in base units.
    pub amount: Size,
    /// Execution price.
    pub price: Price,
    pub client_order_id: ClientOrderId,
    /// Execution timestamp (Unix milliseconds).
    pub timestamp_ms: u64,
}

impl FillEvent {
    /// Human-readable fill line: `BUY 0.0100 ETH-USDT at 1996.00`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} {:.4} {} at {:.2}",
            self.side,
            self.amount.inner(),
            self.pair,
            self.price.inner()
        )
    }
}
