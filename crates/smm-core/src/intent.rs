//! Order intents produced by the quoting pipeline.

use serde::{Deserialize, Serialize};

use crate::order::{OrderSide, OrderType};
use crate::pair::TradingPair;
use crate::{Price, Size};

/// A not-yet-submitted order the strategy wants placed.
///
/// Intents are immutable: trimming the amount yields a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub pair: TradingPair,
    pub side: OrderSide,
    pub price: Price,
    pub amount: Size,
    pub is_maker: bool,
    pub order_type: OrderType,
}

impl OrderIntent {
    /// Create a resting limit maker intent.
    pub fn limit_maker(pair: TradingPair, side: OrderSide, price: Price, amount: Size) -> Self {
        Self {
            pair,
            side,
            price,
            amount,
            is_maker: true,
            order_type: OrderType::Limit,
        }
    }

    /// Same intent with a different amount.
    #[must_use]
    pub fn with_amount(&self, amount: Size) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}

/// Ordered list of intents for one tick. Either empty or one buy then one sell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal(Vec<OrderIntent>);

impl Proposal {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Two-sided quote, buy first.
    pub fn two_sided(buy: OrderIntent, sell: OrderIntent) -> Self {
        Self(vec![buy, sell])
    }

    pub fn from_intents(intents: Vec<OrderIntent>) -> Self {
        Self(intents)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderIntent> {
        self.0.iter()
    }

    /// First intent on `side`, if any.
    pub fn leg(&self, side: OrderSide) -> Option<&OrderIntent> {
        self.0.iter().find(|i| i.side == side)
    }
}

impl IntoIterator for Proposal {
    type Item = OrderIntent;
    type IntoIter = std::vec::IntoIter<OrderIntent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Proposal {
    type Item = &'a OrderIntent;
    type IntoIter = std::slice::Iter<'a, OrderIntent>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
