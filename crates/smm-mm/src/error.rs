//! Connector error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Why a venue refused or failed an order request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectorError {
    #[error("Connector not ready")]
    NotReady,

    #[error("Unknown trading pair: {0}")]
    UnknownPair(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Insufficient {asset} balance: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("Order rejected: {0}")]
    Rejected(String),
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;
