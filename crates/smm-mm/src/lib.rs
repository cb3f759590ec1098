//! Quoting pipeline for the smart market maker.
//!
//! Turns candles, balances and a reference price into a two-sided limit
//! maker quote on a fixed refresh cadence:
//! - Spread widened by short-term volatility
//! - Size reduced when inventory is skewed
//! - Quoting suppressed in strong trends
//! - Proposal trimmed to available budget
//!
//! # Architecture
//!
//! ```text
//! tick → MarketMaker.on_tick()
//!          ├─ TickScheduler: ready? refresh elapsed?
//!          └─ reconcile()
//!               ├─ cancel_all(): cancel resting orders
//!               ├─ propose(): IndicatorWindow → spread, trend filter, sizing → BudgetChecker
//!               └─ Connector.submit_buy / submit_sell
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod maker;
pub mod mock;
pub mod proposer;
pub mod scheduler;
pub mod spread;
pub mod status;
pub mod trend;

pub use config::MakerConfig;
pub use connector::{BudgetChecker, Connector, PriceType};
pub use error::{ConnectorError, ConnectorResult};
pub use inventory::{compute_amount, SizingDecision};
pub use lifecycle::{cancel_all, reconcile, FailedSubmission, ReconcileReport};
pub use maker::{AppendSummary, MarketMaker, TickOutcome};
pub use mock::MockConnector;
pub use proposer::{propose, ProposalOutcome, QuoteContext, SkipReason};
pub use scheduler::{RefreshState, SchedulerState, TickDecision, TickScheduler};
pub use spread::{compute_half_spread, quote_prices};
pub use status::{StatusReport, StatusSnapshot};
pub use trend::should_suppress;
