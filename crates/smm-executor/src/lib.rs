//! Venue adapters for the smart market maker.
//!
//! Only one venue exists today: a paper-trading account that simulates
//! balances and resting orders against live top-of-book prices.
//!
//! # Key Components
//!
//! - [`PaperConnector`]: [`smm_mm::Connector`] and [`smm_mm::BudgetChecker`] for the paper account
//! - [`PaperConfig`]: starting balances, tick/lot sizes and maker fee
//! - [`fit_to_budget`]: leg-by-leg collateral reservation used by the budget checker

pub mod budget;
pub mod error;
pub mod paper;

pub use budget::{collateral, fit_to_budget, BudgetPool};
pub use error::{ExecutorError, ExecutorResult};
pub use paper::{PaperConfig, PaperConnector};
