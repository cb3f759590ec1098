//! Smart market maker application.
//!
//! Wires the components into one process:
//! - REST market data poller
//! - Paper-trading connector
//! - Market maker tick loop
//! - Prometheus metrics and status endpoint

pub mod app;
pub mod config;
pub mod error;
pub mod server;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use server::StatusBoard;
