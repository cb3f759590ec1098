//! Prometheus metrics and structured logging for the smart market maker.
//!
//! - Prometheus metrics for ticks, orders, fills and quote inputs
//! - Structured JSON logging with tracing

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::Metrics;
