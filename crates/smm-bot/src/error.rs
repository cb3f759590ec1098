//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(#[from] smm_feed::FeedError),

    #[error("Executor error: {0}")]
    Executor(#[from] smm_executor::ExecutorError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] smm_telemetry::TelemetryError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
