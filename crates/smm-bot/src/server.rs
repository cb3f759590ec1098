//! Diagnostics HTTP server: Prometheus metrics and the operator status report.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use parking_lot::RwLock;
use smm_telemetry::Metrics;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Latest status text, written by the event loop and read by `/status`.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    text: Arc<RwLock<String>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, text: String) {
        *self.text.write() = text;
    }

    pub fn read(&self) -> String {
        self.text.read().clone()
    }
}

pub fn create_router(board: StatusBoard) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/status", get(get_status))
        .with_state(board)
}

async fn get_metrics() -> Response {
    match Metrics::render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn get_status(State(board): State<StatusBoard>) -> String {
    board.read()
}

/// Serve until the task is aborted.
pub async fn run_server(board: StatusBoard, port: u16) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Diagnostics server listening");

    axum::serve(listener, create_router(board))
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_board_publish() {
        let board = StatusBoard::new();
        assert_eq!(board.read(), "");

        let reader = board.clone();
        board.publish("Bot not ready".to_string());
        assert_eq!(reader.read(), "Bot not ready");
    }

    #[test]
    fn test_status_handler_returns_latest() {
        let board = StatusBoard::new();
        board.publish("No active orders".to_string());
        let body = tokio_test::block_on(get_status(State(board)));
        assert_eq!(body, "No active orders");
    }
}
