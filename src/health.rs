//! Liveness endpoint
//!
//! Serves `GET /ping` with a fixed payload. It shares nothing with the
//! reconciliation loop, so it keeps answering while a pass runs or fails.

use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub const PING_PATH: &str = "/ping";
pub const PING_RESPONSE: &str = "pong!";

pub async fn ping() -> &'static str {
    PING_RESPONSE
}

pub fn router() -> Router {
    Router::new().route(PING_PATH, get(ping))
}

/// Bind the health listener. Failure here is fatal for the process.
pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await
}

/// Serve the health router until the process exits
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(bind = %addr, "Starting health check listener at {}", PING_PATH);
    }
    axum::serve(listener, router()).await
}
