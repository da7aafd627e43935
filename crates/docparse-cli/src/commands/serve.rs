//! Serve command - expose the function over HTTP.

use super::{build_handler, GlobalOpts};
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use docparse_core::HandlerResponse;
use docparse_handler::Handler;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;
use tracing::info;

pub fn run(opts: &GlobalOpts, addr: &str) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", addr))?;
    let handler = Arc::new(build_handler(opts)?);

    let rt = Runtime::new().context("Failed to create async runtime")?;
    rt.block_on(async move {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        info!("Listening on {}", addr);

        axum::serve(listener, router(handler))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")
    })
}

/// Routes: `POST /` runs the function, `GET /health` reports liveness.
pub fn router(handler: Arc<Handler>) -> Router {
    Router::new()
        .route("/", post(invoke))
        .route("/health", get(|| async { "OK" }))
        .with_state(handler)
}

async fn invoke(State(handler): State<Arc<Handler>>, body: Bytes) -> Json<HandlerResponse> {
    Json(handler.handle_json(&body).await)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
