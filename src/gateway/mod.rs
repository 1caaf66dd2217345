//! HTTP gateway — the axum server exposing the session/transcript API.

pub mod api;
pub mod error;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::config::Config;
use crate::sessions::{self, SessionStore};

/// Shared state handed to every request handler.
///
/// The store is constructed once at startup and injected here, so tests
/// can build an isolated state per router instead of sharing globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

/// Build the gateway router for the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sessions", post(api::handle_create_session))
        .route(
            "/sessions/{session_id}/messages",
            post(api::handle_add_message).get(api::handle_list_messages),
        )
        .route("/health", get(api::handle_health))
        .with_state(state)
}

/// Bind and serve the gateway until ctrl-c.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    crate::health::mark_started();

    let state = AppState::new(Arc::from(sessions::create_session_store()));
    let app = router(state)
        .layer(RequestBodyLimitLayer::new(config.gateway.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.gateway.request_timeout_secs,
        )));

    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind gateway to {host}:{port}"))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;
    info!(%addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server error")
}

async fn shutdown_signal() {
    // Shutdown on ctrl-c; ignore the error if no signal handler can be installed.
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
