// ABOUTME: Axum router assembly and HTTP serving for the stream bridge.
// ABOUTME: Wires the chat routes, metrics endpoint, and shared state.

use crate::chat;
use crate::config::Config;
use crate::metrics;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use relay_agent::backends::process::ProcessBackend;
use relay_agent::{AgentHandle, AgentRegistry};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state behind the chat routes
pub struct AppState {
    pub config: Arc<Config>,
    /// Backend driven by POST /api/chat, chosen by [backend] config
    pub backend: AgentHandle,
    /// Process transport pinned to POST /api/chat-cli
    pub cli_backend: AgentHandle,
}

/// Construct the shared state from config, creating both transports
pub fn build_state(config: Config, registry: &AgentRegistry) -> Result<Arc<AppState>> {
    let backend = registry
        .create_from_config(&config.backend)
        .with_context(|| format!("Failed to create backend '{}'", config.backend.backend_type()))?;

    let cli_backend = ProcessBackend::new(config.cli.clone())
        .context("Failed to create CLI process backend")?
        .into_handle();

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        backend,
        cli_backend,
    }))
}

/// Assemble the router: chat routes, metrics, request tracing
pub fn build_router(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let chat_routes = Router::new()
        .route("/api/chat", post(chat::chat_handler))
        .route("/api/chat-cli", post(chat::chat_cli_handler))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(Arc::new(metrics_handle));

    Router::new()
        .merge(chat_routes)
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server and serve until shutdown
pub async fn serve(config: Config, registry: &AgentRegistry) -> Result<()> {
    let metrics_handle = metrics::init_metrics()?;

    let port = config.server.port;
    let config_bind = config.server.bind_address.clone();
    let state = build_state(config, registry)?;
    let app = build_router(state, metrics_handle);

    // Default to localhost, but allow override for Docker (needs 0.0.0.0)
    let bind_addr = std::env::var("RELAY_BIND_ADDRESS").unwrap_or(config_bind);
    let addr = format!("{}:{}", bind_addr, port);
    tracing::info!(addr = %addr, "Starting bridge server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Handle GET /metrics - returns Prometheus text format
async fn metrics_handler(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}
