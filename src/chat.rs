// ABOUTME: Chat route handlers bridging one HTTP request to one agent runtime invocation.
// ABOUTME: POST /api/chat drives the configured backend, /api/chat-cli the CLI process.

use crate::bridge;
use crate::frames::{DATA_STREAM_HEADER, DATA_STREAM_VERSION};
use crate::metrics;
use crate::server::AppState;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::StreamExt;
use relay_agent::AgentHandle;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

const MAX_PROMPT_LENGTH: usize = 64 * 1024;

const CLI_INSTALL_HINT: &str =
    "Make sure the agent CLI is installed and the [cli] binary path points at it";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Handle POST /api/chat - the backend selected by [backend] config
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    metrics::record_session(state.backend.name());
    respond(state.clone(), state.backend.clone(), payload, None).await
}

/// Handle POST /api/chat-cli - always the process transport
pub async fn chat_cli_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    metrics::record_session("cli");
    respond(
        state.clone(),
        state.cli_backend.clone(),
        payload,
        Some(CLI_INSTALL_HINT),
    )
    .await
}

/// Shared request-to-stream path. Failures before the stream opens return a
/// non-stream JSON error; once the stream is open, failures travel in-band.
async fn respond(
    state: Arc<AppState>,
    handle: AgentHandle,
    payload: Result<Json<ChatRequest>, JsonRejection>,
    hint: Option<&str>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            metrics::record_error("bad_payload");
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid request payload: {}", rejection.body_text()),
                None,
            );
        }
    };

    tracing::info!(
        backend = handle.name(),
        messages = payload.messages.len(),
        "Chat request received"
    );

    // Only the most recent message is forwarded; history is accepted but not
    // threaded through to the runtime
    let prompt = payload
        .messages
        .last()
        .map(|message| message.content.clone())
        .unwrap_or_default();

    if prompt.trim().is_empty() {
        metrics::record_error("empty_prompt");
        return error_response(
            StatusCode::BAD_REQUEST,
            "Prompt cannot be empty".to_string(),
            None,
        );
    }

    if prompt.len() > MAX_PROMPT_LENGTH {
        metrics::record_error("prompt_too_large");
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Prompt too large (max {} bytes)", MAX_PROMPT_LENGTH),
            None,
        );
    }

    let request = state.config.build_prompt_request(prompt);

    let receiver = match handle.prompt(request).await {
        Ok(receiver) => receiver,
        Err(e) => {
            tracing::error!(error = %e, backend = handle.name(), "Failed to start prompt");
            metrics::record_error("prompt_start");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
                hint.map(str::to_string),
            );
        }
    };

    let (frames_tx, frames_rx) = mpsc::channel::<String>(64);
    let timeout = state.config.server.session_timeout();

    tokio::spawn(async move {
        // Timing out drops the receiver, which the transport treats exactly
        // like a consumer disconnect
        if tokio::time::timeout(timeout, bridge::pump(receiver, frames_tx))
            .await
            .is_err()
        {
            metrics::record_error("session_timeout");
            tracing::warn!("Session exceeded wall-clock ceiling, aborting");
        }
    });

    let body = Body::from_stream(ReceiverStream::new(frames_rx).map(Ok::<_, Infallible>));

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                HeaderName::from_static(DATA_STREAM_HEADER),
                DATA_STREAM_VERSION,
            ),
        ],
        body,
    )
        .into_response()
}

fn error_response(status: StatusCode, error: String, hint: Option<String>) -> Response {
    (status, Json(ErrorResponse { error, hint })).into_response()
}
