// ABOUTME: Lifecycle pump translating transport events into outbound wire frames.
// ABOUTME: Exactly one terminal frame on graceful completion; none after an error close.

use crate::frames;
use crate::metrics;
use relay_agent::{dispatch, Action, EventReceiver};
use tokio::sync::mpsc;

/// Pump one session's events into the outbound frame channel.
///
/// Written once against the event-channel contract; both transports share it.
/// Returns when the transport finishes, a transport error closes the stream,
/// or the consumer disconnects (send failure). Dropping `events` on return is
/// what tells the transport to release its upstream resources.
pub async fn pump(mut events: EventReceiver, frames_tx: mpsc::Sender<String>) {
    while let Some(item) = events.recv().await {
        match item {
            Ok(event) => match dispatch(&event) {
                Action::EmitText(text) => {
                    metrics::record_frame("text");
                    if frames_tx.send(frames::text_frame(&text)).await.is_err() {
                        return;
                    }
                }
                Action::EmitError(message) => {
                    // Upstream execution errors are assistant-visible text on
                    // channel 0; the session continues
                    metrics::record_frame("text");
                    if frames_tx.send(frames::text_frame(&message)).await.is_err() {
                        return;
                    }
                }
                Action::LogTool { name, input } => {
                    tracing::info!(tool = %name, input = %input, "Tool invocation");
                }
                Action::LogAgent { name } => {
                    tracing::info!(agent = %name, "Agent invocation");
                }
                Action::LogInit {
                    agents,
                    failed_servers,
                } => {
                    tracing::info!("Agent runtime initialized");
                    if let Some(agents) = agents {
                        tracing::info!(?agents, "Loaded agents");
                    }
                    if !failed_servers.is_empty() {
                        tracing::warn!(servers = ?failed_servers, "MCP servers failed to connect");
                    }
                }
                Action::Ignore => {}
            },
            Err(error) => {
                metrics::record_frame("error");
                metrics::record_error("transport");
                let _ = frames_tx.send(frames::error_frame(&error.to_string())).await;
                // Transport failure closes the stream without a done frame
                return;
            }
        }
    }

    metrics::record_frame("done");
    let _ = frames_tx.send(frames::done_frame()).await;
}
