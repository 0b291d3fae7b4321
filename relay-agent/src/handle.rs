// ABOUTME: AgentHandle provides Send+Sync wrapper around potentially !Send backends.
// ABOUTME: Uses channels to communicate with backend worker tasks.

use crate::event::RuntimeEvent;
use crate::request::PromptRequest;
use anyhow::Result;
use tokio::sync::{mpsc, oneshot};

/// One item on the event channel: a decoded upstream event, or a
/// transport-level failure (spawn error, iteration exception).
///
/// Transport failures are carried out-of-band rather than as an event variant
/// so the bridge can tell them apart from upstream execution errors, which
/// arrive as ordinary `result`/`error_during_execution` events.
pub type EventResult = Result<RuntimeEvent, TransportError>;

/// Transport-level failure surfaced on the event channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

/// Commands sent from AgentHandle to the backend worker
#[derive(Debug)]
pub enum Command {
    Prompt {
        request: PromptRequest,
        event_tx: mpsc::Sender<EventResult>,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Send + Sync handle the server interacts with.
///
/// Internally communicates with a worker task that runs the actual backend.
/// Cancellation is drop-based: dropping the `EventReceiver` makes the worker's
/// sends fail, which is its signal to stop and clean up upstream resources.
#[derive(Clone, Debug)]
pub struct AgentHandle {
    tx: mpsc::Sender<Command>,
    name: &'static str,
}

impl AgentHandle {
    /// Create a new AgentHandle with the given command channel and backend name
    pub fn new(tx: mpsc::Sender<Command>, name: &'static str) -> Self {
        Self { tx, name }
    }

    /// Get the backend name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Start one prompt invocation and receive its events via EventReceiver
    pub async fn prompt(&self, request: PromptRequest) -> Result<EventReceiver> {
        let (event_tx, event_rx) = mpsc::channel(2048);
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(Command::Prompt {
                request,
                event_tx,
                reply: reply_tx,
            })
            .await
            .map_err(|_| anyhow::anyhow!("Backend worker closed"))?;

        // Wait for the backend to acknowledge the prompt started
        reply_rx
            .await
            .map_err(|_| anyhow::anyhow!("Backend worker dropped reply channel"))??;

        Ok(EventReceiver::new(event_rx))
    }
}

/// Receiver for streaming events from one prompt invocation.
pub struct EventReceiver {
    rx: mpsc::Receiver<EventResult>,
}

impl EventReceiver {
    /// Create a new EventReceiver wrapping the given channel
    pub fn new(rx: mpsc::Receiver<EventResult>) -> Self {
        Self { rx }
    }

    /// Receive the next item, or None once the transport has finished
    pub async fn recv(&mut self) -> Option<EventResult> {
        self.rx.recv().await
    }

    /// Try to receive an item without blocking
    pub fn try_recv(&mut self) -> Option<EventResult> {
        self.rx.try_recv().ok()
    }
}
