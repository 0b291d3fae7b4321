// ABOUTME: Stream transport - drives an in-process async sequence of decoded events.
// ABOUTME: No byte parsing; each yielded item goes straight onto the event channel.

use crate::handle::{AgentHandle, Command, EventResult, TransportError};
use crate::request::PromptRequest;
use anyhow::Result;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// The async event sequence an in-process runtime yields for one invocation.
pub type EventStream = BoxStream<'static, EventResult>;

/// Produces a fresh [`EventStream`] per invocation. The future resolves once
/// the runtime has accepted the request; a resolution error is a launch
/// failure.
pub type SourceFactory =
    Arc<dyn Fn(PromptRequest) -> BoxFuture<'static, Result<EventStream>> + Send + Sync>;

/// Transport over an externally supplied in-process event source, e.g. an
/// agent SDK driven directly from this server. The source is a black box; the
/// backend only relays what it yields.
pub struct StreamBackend {
    name: &'static str,
    source: SourceFactory,
}

impl StreamBackend {
    pub fn new<F>(source: F) -> Self
    where
        F: Fn(PromptRequest) -> BoxFuture<'static, Result<EventStream>> + Send + Sync + 'static,
    {
        Self::named("stream", source)
    }

    /// Like [`StreamBackend::new`] with an explicit handle name, for backends
    /// layered on top of this one.
    pub fn named<F>(name: &'static str, source: F) -> Self
    where
        F: Fn(PromptRequest) -> BoxFuture<'static, Result<EventStream>> + Send + Sync + 'static,
    {
        Self {
            name,
            source: Arc::new(source),
        }
    }

    pub fn into_handle(self) -> AgentHandle {
        let (tx, mut rx) = mpsc::channel::<Command>(32);
        let name = self.name;
        let source = self.source;

        tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                match cmd {
                    Command::Prompt {
                        request,
                        event_tx,
                        reply,
                    } => {
                        let _ = reply.send(Ok(()));
                        let source = Arc::clone(&source);
                        tokio::spawn(async move {
                            drive_source(source, request, event_tx).await;
                        });
                    }
                }
            }
        });

        AgentHandle::new(tx, name)
    }
}

async fn drive_source(
    source: SourceFactory,
    request: PromptRequest,
    event_tx: mpsc::Sender<EventResult>,
) {
    let mut stream = match (source)(request).await {
        Ok(stream) => stream,
        Err(e) => {
            let _ = event_tx
                .send(Err(TransportError::new(e.to_string())))
                .await;
            return;
        }
    };

    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => {
                if event_tx.send(Ok(event)).await.is_err() {
                    tracing::debug!("Event receiver closed, stopping source");
                    return;
                }
            }
            Err(error) => {
                // Iteration failure mirrors the process transport's launch
                // failure: one transport error, then close
                let _ = event_tx.send(Err(error)).await;
                return;
            }
        }
    }
    // Source exhausted: dropping event_tx closes the channel gracefully
}
