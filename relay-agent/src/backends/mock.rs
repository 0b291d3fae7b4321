// ABOUTME: Mock backend for testing - returns pre-configured event sequences.
// ABOUTME: Built on the stream transport so tests exercise the real adapter.
//!
//! # Example
//!
//! ```no_run
//! use relay_agent::backends::mock::MockBackend;
//! use relay_agent::{PromptRequest, RuntimeEvent};
//!
//! # async fn example() {
//! let mock = MockBackend::new()
//!     .on_prompt("hello").respond_text("Hi there!")
//!     .on_prompt("weather").respond_with(vec![
//!         RuntimeEvent::tool("get_forecast", serde_json::json!({"city": "Oslo"})),
//!         RuntimeEvent::content_text("Sunny."),
//!         RuntimeEvent::result_success("Sunny."),
//!     ]);
//!
//! let handle = mock.into_handle();
//! let mut receiver = handle.prompt(PromptRequest::new("hello")).await.unwrap();
//!
//! if let Some(Ok(event)) = receiver.recv().await {
//!     assert_eq!(event.result.as_deref(), Some("Hi there!"));
//! }
//! # }
//! ```

use crate::backends::stream::StreamBackend;
use crate::event::RuntimeEvent;
use crate::handle::{AgentHandle, EventResult, TransportError};
use futures::FutureExt;
use futures::StreamExt;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock backend for testing
pub struct MockBackend {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

struct Expectation {
    pattern: String,
    items: Vec<EventResult>,
}

impl MockBackend {
    /// Create a new mock backend with no expectations
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Set up an expectation for a prompt matching the given pattern
    pub fn on_prompt(self, pattern: &str) -> ExpectationBuilder {
        ExpectationBuilder {
            backend: self,
            pattern: pattern.to_string(),
        }
    }

    /// Convert this backend into an AgentHandle
    pub fn into_handle(self) -> AgentHandle {
        let expectations = self.expectations;

        StreamBackend::named("mock", move |request| {
            // Match expectations with FIFO preference: check the front first,
            // fall back to searching the queue if the front doesn't match.
            let items = {
                let mut exp = expectations.lock().unwrap_or_else(|e| e.into_inner());
                if let Some(front) = exp.front() {
                    if request.prompt.contains(&front.pattern) {
                        exp.pop_front().map(|e| e.items)
                    } else {
                        exp.iter()
                            .position(|e| request.prompt.contains(&e.pattern))
                            .and_then(|i| exp.remove(i))
                            .map(|e| e.items)
                    }
                } else {
                    None
                }
            };

            let items = items.unwrap_or_else(|| {
                vec![Ok(RuntimeEvent::result_success(&format!(
                    "Mock: no expectation for '{}'",
                    request.prompt
                )))]
            });

            async move { Ok(futures::stream::iter(items).boxed()) }.boxed()
        })
        .into_handle()
    }

    /// Factory function for the registry
    pub fn factory() -> crate::registry::BackendFactory {
        Box::new(|_config| {
            let backend = MockBackend::new();
            Ok(backend.into_handle())
        })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for setting up mock expectations with a fluent API
pub struct ExpectationBuilder {
    backend: MockBackend,
    pattern: String,
}

impl ExpectationBuilder {
    /// Respond with a list of events
    pub fn respond_with(self, events: Vec<RuntimeEvent>) -> MockBackend {
        self.push(events.into_iter().map(Ok).collect())
    }

    /// Respond with a simple final result
    pub fn respond_text(self, text: &str) -> MockBackend {
        self.respond_with(vec![RuntimeEvent::result_success(text)])
    }

    /// Respond with a transport-level failure
    pub fn respond_transport_error(self, message: &str) -> MockBackend {
        self.push(vec![Err(TransportError::new(message))])
    }

    fn push(self, items: Vec<EventResult>) -> MockBackend {
        self.backend
            .expectations
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Expectation {
                pattern: self.pattern,
                items,
            });
        self.backend
    }
}
