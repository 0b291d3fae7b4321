// ABOUTME: Upstream runtime event model and the tolerant line decoder.
// ABOUTME: Unknown (type, subtype) pairs decode fine and are dispatched as Ignore.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One decoded event from the upstream agent runtime.
///
/// The runtime's event vocabulary is open-ended and versioned independently of
/// this bridge, so every payload field is optional and unknown fields are
/// tolerated. Which fields are meaningful depends on the `(type, subtype)`
/// pair; see [`crate::dispatch`] for the mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuntimeEvent {
    /// Primary discriminant, e.g. "content", "result", "tool", "system"
    #[serde(rename = "type")]
    pub event_type: String,

    /// Secondary discriminant, e.g. "text", "success", "init"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    /// Streaming text payload (`content`/`text`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Final result payload (`result`/`success`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    /// Error payload (`result`/`error_during_execution`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Invoked tool name (`tool`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Full input passed to the tool (`tool`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,

    /// Invoked agent name (`agent`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    /// Agent definitions loaded at startup (`system`/`init`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<String>>,

    /// MCP server connection statuses (`system`/`init`, in-process runtimes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<McpServerStatus>>,
}

/// Connection status of one MCP server, reported on `system`/`init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct McpServerStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl RuntimeEvent {
    fn with_type(event_type: &str, subtype: Option<&str>) -> Self {
        Self {
            event_type: event_type.to_string(),
            subtype: subtype.map(str::to_string),
            ..Self::default()
        }
    }

    /// A `content`/`text` streaming chunk
    pub fn content_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::with_type("content", Some("text"))
        }
    }

    /// A `result`/`success` final result
    pub fn result_success(result: &str) -> Self {
        Self {
            result: Some(result.to_string()),
            ..Self::with_type("result", Some("success"))
        }
    }

    /// A `result`/`error_during_execution` upstream failure
    pub fn execution_error(error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::with_type("result", Some("error_during_execution"))
        }
    }

    /// A `tool` invocation notice
    pub fn tool(name: &str, input: Value) -> Self {
        Self {
            tool_name: Some(name.to_string()),
            input: Some(input),
            ..Self::with_type("tool", None)
        }
    }

    /// An `agent` invocation notice
    pub fn agent(name: &str) -> Self {
        Self {
            agent_name: Some(name.to_string()),
            ..Self::with_type("agent", None)
        }
    }

    /// A `system`/`init` startup notice
    pub fn system_init(agents: Option<Vec<String>>, mcp_servers: Option<Vec<McpServerStatus>>) -> Self {
        Self {
            agents,
            mcp_servers,
            ..Self::with_type("system", Some("init"))
        }
    }
}

/// Decode one line of upstream output into an event.
///
/// Malformed input yields `None`, never an error: the caller logs and skips.
/// Callers are expected to short-circuit empty or whitespace-only lines before
/// calling this.
pub fn decode(line: &str) -> Option<RuntimeEvent> {
    serde_json::from_str(line.trim_end_matches('\r')).ok()
}
