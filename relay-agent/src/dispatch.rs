// ABOUTME: Table-driven dispatch from decoded runtime events to bridge actions.
// ABOUTME: First matching (type, subtype) route wins; everything else is Ignore.

use crate::event::RuntimeEvent;
use serde_json::Value;

/// What the bridge should do with one decoded event.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Stream a text delta or final result to the client
    EmitText(String),
    /// Surface an upstream execution failure as assistant-visible text.
    /// Distinct from transport-level failures, which never pass through
    /// dispatch.
    EmitError(String),
    /// Log a tool invocation; nothing reaches the client
    LogTool { name: String, input: Value },
    /// Log an agent invocation; nothing reaches the client
    LogAgent { name: String },
    /// Log runtime initialization; `failed_servers` holds the MCP servers
    /// that did not reach "connected"
    LogInit {
        agents: Option<Vec<String>>,
        failed_servers: Vec<String>,
    },
    /// Unrecognized (type, subtype) pair; drop silently
    Ignore,
}

enum SubtypeRule {
    Is(&'static str),
    Any,
}

struct DispatchRoute {
    event_type: &'static str,
    subtype: SubtypeRule,
    handler: fn(&RuntimeEvent) -> Action,
}

impl DispatchRoute {
    fn matches(&self, event: &RuntimeEvent) -> bool {
        if event.event_type != self.event_type {
            return false;
        }
        match self.subtype {
            SubtypeRule::Is(expected) => event.subtype.as_deref() == Some(expected),
            SubtypeRule::Any => true,
        }
    }
}

/// The decision table. Routes are checked in order; the runtime's event
/// vocabulary grows independently of this bridge, so new pairs are added here
/// without touching `dispatch` itself.
const ROUTES: &[DispatchRoute] = &[
    DispatchRoute {
        event_type: "content",
        subtype: SubtypeRule::Is("text"),
        handler: content_text,
    },
    DispatchRoute {
        event_type: "result",
        subtype: SubtypeRule::Is("success"),
        handler: result_success,
    },
    DispatchRoute {
        event_type: "result",
        subtype: SubtypeRule::Is("error_during_execution"),
        handler: result_error,
    },
    DispatchRoute {
        event_type: "tool",
        subtype: SubtypeRule::Any,
        handler: tool_use,
    },
    DispatchRoute {
        event_type: "agent",
        subtype: SubtypeRule::Any,
        handler: agent_use,
    },
    DispatchRoute {
        event_type: "system",
        subtype: SubtypeRule::Is("init"),
        handler: system_init,
    },
];

/// Map one decoded event to an action. Pure and stateless.
pub fn dispatch(event: &RuntimeEvent) -> Action {
    ROUTES
        .iter()
        .find(|route| route.matches(event))
        .map(|route| (route.handler)(event))
        .unwrap_or(Action::Ignore)
}

fn content_text(event: &RuntimeEvent) -> Action {
    Action::EmitText(event.text.clone().unwrap_or_default())
}

fn result_success(event: &RuntimeEvent) -> Action {
    Action::EmitText(event.result.clone().unwrap_or_default())
}

fn result_error(event: &RuntimeEvent) -> Action {
    let detail = event.error.as_deref().unwrap_or("Unknown error");
    Action::EmitError(format!("Error: {}", detail))
}

fn tool_use(event: &RuntimeEvent) -> Action {
    Action::LogTool {
        name: event.tool_name.clone().unwrap_or_else(|| "unknown".to_string()),
        input: event.input.clone().unwrap_or(Value::Null),
    }
}

fn agent_use(event: &RuntimeEvent) -> Action {
    Action::LogAgent {
        name: event.agent_name.clone().unwrap_or_else(|| "unknown".to_string()),
    }
}

fn system_init(event: &RuntimeEvent) -> Action {
    let failed_servers = event
        .mcp_servers
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|server| server.status != "connected")
        .map(|server| server.name.clone())
        .collect();

    Action::LogInit {
        agents: event.agents.clone(),
        failed_servers,
    }
}
