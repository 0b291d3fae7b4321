// ABOUTME: The opaque per-invocation request passed into transports.
// ABOUTME: Carries the prompt plus runtime configuration assembled by the server.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything a transport needs to run one upstream invocation.
///
/// Assembled by the hosting layer and passed through opaquely; transports pick
/// out the pieces their runtime understands (the process transport turns MCP
/// descriptors into an inline `--mcp-config` argument, in-process runtimes
/// receive the whole request).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PromptRequest {
    /// The user prompt forwarded to the runtime
    pub prompt: String,

    /// Free-text system instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Tool-provider processes the runtime may launch, keyed by server name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mcp_servers: BTreeMap<String, McpServerDescriptor>,

    /// Directory of supplementary agent definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents_dir: Option<PathBuf>,

    /// Directory of supplementary command definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands_dir: Option<PathBuf>,

    /// Which setting scopes the runtime loads, e.g. "project"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_sources: Option<String>,

    /// Turn ceiling for the invocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Render the MCP descriptors as the inline JSON the CLI accepts for
    /// `--mcp-config`. Returns `None` when no servers are configured.
    pub fn mcp_config_json(&self) -> Option<String> {
        if self.mcp_servers.is_empty() {
            return None;
        }
        Some(json!({ "mcpServers": self.mcp_servers }).to_string())
    }
}

/// Configuration for one auxiliary tool-provider process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct McpServerDescriptor {
    /// Connection type, e.g. "stdio"
    #[serde(rename = "type", default = "default_connection_type")]
    pub connection_type: String,

    /// Executable to launch
    pub command: String,

    /// Arguments passed to the executable
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment variables set for the process
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_connection_type() -> String {
    "stdio".to_string()
}
