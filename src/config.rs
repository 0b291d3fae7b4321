// ABOUTME: Server configuration loaded from TOML with an env override for the bind address.
// ABOUTME: Sections: [server], [backend], [cli], [prompt], [mcp_servers.<name>].

use anyhow::{Context, Result};
use relay_agent::backends::process::ProcessConfig;
use relay_agent::config::BackendConfig;
use relay_agent::{McpServerDescriptor, PromptRequest};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Backend driven by POST /api/chat, created through the registry
    #[serde(default)]
    pub backend: BackendConfig,

    /// Process transport pinned to POST /api/chat-cli
    #[serde(default)]
    pub cli: ProcessConfig,

    #[serde(default)]
    pub prompt: PromptConfig,

    /// Tool-provider descriptors forwarded opaquely to the runtime
    #[serde(default)]
    pub mcp_servers: BTreeMap<String, McpServerDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Wall-clock ceiling per session; expiry is treated as consumer disconnect
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            session_timeout_secs: default_session_timeout_secs(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_session_timeout_secs() -> u64 {
    30
}

impl ServerConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }
}

/// Prompt-construction settings shared by both routes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptConfig {
    /// Inline system instruction; wins over system_prompt_path
    pub system_prompt: Option<String>,
    /// File to read the system instruction from
    pub system_prompt_path: Option<std::path::PathBuf>,
    /// Directory of supplementary agent definitions
    pub agents_dir: Option<std::path::PathBuf>,
    /// Directory of supplementary command definitions
    pub commands_dir: Option<std::path::PathBuf>,
    /// Setting scopes the runtime loads, e.g. "project"
    pub setting_sources: Option<String>,
    /// Turn ceiling per invocation
    pub max_turns: Option<u32>,
}

impl Config {
    /// Load configuration: an explicit path must exist; otherwise `relay.toml`
    /// in the working directory is used when present, defaults when not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let candidate = Path::new("relay.toml");
                if candidate.exists() {
                    Self::from_file(candidate)?
                } else {
                    Self::default()
                }
            }
        };
        config.resolve_system_prompt()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    fn resolve_system_prompt(&mut self) -> Result<()> {
        if self.prompt.system_prompt.is_none() {
            if let Some(ref path) = self.prompt.system_prompt_path {
                let content = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read system prompt file: {}", path.display())
                })?;
                self.prompt.system_prompt = Some(content);
            }
        }
        Ok(())
    }

    /// Assemble the opaque per-invocation request for the given user prompt
    pub fn build_prompt_request(&self, prompt: String) -> PromptRequest {
        PromptRequest {
            prompt,
            system_prompt: self.prompt.system_prompt.clone(),
            mcp_servers: self.mcp_servers.clone(),
            agents_dir: self.prompt.agents_dir.clone(),
            commands_dir: self.prompt.commands_dir.clone(),
            setting_sources: self.prompt.setting_sources.clone(),
            max_turns: self.prompt.max_turns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let toml = r#"
[server]
port = 9000
session_timeout_secs = 60

[backend]
type = "mock"

[cli]
binary = "claude"
skip_permissions = true

[prompt]
system_prompt = "You are a helpful assistant."
setting_sources = "project"
max_turns = 20

[mcp_servers.weather]
command = "python3"
args = ["server.py"]

[mcp_servers.weather.env]
OPENWEATHER_API_KEY = "k"
"#;
        let config = Config::parse(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.backend.backend_type(), "mock");
        assert!(config.cli.skip_permissions);

        let request = config.build_prompt_request("hi".to_string());
        assert_eq!(request.prompt, "hi");
        assert_eq!(request.max_turns, Some(20));
        assert_eq!(request.mcp_servers["weather"].connection_type, "stdio");
        assert_eq!(
            request.mcp_servers["weather"].env["OPENWEATHER_API_KEY"],
            "k"
        );
    }

    #[test]
    fn defaults_apply_without_file() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.backend.backend_type(), "process");
        assert_eq!(config.server.session_timeout(), Duration::from_secs(30));
        assert!(config.mcp_servers.is_empty());
    }
}
