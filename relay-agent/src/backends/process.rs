// ABOUTME: Process transport - spawns the agent CLI with --output-format stream-json.
// ABOUTME: Buffers stdout into lines, decodes events, and cleans up on every exit path.

use crate::event::decode;
use crate::handle::{AgentHandle, Command, EventResult, TransportError};
use crate::line_buffer::LineBuffer;
use crate::request::PromptRequest;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command as ProcessCommand;
use tokio::sync::mpsc;

/// Configuration for the process transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Path to the agent CLI binary
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Working directory for the invocation; inherits the server's when unset
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Pass --dangerously-skip-permissions to the CLI
    #[serde(default)]
    pub skip_permissions: bool,
}

fn default_binary() -> String {
    "claude".to_string()
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            working_dir: None,
            skip_permissions: false,
        }
    }
}

pub struct ProcessBackend {
    config: ProcessConfig,
}

impl ProcessBackend {
    pub fn new(config: ProcessConfig) -> Result<Self> {
        if config.binary.contains("..") || config.binary.contains('\0') {
            anyhow::bail!("Invalid agent binary path");
        }
        if let Some(ref dir) = config.working_dir {
            if !dir.exists() {
                anyhow::bail!("Working directory does not exist: {}", dir.display());
            }
        }
        Ok(Self { config })
    }

    pub fn into_handle(self) -> AgentHandle {
        let (tx, mut rx) = mpsc::channel::<Command>(32);
        let name = "process";
        let config = self.config;

        tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                match cmd {
                    Command::Prompt {
                        request,
                        event_tx,
                        reply,
                    } => {
                        let _ = reply.send(Ok(()));
                        // One task per invocation so concurrent sessions never
                        // serialize behind each other.
                        let config = config.clone();
                        tokio::spawn(async move {
                            run_prompt(&config, &request, event_tx).await;
                        });
                    }
                }
            }
        });

        AgentHandle::new(tx, name)
    }

    /// Factory function for the registry
    pub fn factory() -> crate::registry::BackendFactory {
        Box::new(|config| {
            let cfg: ProcessConfig = serde_json::from_value(config.clone())?;
            let backend = ProcessBackend::new(cfg)?;
            Ok(backend.into_handle())
        })
    }
}

fn build_args(config: &ProcessConfig, request: &PromptRequest) -> Vec<String> {
    let mut args = vec![
        "--print".to_string(),
        "--verbose".to_string(),
        "--output-format".to_string(),
        "stream-json".to_string(),
    ];

    if config.skip_permissions {
        args.push("--dangerously-skip-permissions".to_string());
    }

    if let Some(ref system_prompt) = request.system_prompt {
        args.push("--system-prompt".to_string());
        args.push(system_prompt.clone());
    }

    if let Some(mcp_config) = request.mcp_config_json() {
        args.push("--mcp-config".to_string());
        args.push(mcp_config);
    }

    if let Some(ref sources) = request.setting_sources {
        args.push("--setting-sources".to_string());
        args.push(sources.clone());
    }

    if let Some(max_turns) = request.max_turns {
        args.push("--max-turns".to_string());
        args.push(max_turns.to_string());
    }

    args.push(request.prompt.clone());
    args
}

async fn run_prompt(
    config: &ProcessConfig,
    request: &PromptRequest,
    event_tx: mpsc::Sender<EventResult>,
) {
    let args = build_args(config, request);
    tracing::debug!(binary = %config.binary, "Spawning agent CLI");

    let mut command = ProcessCommand::new(&config.binary);
    command
        .args(&args)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);
    if let Some(ref dir) = config.working_dir {
        command.current_dir(dir);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            // Launch failure is a transport error, not a runtime event
            let _ = event_tx
                .send(Err(TransportError::new(format!(
                    "Failed to spawn {}: {}",
                    config.binary, e
                ))))
                .await;
            return;
        }
    };

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        let _ = event_tx
            .send(Err(TransportError::new("Failed to capture agent CLI pipes")))
            .await;
        let _ = child.kill().await;
        return;
    };

    // Drain stderr separately - it is logged, never forwarded as frames
    let stderr_task = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if !line.is_empty() {
                tracing::warn!(stderr = %line, "agent CLI stderr");
            }
        }
    });

    let mut reader = stdout;
    let mut buffer = LineBuffer::new();
    let mut chunk = [0u8; 4096];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                for line in buffer.append(&chunk[..n]) {
                    if !forward_line(&line, &event_tx).await {
                        // Consumer disconnected: stop the upstream too
                        tracing::debug!("Event receiver closed, killing agent CLI");
                        let _ = child.kill().await;
                        stderr_task.abort();
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read agent CLI stdout");
                break;
            }
        }
    }

    // stdout closed: flush the retained fragment through the same path
    if let Some(tail) = buffer.flush() {
        let _ = forward_line(&tail, &event_tx).await;
    }

    match child.wait().await {
        Ok(status) if !status.success() => {
            tracing::warn!(code = ?status.code(), "Agent CLI exited with failure status");
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Failed to reap agent CLI process");
        }
    }

    if let Err(e) = stderr_task.await {
        tracing::warn!(error = %e, "stderr reader task failed to complete");
    }
    // Dropping event_tx closes the channel: graceful completion
}

/// Decode and forward one line. Returns false once the receiver is gone.
async fn forward_line(line: &str, event_tx: &mpsc::Sender<EventResult>) -> bool {
    if line.trim().is_empty() {
        return true;
    }
    match decode(line) {
        Some(event) => event_tx.send(Ok(event)).await.is_ok(),
        None => {
            tracing::warn!(line = %line, "Dropping malformed stream-json line");
            true
        }
    }
}
