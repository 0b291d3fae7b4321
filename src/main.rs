// ABOUTME: Main entry point for the agent-runtime stream bridge server.
// ABOUTME: Initializes logging, loads config, registers backends, and serves HTTP.

use anyhow::Result;
use clap::Parser;
use relay::config::Config;
use relay::server;
use relay_agent::AgentRegistry;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "relay", about = "Bridge an agent runtime's event stream to chat clients")]
struct Cli {
    /// Path to the TOML config file (defaults to ./relay.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log panics before they take the process down
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC! Bridge crashed: {}", panic_info);
        eprintln!("{:?}", std::backtrace::Backtrace::force_capture());
    }));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    tracing::info!(
        port = config.server.port,
        backend = config.backend.backend_type(),
        cli_binary = %config.cli.binary,
        mcp_servers = config.mcp_servers.len(),
        "Configuration loaded"
    );

    let registry = AgentRegistry::default();
    server::serve(config, &registry).await
}
