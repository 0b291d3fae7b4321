// ABOUTME: Root library module exposing the stream-bridge server modules.
// ABOUTME: Provides access to config, chat routes, frame encoding, and the lifecycle pump.

pub mod bridge;
pub mod chat;
pub mod config;
pub mod frames;
pub mod metrics;
pub mod server;

// Re-export relay-agent types for convenience
pub use relay_agent::{AgentHandle, AgentRegistry, RuntimeEvent};
