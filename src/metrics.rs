// ABOUTME: Prometheus metrics initialization and recording helpers.
// ABOUTME: Counters for sessions, emitted frames, and error kinds.

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return its render handle
pub fn init_metrics() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")
}

/// One chat session started, labeled by transport
pub fn record_session(transport: &'static str) {
    metrics::counter!("relay_sessions_total", "transport" => transport).increment(1);
}

/// One outbound frame emitted, labeled by channel
pub fn record_frame(channel: &'static str) {
    metrics::counter!("relay_frames_total", "channel" => channel).increment(1);
}

/// One failure, labeled by kind
pub fn record_error(kind: &'static str) {
    metrics::counter!("relay_errors_total", "kind" => kind).increment(1);
}
