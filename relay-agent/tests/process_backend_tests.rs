#![cfg(unix)]

use relay_agent::backends::process::{ProcessBackend, ProcessConfig};
use relay_agent::{EventResult, PromptRequest};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Write an executable shell script that plays back canned stdout
fn fixture_script(dir: &Path, body: &str) -> String {
    let path = dir.join("fake-agent.sh");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "#!/bin/sh").unwrap();
    write!(file, "{}", body).unwrap();
    drop(file);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_str().unwrap().to_string()
}

async fn collect(config: ProcessConfig, prompt: &str) -> Vec<EventResult> {
    let handle = ProcessBackend::new(config).unwrap().into_handle();
    let mut receiver = handle.prompt(PromptRequest::new(prompt)).await.unwrap();
    let mut items = Vec::new();
    while let Some(item) = receiver.recv().await {
        items.push(item);
    }
    items
}

#[tokio::test]
async fn test_stdout_lines_become_events_and_tail_is_flushed() {
    let dir = tempfile::tempdir().unwrap();
    // The final line is deliberately unterminated so it only surfaces via the
    // exit-time flush
    let binary = fixture_script(
        dir.path(),
        concat!(
            "printf '{\"type\":\"system\",\"subtype\":\"init\"}\\n'\n",
            "printf '{\"type\":\"content\",\"sub'\n",
            "printf 'type\":\"text\",\"text\":\"hi\"}\\n'\n",
            "printf '{\"type\":\"result\",\"subtype\":\"success\",\"result\":\"hi\"}'\n",
        ),
    );

    let items = collect(
        ProcessConfig {
            binary,
            working_dir: None,
            skip_permissions: false,
        },
        "hello",
    )
    .await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap().event_type, "system");
    assert_eq!(items[1].as_ref().unwrap().text.as_deref(), Some("hi"));
    assert_eq!(items[2].as_ref().unwrap().result.as_deref(), Some("hi"));
}

#[tokio::test]
async fn test_malformed_lines_are_dropped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let binary = fixture_script(
        dir.path(),
        concat!(
            "printf 'garbage that is not json\\n'\n",
            "printf '{\"type\":\"content\",\"subtype\":\"text\",\"text\":\"ok\"}\\n'\n",
        ),
    );

    let items = collect(
        ProcessConfig {
            binary,
            working_dir: None,
            skip_permissions: false,
        },
        "hello",
    )
    .await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap().text.as_deref(), Some("ok"));
}

#[tokio::test]
async fn test_nonzero_exit_still_closes_gracefully() {
    let dir = tempfile::tempdir().unwrap();
    let binary = fixture_script(
        dir.path(),
        concat!(
            "printf '{\"type\":\"content\",\"subtype\":\"text\",\"text\":\"partial\"}\\n'\n",
            "exit 3\n",
        ),
    );

    let items = collect(
        ProcessConfig {
            binary,
            working_dir: None,
            skip_permissions: false,
        },
        "hello",
    )
    .await;

    // One event, then channel close; no transport error is injected
    assert_eq!(items.len(), 1);
    assert!(items[0].is_ok());
}

#[tokio::test]
async fn test_spawn_failure_surfaces_as_transport_error() {
    let items = collect(
        ProcessConfig {
            binary: "/definitely/not/a/real/agent-binary".to_string(),
            working_dir: None,
            skip_permissions: false,
        },
        "hello",
    )
    .await;

    assert_eq!(items.len(), 1);
    let error = items[0].as_ref().unwrap_err();
    assert!(error.message.contains("Failed to spawn"));
}

#[tokio::test]
async fn test_stderr_is_logged_not_forwarded() {
    let dir = tempfile::tempdir().unwrap();
    let binary = fixture_script(
        dir.path(),
        concat!(
            "echo 'scary warning' >&2\n",
            "printf '{\"type\":\"result\",\"subtype\":\"success\",\"result\":\"fine\"}\\n'\n",
        ),
    );

    let items = collect(
        ProcessConfig {
            binary,
            working_dir: None,
            skip_permissions: false,
        },
        "hello",
    )
    .await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap().result.as_deref(), Some("fine"));
}

#[test]
fn test_config_rejects_suspicious_binary_paths() {
    let config = ProcessConfig {
        binary: "../claude".to_string(),
        working_dir: None,
        skip_permissions: false,
    };
    assert!(ProcessBackend::new(config).is_err());
}

#[test]
fn test_config_rejects_missing_working_dir() {
    let config = ProcessConfig {
        binary: "claude".to_string(),
        working_dir: Some("/definitely/not/a/real/dir".into()),
        skip_permissions: false,
    };
    assert!(ProcessBackend::new(config).is_err());
}
