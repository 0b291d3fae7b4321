use relay::bridge;
use relay_agent::{EventReceiver, EventResult, RuntimeEvent, TransportError};
use serde_json::json;
use tokio::sync::mpsc;

async fn pump_items(items: Vec<EventResult>) -> Vec<String> {
    let (event_tx, event_rx) = mpsc::channel(32);
    for item in items {
        event_tx.send(item).await.unwrap();
    }
    drop(event_tx);

    let (frames_tx, mut frames_rx) = mpsc::channel(32);
    bridge::pump(EventReceiver::new(event_rx), frames_tx).await;

    let mut frames = Vec::new();
    while let Some(frame) = frames_rx.recv().await {
        frames.push(frame);
    }
    frames
}

#[tokio::test]
async fn test_text_then_completion_produces_text_and_done() {
    let frames = pump_items(vec![
        Ok(RuntimeEvent::content_text("hi")),
        Ok(RuntimeEvent::result_success("hi there")),
    ])
    .await;

    assert_eq!(
        frames,
        vec![
            "0:\"hi\"\n".to_string(),
            "0:\"hi there\"\n".to_string(),
            "d:{\"finishReason\":\"stop\"}\n".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_single_text_event_yields_one_text_frame_then_done() {
    let frames = pump_items(vec![Ok(RuntimeEvent::content_text("hi"))]).await;
    assert_eq!(
        frames,
        vec!["0:\"hi\"\n".to_string(), "d:{\"finishReason\":\"stop\"}\n".to_string()]
    );
}

#[tokio::test]
async fn test_empty_session_still_emits_exactly_one_done() {
    assert_eq!(pump_items(vec![]).await, vec!["d:{\"finishReason\":\"stop\"}\n"]);
}

#[tokio::test]
async fn test_execution_error_is_a_text_frame_and_session_continues() {
    let frames = pump_items(vec![
        Ok(RuntimeEvent::execution_error("rate limited")),
        Ok(RuntimeEvent::result_success("recovered")),
    ])
    .await;

    assert_eq!(
        frames,
        vec![
            "0:\"Error: rate limited\"\n".to_string(),
            "0:\"recovered\"\n".to_string(),
            "d:{\"finishReason\":\"stop\"}\n".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_transport_error_closes_without_done() {
    let frames = pump_items(vec![
        Ok(RuntimeEvent::content_text("partial")),
        Err(TransportError::new("spawn failed")),
        Ok(RuntimeEvent::content_text("after close")),
    ])
    .await;

    // Nothing is emitted after the error frame, and no done frame appears
    assert_eq!(
        frames,
        vec!["0:\"partial\"\n".to_string(), "3:\"spawn failed\"\n".to_string()]
    );
}

#[tokio::test]
async fn test_log_only_and_unknown_events_emit_no_frames() {
    let frames = pump_items(vec![
        Ok(RuntimeEvent::system_init(Some(vec!["a".to_string()]), None)),
        Ok(RuntimeEvent::tool("Read", json!({"path": "/tmp"}))),
        Ok(RuntimeEvent::agent("analyzer")),
        Ok(relay_agent::decode(r#"{"type":"telemetry","subtype":"tick"}"#).unwrap()),
    ])
    .await;

    assert_eq!(frames, vec!["d:{\"finishReason\":\"stop\"}\n"]);
}
