use relay_agent::backends::mock::MockBackend;
use relay_agent::{PromptRequest, RuntimeEvent};
use serde_json::json;

async fn collect(handle: &relay_agent::AgentHandle, prompt: &str) -> Vec<relay_agent::EventResult> {
    let mut receiver = handle.prompt(PromptRequest::new(prompt)).await.unwrap();
    let mut items = Vec::new();
    while let Some(item) = receiver.recv().await {
        items.push(item);
    }
    items
}

#[tokio::test]
async fn test_scripted_events_arrive_in_order() {
    let handle = MockBackend::new()
        .on_prompt("weather")
        .respond_with(vec![
            RuntimeEvent::tool("get_forecast", json!({"city": "Oslo"})),
            RuntimeEvent::content_text("Sunny."),
            RuntimeEvent::result_success("Sunny."),
        ])
        .into_handle();

    let items = collect(&handle, "what's the weather").await;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap().tool_name.as_deref(), Some("get_forecast"));
    assert_eq!(items[1].as_ref().unwrap().text.as_deref(), Some("Sunny."));
    assert_eq!(items[2].as_ref().unwrap().result.as_deref(), Some("Sunny."));
}

#[tokio::test]
async fn test_unmatched_prompt_gets_fallback_result() {
    let handle = MockBackend::new().into_handle();
    let items = collect(&handle, "anything").await;
    assert_eq!(items.len(), 1);
    let event = items[0].as_ref().unwrap();
    assert!(event.result.as_deref().unwrap().contains("no expectation"));
}

#[tokio::test]
async fn test_transport_error_is_an_err_item() {
    let handle = MockBackend::new()
        .on_prompt("boom")
        .respond_transport_error("simulated launch failure")
        .into_handle();

    let items = collect(&handle, "boom").await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap_err().message, "simulated launch failure");
}

#[tokio::test]
async fn test_expectations_match_fifo_then_by_pattern() {
    let handle = MockBackend::new()
        .on_prompt("first")
        .respond_text("one")
        .on_prompt("second")
        .respond_text("two")
        .into_handle();

    // Out of order: the second expectation is found by pattern search
    let items = collect(&handle, "second please").await;
    assert_eq!(items[0].as_ref().unwrap().result.as_deref(), Some("two"));

    let items = collect(&handle, "first please").await;
    assert_eq!(items[0].as_ref().unwrap().result.as_deref(), Some("one"));
}
