// ABOUTME: Encoders for the AI SDK v5 data-stream wire format.
// ABOUTME: One newline-terminated, channel-prefixed frame per call: 0 text, 3 error, d done.

use serde_json::Value;

/// Response header advertising the stream protocol version to the client
pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";
pub const DATA_STREAM_VERSION: &str = "v1";

/// Channel 0: assistant-visible text delta
pub fn text_frame(payload: &str) -> String {
    format!("0:{}\n", Value::from(payload))
}

/// Channel 3: fatal transport error
pub fn error_frame(message: &str) -> String {
    format!("3:{}\n", Value::from(message))
}

/// Channel d: terminal marker, exactly once per graceful completion
pub fn done_frame() -> String {
    "d:{\"finishReason\":\"stop\"}\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_frame_double_encodes_payload() {
        assert_eq!(text_frame("hi"), "0:\"hi\"\n");
        assert_eq!(text_frame("line\nbreak \"q\""), "0:\"line\\nbreak \\\"q\\\"\"\n");
    }

    #[test]
    fn error_frame_uses_channel_3() {
        assert_eq!(error_frame("spawn failed"), "3:\"spawn failed\"\n");
    }

    #[test]
    fn done_frame_is_fixed() {
        assert_eq!(done_frame(), "d:{\"finishReason\":\"stop\"}\n");
    }
}
