// ABOUTME: Incomplete-line buffering for byte streams arriving in arbitrary chunks.
// ABOUTME: Every byte ends up in a completed line or the retained fragment.

/// Accumulates raw stdout bytes and yields complete lines as they close.
///
/// Splitting happens at the byte level so a multi-byte UTF-8 sequence cut by a
/// chunk boundary survives intact; each completed line is decoded lossily on
/// the way out.
#[derive(Debug, Default)]
pub struct LineBuffer {
    fragment: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, in arrival order.
    /// The trailing unterminated portion (possibly empty) stays buffered.
    pub fn append(&mut self, chunk: &[u8]) -> Vec<String> {
        self.fragment.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.fragment.iter().position(|&b| b == b'\n') {
            let rest = self.fragment.split_off(pos + 1);
            let mut line = std::mem::replace(&mut self.fragment, rest);
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Give up the retained fragment as a final candidate line.
    ///
    /// Returns `None` when the fragment is empty or whitespace-only. Clears
    /// state either way, so a second flush yields nothing.
    pub fn flush(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.fragment);
        let tail = String::from_utf8_lossy(&tail);
        let trimmed = tail.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// True when no bytes are waiting for a newline.
    pub fn is_empty(&self) -> bool {
        self.fragment.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_splits_and_retains_fragment() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.append(b"one\ntwo\nthr"), vec!["one", "two"]);
        assert_eq!(buffer.append(b"ee\n"), vec!["three"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn flush_is_idempotent() {
        let mut buffer = LineBuffer::new();
        buffer.append(b"tail");
        assert_eq!(buffer.flush(), Some("tail".to_string()));
        assert_eq!(buffer.flush(), None);
    }

    #[test]
    fn multibyte_sequence_split_across_chunks_survives() {
        let mut buffer = LineBuffer::new();
        let bytes = "héllo\n".as_bytes();
        assert!(buffer.append(&bytes[..2]).is_empty());
        assert_eq!(buffer.append(&bytes[2..]), vec!["héllo"]);
    }
}
