//! Incremental event-stream decoder

/// Splits a byte stream into event-stream messages.
///
/// A message ends at the first pair of back-to-back line feeds. Other line
/// endings get no special treatment. Multi-byte UTF-8 sequences split across
/// network chunks are held back until complete; invalid sequences decode to
/// U+FFFD.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    /// Decoded text not yet terminated by `\n\n`
    buffer: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    incomplete_utf8: Vec<u8>,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return every message completed by them
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let bytes = if self.incomplete_utf8.is_empty() {
            chunk.to_vec()
        } else {
            let mut combined = std::mem::take(&mut self.incomplete_utf8);
            combined.extend_from_slice(chunk);
            combined
        };

        let (text, remainder) = Self::decode_utf8_with_remainder(&bytes);
        self.incomplete_utf8 = remainder;
        self.buffer.push_str(&text);

        let mut messages = Vec::new();
        while let Some(end) = self.buffer.find("\n\n") {
            let message: String = self.buffer.drain(..end).collect();
            self.buffer.replace_range(..2, "");
            messages.push(message);
        }
        messages
    }

    /// Decode as much as possible, keeping an incomplete trailing sequence
    fn decode_utf8_with_remainder(bytes: &[u8]) -> (String, Vec<u8>) {
        let mut text = String::with_capacity(bytes.len());
        let mut rest = bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    return (text, Vec::new());
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        None => return (text, after.to_vec()),
                        Some(len) => {
                            tracing::warn!(
                                "invalid UTF-8 sequence of {} byte(s) in event stream",
                                len
                            );
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                    }
                }
            }
        }
    }

    /// Text received after the last complete message
    pub fn remaining(&self) -> &str {
        &self.buffer
    }

    pub fn has_remaining(&self) -> bool {
        !self.buffer.is_empty() || !self.incomplete_utf8.is_empty()
    }

    /// Consume the decoder, returning unterminated data if any is left
    pub fn finish(self) -> Option<String> {
        if !self.has_remaining() {
            return None;
        }
        let mut rest = self.buffer;
        if !self.incomplete_utf8.is_empty() {
            rest.push(char::REPLACEMENT_CHARACTER);
        }
        Some(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_blank_line() {
        let mut decoder = EventStreamDecoder::new();
        let messages = decoder.feed(b"data: first\n\ndata: second\n\n");
        assert_eq!(messages, vec!["data: first", "data: second"]);
        assert!(!decoder.has_remaining());
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_message_split_across_chunks() {
        let mut decoder = EventStreamDecoder::new();
        assert!(decoder.feed(b"data: {\"con").is_empty());
        assert!(decoder.feed(b"tent\":1}\n").is_empty());
        assert_eq!(decoder.remaining(), "data: {\"content\":1}\n");
        assert_eq!(decoder.feed(b"\n"), vec!["data: {\"content\":1}"]);
    }

    #[test]
    fn test_single_line_feeds_stay_in_message() {
        let mut decoder = EventStreamDecoder::new();
        let messages = decoder.feed(b"event: x\ndata: y\n\n");
        assert_eq!(messages, vec!["event: x\ndata: y"]);
    }

    #[test]
    fn test_crlf_is_not_a_delimiter() {
        let mut decoder = EventStreamDecoder::new();
        assert!(decoder.feed(b"data: a\r\n\r\n").is_empty());
        assert!(decoder.has_remaining());
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let bytes = "data: ä€\n\n".as_bytes();
        let mut decoder = EventStreamDecoder::new();
        // split inside the three-byte euro sign
        assert!(decoder.feed(&bytes[..10]).is_empty());
        assert_eq!(decoder.feed(&bytes[10..]), vec!["data: ä€"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut decoder = EventStreamDecoder::new();
        let messages = decoder.feed(b"data: a\xffb\n\n");
        assert_eq!(messages, vec!["data: a\u{FFFD}b"]);
    }

    #[test]
    fn test_finish_reports_unterminated_data() {
        let mut decoder = EventStreamDecoder::new();
        decoder.feed(b"data: {\"choices\"");
        assert_eq!(decoder.finish().as_deref(), Some("data: {\"choices\""));
    }
}
