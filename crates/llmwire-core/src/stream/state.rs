//! Per-request response accumulator

use super::sink::StreamSink;

/// Number of trailing characters shown in a progress preview
pub const PREVIEW_CHARS: usize = 32;

/// Accumulated response of one in-flight request.
///
/// Owned by the running request and dropped when it terminates.
#[derive(Debug, Default)]
pub struct StreamState {
    text: String,
    chars: usize,
    tokens: usize,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token and forward it to the sink, followed by a progress preview
    pub fn push(&mut self, token: &str, sink: &dyn StreamSink) {
        self.text.push_str(token);
        self.chars += token.chars().count();
        self.tokens += 1;
        tracing::debug!(token, len = self.chars, "received token");
        sink.on_token(token);
        sink.on_progress(&self.preview());
    }

    /// `#len=N [...tail]` with the last 32 characters of the response
    pub fn preview(&self) -> String {
        let skip = self.chars.saturating_sub(PREVIEW_CHARS);
        let tail: String = self.text.chars().skip(skip).collect();
        format!("#len={} [...{}]", self.chars, tail)
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.chars
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::sink::{ChannelSink, StreamEvent};

    #[test]
    fn test_push_emits_token_then_progress() {
        let (sink, mut rx) = ChannelSink::channel();
        let sink = sink.with_progress();
        let mut state = StreamState::new();

        state.push("abc", &sink);
        state.push("defgh", &sink);

        assert_eq!(rx.try_recv().unwrap(), StreamEvent::Token("abc".into()));
        assert_eq!(
            rx.try_recv().unwrap(),
            StreamEvent::Progress("#len=3 [...abc]".into())
        );
        assert_eq!(rx.try_recv().unwrap(), StreamEvent::Token("defgh".into()));
        assert_eq!(state.text(), "abcdefgh");
        assert_eq!(state.token_count(), 2);
    }

    #[test]
    fn test_preview_keeps_last_32_chars() {
        let (sink, _rx) = ChannelSink::channel();
        let mut state = StreamState::new();
        state.push(&"x".repeat(40), &sink);
        state.push("ünd", &sink);

        assert_eq!(state.len(), 43);
        let preview = state.preview();
        assert_eq!(preview, format!("#len=43 [...{}ünd]", "x".repeat(29)));
    }

    #[test]
    fn test_empty_state() {
        let state = StreamState::new();
        assert!(state.is_empty());
        assert_eq!(state.preview(), "#len=0 [...]");
        assert_eq!(state.into_text(), "");
    }
}
