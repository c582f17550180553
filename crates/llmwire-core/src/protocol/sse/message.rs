//! Classification of event-stream messages

const DATA_PREFIX: &str = "data: ";
const DONE_PREFIX: &str = "data: [DONE]";

/// One event-stream message, classified by its prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseMessage<'a> {
    /// `:`-prefixed keep-alive or server comment
    Comment(&'a str),
    /// `data: [DONE]` end marker
    Done,
    /// JSON payload following `data: `, trimmed
    Data(&'a str),
    /// Anything else; logged and skipped
    Unexpected(&'a str),
}

impl<'a> SseMessage<'a> {
    pub fn classify(message: &'a str) -> Self {
        if let Some(comment) = message.strip_prefix(':') {
            Self::Comment(comment.trim())
        } else if message.starts_with(DONE_PREFIX) {
            Self::Done
        } else if let Some(json) = message.strip_prefix(DATA_PREFIX) {
            Self::Data(json.trim())
        } else {
            Self::Unexpected(message.trim())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(SseMessage::classify(": ping"), SseMessage::Comment("ping"));
        assert_eq!(SseMessage::classify("data: [DONE]"), SseMessage::Done);
        assert_eq!(
            SseMessage::classify("data: {\"a\":1}\r\n"),
            SseMessage::Data("{\"a\":1}")
        );
        assert_eq!(
            SseMessage::classify("event: message\ndata: {}"),
            SseMessage::Unexpected("event: message\ndata: {}")
        );
    }

    #[test]
    fn test_data_needs_space_after_colon() {
        assert_eq!(
            SseMessage::classify("data:{}"),
            SseMessage::Unexpected("data:{}")
        );
    }

    #[test]
    fn test_done_prefix_wins_over_trailing_text() {
        assert_eq!(SseMessage::classify("data: [DONE] bye"), SseMessage::Done);
    }
}
