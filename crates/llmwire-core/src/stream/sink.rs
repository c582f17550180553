//! Callback sinks receiving streamed output

use std::sync::Arc;
use tokio::sync::mpsc;

/// Receiver of one request's output.
///
/// Implementations are called from the worker running the request and must
/// be callable from any thread. For a single request, every `on_token` call
/// happens before the one terminal `on_result` or `on_status` call.
pub trait StreamSink: Send + Sync {
    /// One generated token, in arrival order
    fn on_token(&self, token: &str);

    /// Truncated preview of the text generated so far
    fn on_progress(&self, _preview: &str) {}

    /// Terminal failure or cancellation notice
    fn on_status(&self, status: &str);

    /// Full generated text after a clean completion
    fn on_result(&self, text: &str);
}

impl<T: StreamSink + ?Sized> StreamSink for Arc<T> {
    fn on_token(&self, token: &str) {
        (**self).on_token(token)
    }

    fn on_progress(&self, preview: &str) {
        (**self).on_progress(preview)
    }

    fn on_status(&self, status: &str) {
        (**self).on_status(status)
    }

    fn on_result(&self, text: &str) {
        (**self).on_result(text)
    }
}

/// Event emitted by a [`ChannelSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Token(String),
    Progress(String),
    Status(String),
    Result(String),
}

impl StreamEvent {
    /// Whether this event ends the request
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Status(_) | Self::Result(_))
    }
}

/// Sink forwarding every callback as a [`StreamEvent`] over a channel.
///
/// Sends to a closed channel are dropped silently; a caller that stopped
/// listening no longer cares about the output.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<StreamEvent>,
    progress: bool,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<StreamEvent>) -> Self {
        Self {
            tx,
            progress: false,
        }
    }

    /// Create a sink and the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Also forward progress previews
    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }

    fn send(&self, event: StreamEvent) {
        let _ = self.tx.send(event);
    }
}

impl StreamSink for ChannelSink {
    fn on_token(&self, token: &str) {
        self.send(StreamEvent::Token(token.to_string()));
    }

    fn on_progress(&self, preview: &str) {
        if self.progress {
            self.send(StreamEvent::Progress(preview.to_string()));
        }
    }

    fn on_status(&self, status: &str) {
        self.send(StreamEvent::Status(status.to_string()));
    }

    fn on_result(&self, text: &str) {
        self.send(StreamEvent::Result(text.to_string()));
    }
}
