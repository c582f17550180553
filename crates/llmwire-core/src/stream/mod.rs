//! Streaming output plumbing shared by both transports
//!
//! A request writes its tokens into a [`StreamState`], which forwards them to
//! a [`StreamSink`]. [`StreamingClient::run`] delivers the terminal result or
//! status exactly once.

mod client;
mod sink;
mod state;

pub use client::{StreamingClient, StreamingTransport};
pub use sink::{ChannelSink, StreamEvent, StreamSink};
pub use state::{PREVIEW_CHARS, StreamState};
