//! HTTP server-sent-events protocol
//!
//! Prompt tasks go to an OpenAI-style chat-completion endpoint, fill-in-middle
//! tasks to a llama.cpp-style infill endpoint. Both answer with an event
//! stream of `data: {json}` messages separated by blank lines.

mod client;
mod decoder;
mod message;
mod payload;

pub use client::SseClient;
pub use decoder::EventStreamDecoder;
pub use message::SseMessage;
pub use payload::{
    ChatDelta, ChatMessage, ChatRequest, InfillDelta, InfillRequest, extract_chat_delta,
    extract_infill, parse_object, request_body,
};
