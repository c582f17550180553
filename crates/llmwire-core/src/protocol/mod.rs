//! Wire protocols spoken to the inference server
//!
//! - [`binary`]: custom length-prefixed framing over a raw TCP socket
//! - [`sse`]: HTTP POST with an OpenAI-style Server-Sent-Events response

pub mod binary;
pub mod sse;

pub use binary::BinaryClient;
pub use sse::SseClient;
