//! Binary TCP protocol
//!
//! Request layout (all lengths big-endian):
//! ```text
//! "LLM1" | BeginOfRequest | task-kind id
//! SystemPrompt | u32 len | payload
//! Prompt       | u32 len | payload            (Prompt tasks)
//! FimBefore    | u32 len | payload            (Fill-in-Middle tasks)
//! FimAfter     | u32 len | payload            (Fill-in-Middle tasks)
//! EndOfRequest
//! ```
//!
//! Response layout:
//! ```text
//! "LLM1" | (u8 len | len bytes UTF-8)* | 0
//! ```
//!
//! After the terminating zero the client sends a single `CloseConnection` byte.

mod chunk;
mod client;
mod reader;

pub use chunk::{
    Chunk, ChunkType, EYE_CATCHER, MAX_TOKEN_LEN, TokenFrame, decode_chunk, decode_request,
    decode_token, encode_chunk, encode_control, encode_request, encode_response, encode_token,
};
pub use client::BinaryClient;
pub use reader::FrameReader;
