//! Error types for llmwire
//!
//! Every failure that ends a streaming request is a [`ClientError`]. The
//! variants follow the failure classes of the streaming protocols:
//! - `Connection`: socket/HTTP connect failures and non-200 responses
//! - `Protocol`: malformed framing, bad eye-catcher, short reads, bad JSON
//! - `StreamTruncated`: the server closed the stream before a terminal marker
//! - `Cancelled`: the caller cancelled the request
//! - `Config`: invalid configuration or task values, detected before any I/O

mod constructors;
mod conversions;
mod types;

pub use types::{ClientError, ClientResult, ErrorCategory};
