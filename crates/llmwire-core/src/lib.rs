//! llmwire core library
//!
//! Streaming clients for local or remote language-model inference servers.
//! A [`Task`] is sent over one of two interchangeable transports, and the
//! generated text is delivered token by token to a [`StreamSink`]:
//! - the binary `LLM1` protocol over a raw TCP socket
//! - HTTP with a server-sent-events response (chat completion or infill)
//!
//! ```no_run
//! use llmwire_core::{ChannelSink, ClientConfig, StreamingClient, Task};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> llmwire_core::ClientResult<()> {
//! let client = StreamingClient::from_config(&ClientConfig::default())?;
//! let (sink, _events) = ChannelSink::channel();
//! let text = client
//!     .run(&Task::prompt(None, "2+2="), &sink, &CancellationToken::new())
//!     .await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod stream;
pub mod task;
pub mod template;

// Re-export commonly used types
pub use config::{ClientConfig, ConfigLoader, ConfigOverrides, Protocol};
pub use error::{ClientError, ClientResult, ErrorCategory};
pub use protocol::{BinaryClient, SseClient};
pub use stream::{
    ChannelSink, StreamEvent, StreamSink, StreamState, StreamingClient, StreamingTransport,
};
pub use task::{Task, TaskKind};
pub use template::SelectionRange;
