//! Transport-independent entry point

use super::sink::StreamSink;
use super::state::StreamState;
use crate::config::{ClientConfig, Protocol};
use crate::error::ClientResult;
use crate::protocol::{BinaryClient, SseClient};
use crate::task::Task;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

/// One request/response exchange over a concrete transport.
///
/// Implementations push every token through `state` and must not call the
/// terminal sink callbacks; [`StreamingClient::run`] owns those.
#[async_trait]
pub trait StreamingTransport: Send + Sync {
    async fn stream(
        &self,
        task: &Task,
        state: &mut StreamState,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> ClientResult<()>;
}

/// Streaming client selected by configuration
#[derive(Debug, Clone)]
pub enum StreamingClient {
    Binary(BinaryClient),
    Sse(SseClient),
}

impl StreamingClient {
    /// Build the client for the configured protocol
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let client = match config.protocol {
            Protocol::Binary => Self::Binary(BinaryClient::new(config.binary.clone())),
            Protocol::Http => Self::Sse(SseClient::new(config.http.clone(), config.fim.clone())?),
        };
        Ok(client)
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Binary(_) => Protocol::Binary,
            Self::Sse(_) => Protocol::Http,
        }
    }

    fn transport(&self) -> &dyn StreamingTransport {
        match self {
            Self::Binary(client) => client,
            Self::Sse(client) => client,
        }
    }

    /// Run one task to completion.
    ///
    /// Tokens go to `sink.on_token` as they arrive. On success the full text
    /// is passed once to `sink.on_result` and returned; on failure or
    /// cancellation `sink.on_status` is called once with the error
    /// description and `on_result` is never called.
    #[instrument(skip_all, fields(kind = %task.kind(), protocol = %self.protocol()))]
    pub async fn run(
        &self,
        task: &Task,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> ClientResult<String> {
        let mut state = StreamState::new();
        let outcome = match task.validate() {
            Ok(()) => {
                self.transport()
                    .stream(task, &mut state, sink, cancel)
                    .await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                info!(
                    len = state.len(),
                    tokens = state.token_count(),
                    "request completed"
                );
                let text = state.into_text();
                sink.on_result(&text);
                Ok(text)
            }
            Err(e) => {
                if e.is_cancelled() {
                    info!(received = state.len(), "request cancelled: {}", e.message());
                } else {
                    error!(code = e.error_code(), received = state.len(), "request failed: {}", e);
                }
                sink.on_status(&e.to_string());
                Err(e)
            }
        }
    }

    /// Run a task on its own tokio task
    pub fn spawn(
        &self,
        task: Task,
        sink: Arc<dyn StreamSink>,
        cancel: CancellationToken,
    ) -> JoinHandle<ClientResult<String>> {
        let client = self.clone();
        tokio::spawn(async move { client.run(&task, sink.as_ref(), &cancel).await })
    }
}
