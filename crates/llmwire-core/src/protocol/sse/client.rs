//! HTTP event-stream client

use super::decoder::EventStreamDecoder;
use super::message::SseMessage;
use super::payload::{
    ChatDelta, InfillDelta, extract_chat_delta, extract_infill, parse_object, request_body,
};
use crate::config::{FimConfig, HttpConfig};
use crate::error::{ClientError, ClientResult};
use crate::stream::{StreamSink, StreamState, StreamingTransport};
use crate::task::{Task, TaskKind};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use std::ops::ControlFlow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

const TRUNCATED: &str = "Unexpected end of server response";

/// Client for OpenAI-style chat completions and llama.cpp-style infill,
/// both streamed as server-sent events
#[derive(Debug, Clone)]
pub struct SseClient {
    config: HttpConfig,
    fim: FimConfig,
    http: reqwest::Client,
}

impl SseClient {
    pub fn new(config: HttpConfig, fim: FimConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self::with_client(config, fim, http))
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(config: HttpConfig, fim: FimConfig, http: reqwest::Client) -> Self {
        Self { config, fim, http }
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Next body chunk; `None` at end of stream
    async fn next_chunk<S>(&self, body: &mut S) -> ClientResult<Option<Bytes>>
    where
        S: Stream<Item = reqwest::Result<Bytes>> + Unpin,
    {
        let next = match self.config.read_timeout() {
            Some(limit) => tokio::time::timeout(limit, body.next())
                .await
                .map_err(|_| {
                    ClientError::connection(format!(
                        "No data from server within {} ms",
                        limit.as_millis()
                    ))
                })?,
            None => body.next().await,
        };
        match next {
            None => Ok(None),
            Some(Ok(bytes)) => Ok(Some(bytes)),
            Some(Err(e)) => Err(ClientError::truncated(format!("{}: {}", TRUNCATED, e))),
        }
    }

    /// Handle one complete message; `Break` ends the stream normally
    fn handle_message(
        &self,
        message: &str,
        kind: TaskKind,
        state: &mut StreamState,
        sink: &dyn StreamSink,
    ) -> ClientResult<ControlFlow<()>> {
        debug!(message = message.trim(), "event-stream message");
        let json = match SseMessage::classify(message) {
            SseMessage::Comment(comment) => {
                info!("server-side comment: {}", comment);
                return Ok(ControlFlow::Continue(()));
            }
            SseMessage::Done => return Ok(ControlFlow::Break(())),
            SseMessage::Unexpected(line) => {
                warn!("unexpected message: {}", line);
                return Ok(ControlFlow::Continue(()));
            }
            SseMessage::Data(json) => json,
        };

        let value = parse_object(json)?;
        match kind {
            TaskKind::Prompt => match extract_chat_delta(&value) {
                ChatDelta::Content(content) => state.push(&content, sink),
                ChatDelta::Empty => debug!("delta without content"),
                ChatDelta::Skip(reason) => warn!("skipped message ({}): {}", reason, json),
            },
            TaskKind::FillInMiddle => match extract_infill(&value, &self.fim.stop_token_ids) {
                InfillDelta::Content(content) => state.push(&content, sink),
                InfillDelta::Stop => return Ok(ControlFlow::Break(())),
                InfillDelta::Skip(reason) => warn!("skipped message ({}): {}", reason, json),
            },
        }
        Ok(ControlFlow::Continue(()))
    }
}

fn cancelled(state: &StreamState) -> ClientError {
    ClientError::cancelled(format!(
        "Cancel while reading the server response (received {} chars)",
        state.len()
    ))
}

#[async_trait]
impl StreamingTransport for SseClient {
    #[instrument(skip_all, fields(base_url = %self.config.base_url))]
    async fn stream(
        &self,
        task: &Task,
        state: &mut StreamState,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        if cancel.is_cancelled() {
            return Err(ClientError::cancelled("Cancel before sending the request"));
        }

        let url = self.config.endpoint_for(task.kind());
        let body = request_body(task)?;
        info!(%url, len = body.len(), "connecting to LLM server");

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .body(body);
        if let Some(api_key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, api_key.as_str());
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ClientError::cancelled("Cancel while waiting for the server"));
            }
            response = request.send() => response?,
        };

        let status = response.status();
        if status != StatusCode::OK {
            let reason = status.canonical_reason().unwrap_or_default();
            error!("server error: {} - {}", status.as_u16(), reason);
            return Err(ClientError::http_status(status.as_u16(), reason).with_context(url));
        }

        let mut body = Box::pin(response.bytes_stream());
        let mut decoder = EventStreamDecoder::new();
        loop {
            if cancel.is_cancelled() {
                return Err(cancelled(state));
            }
            let chunk = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(state)),
                chunk = self.next_chunk(&mut body) => chunk?,
            };
            let Some(chunk) = chunk else {
                if let Some(rest) = decoder.finish() {
                    error!("unexpected end of stream: {}", rest.trim());
                }
                return Err(ClientError::truncated(TRUNCATED));
            };

            for message in decoder.feed(&chunk) {
                if cancel.is_cancelled() {
                    return Err(cancelled(state));
                }
                if self
                    .handle_message(&message, task.kind(), state, sink)?
                    .is_break()
                {
                    return Ok(());
                }
            }
        }
    }
}
