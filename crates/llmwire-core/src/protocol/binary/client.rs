//! Binary protocol client

use super::chunk::{ChunkType, TokenFrame, encode_request};
use super::reader::FrameReader;
use crate::config::BinaryConfig;
use crate::error::{ClientError, ClientResult};
use crate::stream::{StreamSink, StreamState, StreamingTransport};
use crate::task::{Task, TaskKind};
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Client for the length-prefixed binary TCP protocol.
///
/// Each request opens its own connection, which is closed on every exit
/// path when the stream is dropped.
#[derive(Debug, Clone)]
pub struct BinaryClient {
    config: BinaryConfig,
}

impl BinaryClient {
    pub fn new(config: BinaryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BinaryConfig {
        &self.config
    }

    async fn connect(&self, cancel: &CancellationToken) -> ClientResult<TcpStream> {
        let address = self.config.address();
        if cancel.is_cancelled() {
            return Err(ClientError::cancelled(format!(
                "Cancel before connecting to {}",
                address
            )));
        }

        info!(%address, "connecting to LLM server");
        let connect = tokio::time::timeout(
            self.config.connect_timeout(),
            TcpStream::connect(address.as_str()),
        );
        let stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(ClientError::cancelled(format!(
                    "Cancel while connecting to {}",
                    address
                )));
            }
            connected = connect => match connected {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(ClientError::from(e).with_context(address.clone())),
                Err(_elapsed) => {
                    return Err(ClientError::connection(format!(
                        "Connect to {} timed out after {} ms",
                        address, self.config.connect_timeout_ms
                    )));
                }
            },
        };
        if let Err(e) = stream.set_nodelay(true) {
            debug!("could not set TCP_NODELAY: {}", e);
        }
        Ok(stream)
    }

    /// Run one request/response cycle over an established stream.
    ///
    /// Writes the framed request, forwards every response token to `state`
    /// and finally sends `CloseConnection`. A failure to send that last byte
    /// is logged and does not fail the request.
    pub async fn exchange<S>(
        &self,
        stream: S,
        task: &Task,
        state: &mut StreamState,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> ClientResult<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let request = encode_request(task)?;
        let (reader, writer) = tokio::io::split(stream);
        let mut writer = BufWriter::new(writer);
        writer.write_all(&request).await?;
        writer.flush().await?;
        match task.kind() {
            TaskKind::Prompt => info!(
                len = task.prompt_text().map_or(0, str::len),
                "sent prompt"
            ),
            TaskKind::FillInMiddle => info!(
                prefix_len = task.fim_prefix().map_or(0, str::len),
                suffix_len = task.fim_suffix().map_or(0, str::len),
                "sent fill-in-middle request"
            ),
        }
        if task.kind() == TaskKind::FillInMiddle && task.prompt_text().is_some() {
            debug!("binary protocol has no chunk for a fill-in-middle prompt, not sent");
        }

        let mut frames = FrameReader::new(reader, self.config.read_timeout());
        frames.read_eye_catcher(cancel).await?;
        while let TokenFrame::Token(token) = frames.read_token(cancel).await? {
            state.push(&token, sink);
        }

        let close = async {
            writer.write_u8(ChunkType::CloseConnection.id()).await?;
            writer.flush().await
        };
        if let Err(e) = close.await {
            warn!("could not send close-connection: {}", e);
        }
        Ok(())
    }
}

#[async_trait]
impl StreamingTransport for BinaryClient {
    #[instrument(skip_all, fields(address = %self.config.address()))]
    async fn stream(
        &self,
        task: &Task,
        state: &mut StreamState,
        sink: &dyn StreamSink,
        cancel: &CancellationToken,
    ) -> ClientResult<()> {
        let stream = self.connect(cancel).await?;
        self.exchange(stream, task, state, sink, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::binary::chunk::{decode_request, encode_response};
    use crate::stream::{ChannelSink, StreamEvent, StreamingClient};
    use bytes::BytesMut;
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection, decode the request, answer with `response`,
    /// then report the decoded task and the trailing control byte.
    async fn serve_once(response: Vec<u8>) -> (BinaryConfig, JoinHandle<(Task, Option<u8>)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = BinaryConfig {
            host: "127.0.0.1".to_string(),
            port: listener.local_addr().unwrap().port(),
            ..Default::default()
        };
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = BytesMut::new();
            let task = loop {
                if let Some(task) = decode_request(&mut buf).unwrap() {
                    break task;
                }
                let n = socket.read_buf(&mut buf).await.unwrap();
                assert!(n > 0, "request incomplete");
            };
            socket.write_all(&response).await.unwrap();
            let _ = socket.shutdown().await;
            let close = socket.read_u8().await.ok();
            (task, close)
        });
        (config, handle)
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_token_stream_end_to_end() {
        let response = encode_response(&["abc", "defgh"]).unwrap().to_vec();
        let (config, server) = serve_once(response).await;
        let client = StreamingClient::Binary(BinaryClient::new(config));
        let (sink, mut rx) = ChannelSink::channel();
        let task = Task::prompt(Some("You are terse.".into()), "2+2=");

        let text = client
            .run(&task, &sink, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(text, "abcdefgh");

        let (received, close) = server.await.unwrap();
        assert_eq!(received, task);
        assert_eq!(close, Some(ChunkType::CloseConnection.id()));
        assert_eq!(
            drain(&mut rx),
            vec![
                StreamEvent::Token("abc".into()),
                StreamEvent::Token("defgh".into()),
                StreamEvent::Result("abcdefgh".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_fill_in_middle_request_reaches_server() {
        let response = encode_response(&["x + y"]).unwrap().to_vec();
        let (config, server) = serve_once(response).await;
        let client = BinaryClient::new(config);
        let (sink, _rx) = ChannelSink::channel();
        let task = Task::fill_in_middle(None, "fn add(x, y) { ", " }", None);
        let mut state = StreamState::new();

        client
            .stream(&task, &mut state, &sink, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(state.text(), "x + y");

        let (received, _) = server.await.unwrap();
        assert_eq!(received.fim_prefix(), Some("fn add(x, y) { "));
        assert_eq!(received.fim_suffix(), Some(" }"));
    }

    #[tokio::test]
    async fn test_bad_eye_catcher_never_reaches_result() {
        let (config, server) = serve_once(b"XXXX\x03abc\x00".to_vec()).await;
        let client = StreamingClient::Binary(BinaryClient::new(config));
        let (sink, mut rx) = ChannelSink::channel();

        let err = client
            .run(&Task::prompt(None, "hi"), &sink, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PROTOCOL_ERROR");
        assert_eq!(
            drain(&mut rx),
            vec![StreamEvent::Status(
                "Protocol error: Invalid eye-catcher: XXXX".into()
            )]
        );
        let (_, close) = server.await.unwrap();
        assert_eq!(close, None);
    }

    #[tokio::test]
    async fn test_short_read_is_protocol_error() {
        let (config, _server) = serve_once(b"LLM1\x05ab".to_vec()).await;
        let client = BinaryClient::new(config);
        let (sink, _rx) = ChannelSink::channel();
        let mut state = StreamState::new();

        let err = client
            .stream(
                &Task::prompt(None, "hi"),
                &mut state,
                &sink,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Read 2 of 5 bytes only");
    }

    #[tokio::test]
    async fn test_cancelled_before_start_emits_nothing() {
        let (config, server) = serve_once(encode_response(&["abc"]).unwrap().to_vec()).await;
        let client = StreamingClient::Binary(BinaryClient::new(config));
        let (sink, mut rx) = ChannelSink::channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .run(&Task::prompt(None, "hi"), &sink, &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StreamEvent::Status(_)));
        server.abort();
    }

    #[tokio::test]
    async fn test_cancel_mid_stream() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = BinaryConfig {
            host: "127.0.0.1".to_string(),
            port: listener.local_addr().unwrap().port(),
            ..Default::default()
        };
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"LLM1\x03abc").await.unwrap();
            let mut rest = Vec::new();
            let _ = socket.read_to_end(&mut rest).await;
        });

        let client = StreamingClient::Binary(BinaryClient::new(config));
        let (sink, mut rx) = ChannelSink::channel();
        let cancel = CancellationToken::new();
        let handle = client.spawn(Task::prompt(None, "hi"), Arc::new(sink), cancel.clone());

        assert_eq!(rx.recv().await, Some(StreamEvent::Token("abc".into())));
        cancel.cancel();

        let err = handle.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
        assert!(matches!(rx.recv().await, Some(StreamEvent::Status(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = BinaryClient::new(BinaryConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..Default::default()
        });
        let (sink, _rx) = ChannelSink::channel();
        let mut state = StreamState::new();
        let err = client
            .stream(
                &Task::prompt(None, "hi"),
                &mut state,
                &sink,
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "CONNECTION_ERROR");
        assert_eq!(err.context(), Some(format!("127.0.0.1:{}", port).as_str()));
    }

    #[tokio::test]
    async fn test_exchange_over_duplex() {
        let (client_io, mut server_io) = tokio::io::duplex(1024);
        let server = tokio::spawn(async move {
            let mut buf = BytesMut::new();
            let task = loop {
                if let Some(task) = decode_request(&mut buf).unwrap() {
                    break task;
                }
                server_io.read_buf(&mut buf).await.unwrap();
            };
            let response = encode_response(&["ok"]).unwrap();
            server_io.write_all(&response).await.unwrap();
            let close = server_io.read_u8().await.unwrap();
            (task, close)
        });

        let client = BinaryClient::new(BinaryConfig::default());
        let (sink, _rx) = ChannelSink::channel();
        let mut state = StreamState::new();
        client
            .exchange(
                client_io,
                &Task::prompt(None, "ping"),
                &mut state,
                &sink,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(state.into_text(), "ok");
        let (task, close) = server.await.unwrap();
        assert_eq!(task.prompt_text(), Some("ping"));
        assert_eq!(close, 0x03);
    }
}
