//! Cancellable fixed-size reads on the binary response stream

use super::chunk::{EYE_CATCHER, MAX_TOKEN_LEN, TokenFrame, check_eye_catcher};
use crate::error::{ClientError, ClientResult};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::sync::CancellationToken;
use tracing::trace;

const BUF_LEN: usize = MAX_TOKEN_LEN + 1;

fn unit(n: usize) -> &'static str {
    if n == 1 { "byte" } else { "bytes" }
}

/// Reads response frames with cooperative cancellation.
///
/// Every read waits at most `poll_interval`. A read that times out is not an
/// error: the cancellation token is re-checked and the read is resumed
/// without losing bytes already received.
pub struct FrameReader<R> {
    inner: R,
    poll_interval: Duration,
    buf: [u8; BUF_LEN],
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, poll_interval: Duration) -> Self {
        Self {
            inner,
            poll_interval,
            buf: [0; BUF_LEN],
        }
    }

    /// Read exactly `n` bytes (`n <= 256`).
    ///
    /// Fails with `Cancelled` when the token is set before the frame is
    /// complete and with `Protocol` when the peer closes the stream early.
    pub async fn read_exact_cancellable(
        &mut self,
        n: usize,
        cancel: &CancellationToken,
    ) -> ClientResult<&[u8]> {
        debug_assert!(n <= BUF_LEN);
        let mut offset = 0;
        while offset < n {
            if cancel.is_cancelled() {
                return Err(ClientError::cancelled(format!(
                    "Cancel while reading {} {} (offset = {})",
                    n,
                    unit(n),
                    offset
                )));
            }

            let read = tokio::select! {
                biased;
                _ = cancel.cancelled() => continue,
                read = tokio::time::timeout(
                    self.poll_interval,
                    self.inner.read(&mut self.buf[offset..n]),
                ) => read,
            };

            match read {
                Err(_elapsed) => {
                    trace!(offset, n, "read timed out, checking for cancellation");
                }
                Ok(Ok(0)) => break,
                Ok(Ok(len)) => offset += len,
                Ok(Err(e)) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    trace!(offset, n, "socket read timed out, checking for cancellation");
                }
                Ok(Err(e)) if e.kind() == ErrorKind::Interrupted => {}
                Ok(Err(e)) => return Err(e.into()),
            }
        }

        if offset < n {
            return Err(ClientError::protocol(format!(
                "Read {} of {} {} only",
                offset,
                n,
                unit(n)
            )));
        }
        Ok(&self.buf[..n])
    }

    /// Read and verify the response eye-catcher
    pub async fn read_eye_catcher(&mut self, cancel: &CancellationToken) -> ClientResult<()> {
        let bytes = self
            .read_exact_cancellable(EYE_CATCHER.len(), cancel)
            .await?;
        check_eye_catcher(bytes)
    }

    /// Read the next token frame
    pub async fn read_token(&mut self, cancel: &CancellationToken) -> ClientResult<TokenFrame> {
        let len = self.read_exact_cancellable(1, cancel).await?[0];
        if len == 0 {
            return Ok(TokenFrame::from_parts(len, &[]));
        }
        let payload = self.read_exact_cancellable(len as usize, cancel).await?;
        Ok(TokenFrame::from_parts(len, payload))
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn reader(mock: tokio_test::io::Mock) -> FrameReader<tokio_test::io::Mock> {
        FrameReader::new(mock, Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_reads_tokens_split_across_reads() {
        let mock = Builder::new()
            .read(b"LL")
            .read(b"M1")
            .read(&[3, b'a'])
            .read(b"bc")
            .read(&[0])
            .build();
        let mut frames = reader(mock);
        let cancel = CancellationToken::new();

        frames.read_eye_catcher(&cancel).await.unwrap();
        assert_eq!(
            frames.read_token(&cancel).await.unwrap(),
            TokenFrame::Token("abc".to_string())
        );
        assert_eq!(frames.read_token(&cancel).await.unwrap(), TokenFrame::End);
    }

    #[tokio::test]
    async fn test_timeout_is_retried_without_losing_bytes() {
        let mock = Builder::new()
            .read(b"LL")
            .wait(Duration::from_millis(120))
            .read(b"M1")
            .build();
        let mut frames = reader(mock);
        let cancel = CancellationToken::new();

        frames.read_eye_catcher(&cancel).await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_eye_catcher_is_protocol_error() {
        let mock = Builder::new().read(b"XXXX").build();
        let mut frames = reader(mock);

        let err = frames
            .read_eye_catcher(&CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PROTOCOL_ERROR");
        assert_eq!(err.message(), "Invalid eye-catcher: XXXX");
    }

    #[tokio::test]
    async fn test_short_read() {
        let mock = Builder::new().read(&[5, b'a', b'b']).build();
        let mut frames = reader(mock);

        let err = frames
            .read_token(&CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Read 2 of 5 bytes only");
    }

    #[tokio::test]
    async fn test_cancelled_before_read() {
        let mock = Builder::new().build();
        let mut frames = reader(mock);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = frames.read_eye_catcher(&cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.message(), "Cancel while reading 4 bytes (offset = 0)");
    }

    #[tokio::test]
    async fn test_cancelled_while_waiting() {
        let (client, _server) = tokio::io::duplex(64);
        let mut frames = FrameReader::new(client, Duration::from_secs(3));
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = std::time::Instant::now();
        let err = frames.read_token(&cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(3));
    }
}
