//! Constructor methods for ClientError

use super::types::ClientError;

impl ClientError {
    /// Create a new connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            status_code: None,
            context: None,
        }
    }

    /// Create a connection error for a non-200 HTTP response
    pub fn http_status(status_code: u16, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let message = if reason.is_empty() {
            format!("server error: {}", status_code)
        } else {
            format!("server error: {} - {}", status_code, reason)
        };
        Self::Connection {
            message,
            status_code: Some(status_code),
            context: None,
        }
    }

    /// Create a new protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new stream-truncated error
    pub fn truncated(message: impl Into<String>) -> Self {
        Self::StreamTruncated {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new cancellation error
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Attach context to the error. Cancellation carries no context.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        match &mut self {
            Self::Connection { context, .. }
            | Self::Protocol { context, .. }
            | Self::StreamTruncated { context, .. }
            | Self::Config { context, .. } => *context = Some(ctx.into()),
            Self::Cancelled { .. } => {}
        }
        self
    }
}
