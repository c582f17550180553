//! Core error type for llmwire

use thiserror::Error;

/// Result type alias for llmwire operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Error raised by a streaming client.
///
/// All variants are terminal for the request that raised them. None are
/// retried internally; retry policy belongs to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Socket or HTTP connection failures, including non-200 responses
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        status_code: Option<u16>,
        context: Option<String>,
    },

    /// Malformed frames, eye-catcher mismatch, short reads, malformed payloads
    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        context: Option<String>,
    },

    /// End of stream before a terminal marker
    #[error("Stream truncated: {message}")]
    StreamTruncated {
        message: String,
        context: Option<String>,
    },

    /// Caller-initiated abort observed while waiting on the server
    #[error("Request cancelled: {message}")]
    Cancelled { message: String },

    /// Invalid configuration or task values
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },
}

/// Coarse classification of a [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network connectivity or server availability
    Network,
    /// The peer violated the wire protocol
    Protocol,
    /// The response ended early
    Truncation,
    /// User-initiated cancellation
    Cancellation,
    /// Configuration issues
    Configuration,
}

impl ErrorCategory {
    /// Get a user-friendly category name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Network => "Network Error",
            Self::Protocol => "Protocol Error",
            Self::Truncation => "Truncated Response",
            Self::Cancellation => "Cancelled",
            Self::Configuration => "Configuration Error",
        }
    }
}

impl ClientError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "CONNECTION_ERROR",
            Self::Protocol { .. } => "PROTOCOL_ERROR",
            Self::StreamTruncated { .. } => "STREAM_TRUNCATED",
            Self::Cancelled { .. } => "CANCELLED",
            Self::Config { .. } => "CONFIG_ERROR",
        }
    }

    /// The bare message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Connection { message, .. }
            | Self::Protocol { message, .. }
            | Self::StreamTruncated { message, .. }
            | Self::Cancelled { message }
            | Self::Config { message, .. } => message,
        }
    }

    /// Additional context, if any was attached
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Connection { context, .. }
            | Self::Protocol { context, .. }
            | Self::StreamTruncated { context, .. }
            | Self::Config { context, .. } => context.as_deref(),
            Self::Cancelled { .. } => None,
        }
    }

    /// Category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Connection { .. } => ErrorCategory::Network,
            Self::Protocol { .. } => ErrorCategory::Protocol,
            Self::StreamTruncated { .. } => ErrorCategory::Truncation,
            Self::Cancelled { .. } => ErrorCategory::Cancellation,
            Self::Config { .. } => ErrorCategory::Configuration,
        }
    }

    /// Check if this error was caused by cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// HTTP status code for rejected HTTP requests
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Connection { status_code, .. } => *status_code,
            _ => None,
        }
    }
}
