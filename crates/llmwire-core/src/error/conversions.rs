//! From trait implementations for ClientError conversions

use super::types::ClientError;

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        Self::connection(format!("IO-error: {}", error))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::protocol(format!("malformed JSON payload: {}", error))
    }
}

impl From<std::str::Utf8Error> for ClientError {
    fn from(error: std::str::Utf8Error) -> Self {
        Self::protocol(format!("invalid UTF-8 in payload: {}", error))
    }
}

impl From<std::string::FromUtf8Error> for ClientError {
    fn from(error: std::string::FromUtf8Error) -> Self {
        Self::protocol(format!("invalid UTF-8 in payload: {}", error))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::Connection {
            message: error.to_string(),
            status_code: error.status().map(|s| s.as_u16()),
            context: error.url().map(|u| u.to_string()),
        }
    }
}
