//! Configuration data model

use super::logging_config::LoggingConfig;
use super::timeouts;
use crate::error::{ClientError, ClientResult};
use crate::task::TaskKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Transport used to talk to the inference server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Length-prefixed binary TCP protocol
    Binary,
    /// HTTP POST with a Server-Sent-Events response
    #[default]
    Http,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Http => "http",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "tcp" | "legacy" => Ok(Self::Binary),
            "http" | "sse" => Ok(Self::Http),
            other => Err(ClientError::config(format!("Unknown protocol '{}'", other))),
        }
    }
}

/// Binary protocol settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    /// Read timeout; bounds the cancellation latency
    pub read_timeout_ms: u64,
}

impl Default for BinaryConfig {
    fn default() -> Self {
        Self {
            host: timeouts::binary::HOST.to_string(),
            port: timeouts::binary::PORT,
            connect_timeout_ms: timeouts::binary::CONNECT_MS,
            read_timeout_ms: timeouts::binary::READ_MS,
        }
    }
}

impl BinaryConfig {
    /// `host:port` socket address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// HTTP SSE protocol settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub base_url: String,
    pub chat_path: String,
    pub infill_path: String,
    /// Sent verbatim as the `Authorization` header
    pub api_key: Option<String>,
    pub connect_timeout_ms: u64,
    /// Per-read timeout on the event stream; `None` waits indefinitely
    pub read_timeout_ms: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: timeouts::http::BASE_URL.to_string(),
            chat_path: timeouts::http::CHAT_PATH.to_string(),
            infill_path: timeouts::http::INFILL_PATH.to_string(),
            api_key: None,
            connect_timeout_ms: timeouts::http::CONNECT_MS,
            read_timeout_ms: None,
        }
    }
}

impl HttpConfig {
    fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Chat-completion endpoint URL
    pub fn chat_url(&self) -> String {
        self.join(&self.chat_path)
    }

    /// Infill endpoint URL
    pub fn infill_url(&self) -> String {
        self.join(&self.infill_path)
    }

    /// Endpoint URL for a task kind
    pub fn endpoint_for(&self, kind: TaskKind) -> String {
        match kind {
            TaskKind::Prompt => self.chat_url(),
            TaskKind::FillInMiddle => self.infill_url(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    /// The API key with all but the first four characters masked
    pub fn redacted_api_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            let visible: String = key.chars().take(4).collect();
            format!("{}****", visible)
        })
    }
}

/// Fill-in-middle handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FimConfig {
    /// Token ids that end an infill stream when they arrive with empty content
    pub stop_token_ids: Vec<i64>,
}

impl Default for FimConfig {
    fn default() -> Self {
        Self {
            stop_token_ids: vec![timeouts::fim::START_OF_TURN_TOKEN],
        }
    }
}

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub protocol: Protocol,
    pub binary: BinaryConfig,
    pub http: HttpConfig,
    pub fim: FimConfig,
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Presence checks only; values are otherwise taken as given
    pub fn validate(&self) -> ClientResult<()> {
        match self.protocol {
            Protocol::Binary => {
                if self.binary.host.trim().is_empty() {
                    return Err(ClientError::config("Binary server host must not be empty"));
                }
                if self.binary.port == 0 {
                    return Err(ClientError::config("Binary server port must not be 0"));
                }
                if self.binary.connect_timeout_ms == 0 || self.binary.read_timeout_ms == 0 {
                    return Err(ClientError::config(
                        "Binary connect/read timeouts must be greater than 0",
                    ));
                }
            }
            Protocol::Http => {
                if self.http.base_url.trim().is_empty() {
                    return Err(ClientError::config("Server URL must not be empty"));
                }
                if self.http.read_timeout_ms == Some(0) {
                    return Err(ClientError::config("Read timeout must be greater than 0"));
                }
            }
        }
        Ok(())
    }
}
