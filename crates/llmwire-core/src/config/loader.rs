//! Layered configuration loader

use super::env_loader::load_from_env;
use super::file_loader::load_from_file;
use super::model::{ClientConfig, Protocol};
use crate::error::ClientResult;
use std::path::{Path, PathBuf};

/// Individual settings that override a loaded configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub protocol: Option<Protocol>,
    /// Base URL of the HTTP server
    pub server_url: Option<String>,
    pub api_key: Option<String>,
    pub binary_host: Option<String>,
    pub binary_port: Option<u16>,
    /// Read timeout for the protocol in effect after all layers
    pub read_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    /// Layer `later` on top of `self`; fields set in `later` win
    pub fn merge(self, later: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            protocol: later.protocol.or(self.protocol),
            server_url: later.server_url.or(self.server_url),
            api_key: later.api_key.or(self.api_key),
            binary_host: later.binary_host.or(self.binary_host),
            binary_port: later.binary_port.or(self.binary_port),
            read_timeout_ms: later.read_timeout_ms.or(self.read_timeout_ms),
            log_level: later.log_level.or(self.log_level),
        }
    }

    /// Apply the overrides to a configuration
    pub fn apply(&self, config: &mut ClientConfig) {
        if let Some(protocol) = self.protocol {
            config.protocol = protocol;
        }
        if let Some(url) = &self.server_url {
            config.http.base_url = url.clone();
        }
        if let Some(key) = &self.api_key {
            config.http.api_key = Some(key.clone());
        }
        if let Some(host) = &self.binary_host {
            config.binary.host = host.clone();
        }
        if let Some(port) = self.binary_port {
            config.binary.port = port;
        }
        if let Some(timeout) = self.read_timeout_ms {
            match config.protocol {
                Protocol::Binary => config.binary.read_timeout_ms = timeout,
                Protocol::Http => config.http.read_timeout_ms = Some(timeout),
            }
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}

/// Configuration loader with support for multiple sources
///
/// Sources are applied in order: defaults, file, environment, overrides.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    use_env: bool,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file source
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add environment variables source
    pub fn with_env(mut self) -> Self {
        self.use_env = true;
        self
    }

    /// Add explicit overrides, applied last
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Load and validate the configuration
    pub fn load(self) -> ClientResult<ClientConfig> {
        let env = if self.use_env {
            Some(load_from_env()?)
        } else {
            None
        };
        self.load_layers(env)
    }

    /// Environment and explicit overrides are merged before they are
    /// applied, so the read timeout lands on the final protocol.
    fn load_layers(self, env: Option<ConfigOverrides>) -> ClientResult<ClientConfig> {
        let mut config = match &self.file {
            Some(path) => load_from_file(path)?,
            None => ClientConfig::default(),
        };

        env.unwrap_or_default()
            .merge(self.overrides)
            .apply(&mut config);
        config.validate()?;

        tracing::debug!(
            protocol = %config.protocol,
            server = %config.http.base_url,
            binary = %config.binary.address(),
            "configuration loaded"
        );

        Ok(config)
    }
}
