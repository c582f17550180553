//! File-based configuration loading

use super::model::ClientConfig;
use crate::error::{ClientError, ClientResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file location (`~/.config/llmwire/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("llmwire").join("config.toml"))
}

/// Load configuration from a file
///
/// Supports TOML, YAML and JSON based on the file extension (JSON otherwise).
/// Returns the default config if the file doesn't exist.
pub fn load_from_file(path: &Path) -> ClientResult<ClientConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(ClientConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ClientError::config(format!("Failed to read config file: {}", e))
            .with_context(format!("Reading configuration from '{}'", path.display()))
    })?;

    let config: ClientConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| {
            ClientError::config(format!("Failed to parse TOML config: {}", e))
                .with_context(format!("Deserializing TOML configuration from '{}'", path.display()))
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
            ClientError::config(format!("Failed to parse YAML config: {}", e))
                .with_context(format!("Deserializing YAML configuration from '{}'", path.display()))
        })?,
        _ => serde_json::from_str(&content).map_err(|e| {
            ClientError::config(format!("Failed to parse JSON config: {}", e))
                .with_context(format!("Deserializing JSON configuration from '{}'", path.display()))
        })?,
    };

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Protocol;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_from_file(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("llmwire.toml");
        fs::write(
            &path,
            r#"
protocol = "http"

[http]
base_url = "http://gpu-box:8080"
api_key = "Bearer abc"
read_timeout_ms = 30000

[fim]
stop_token_ids = [151644, 151645]
"#,
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.protocol, Protocol::Http);
        assert_eq!(config.http.base_url, "http://gpu-box:8080");
        assert_eq!(config.http.api_key.as_deref(), Some("Bearer abc"));
        assert_eq!(config.http.read_timeout_ms, Some(30000));
        assert_eq!(config.fim.stop_token_ids, vec![151644, 151645]);
    }

    #[test]
    fn test_load_from_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("llmwire.json");
        fs::write(&path, r#"{"protocol": "binary", "binary": {"host": "10.0.0.2"}}"#).unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.protocol, Protocol::Binary);
        assert_eq!(config.binary.address(), "10.0.0.2:8089");
    }

    #[test]
    fn test_load_from_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("llmwire.yaml");
        fs::write(&path, "logging:\n  level: debug\n").unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "protocol = [").unwrap();

        let err = load_from_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.context().unwrap().contains("broken.toml"));
    }
}
