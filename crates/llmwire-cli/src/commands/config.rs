//! `config` command

use anyhow::Result;
use llmwire_core::ClientConfig;
use std::path::Path;

/// Render the configuration with the API key redacted
pub fn render(config: &ClientConfig, json: bool) -> Result<String> {
    let mut shown = config.clone();
    shown.http.api_key = config.http.redacted_api_key();
    let text = if json {
        serde_json::to_string_pretty(&shown)?
    } else {
        toml::to_string_pretty(&shown)?
    };
    Ok(text)
}

/// Print the effective configuration to stdout
pub fn show(config: &ClientConfig, source: Option<&Path>, json: bool) -> Result<()> {
    match source {
        Some(path) if path.exists() => eprintln!("# Loaded configuration from: {}", path.display()),
        _ => eprintln!("# No configuration file, using defaults"),
    }
    println!("{}", render(config, json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_redacts_api_key() {
        let mut config = ClientConfig::default();
        config.http.api_key = Some("Bearer sk-secret".to_string());

        let toml_text = render(&config, false).unwrap();
        assert!(toml_text.contains("Bear****"));
        assert!(!toml_text.contains("sk-secret"));

        let json_text = render(&config, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json_text).unwrap();
        assert_eq!(value["http"]["api_key"], "Bear****");
        assert_eq!(value["protocol"], "http");
    }

    #[test]
    fn test_rendered_toml_loads_back() {
        let config = ClientConfig::default();
        let text = render(&config, false).unwrap();
        let parsed: ClientConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
