//! Environment variable-based configuration loading

use super::loader::ConfigOverrides;
use crate::error::{ClientError, ClientResult};

/// Prefix shared by all llmwire environment variables
pub const ENV_PREFIX: &str = "LLMWIRE_";

/// Read overrides from the process environment
pub fn load_from_env() -> ClientResult<ConfigOverrides> {
    overrides_from_lookup(|key| std::env::var(key).ok())
}

/// Read overrides through an arbitrary lookup function
///
/// Recognised variables (all prefixed with `LLMWIRE_`): `PROTOCOL`,
/// `SERVER_URL`, `API_KEY`, `BINARY_HOST`, `BINARY_PORT`,
/// `READ_TIMEOUT_MS`, `LOG_LEVEL`.
pub fn overrides_from_lookup<F>(lookup: F) -> ClientResult<ConfigOverrides>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| {
        lookup(&format!("{}{}", ENV_PREFIX, name)).filter(|value| !value.trim().is_empty())
    };

    let mut overrides = ConfigOverrides::default();

    if let Some(protocol) = var("PROTOCOL") {
        overrides.protocol = Some(protocol.parse()?);
    }

    overrides.server_url = var("SERVER_URL");
    overrides.api_key = var("API_KEY");
    overrides.binary_host = var("BINARY_HOST");

    if let Some(port) = var("BINARY_PORT") {
        overrides.binary_port = Some(port.trim().parse().map_err(|_| {
            ClientError::config(format!("Invalid {}BINARY_PORT value", ENV_PREFIX))
                .with_context(format!("Parsing port value '{}'", port))
        })?);
    }

    if let Some(timeout) = var("READ_TIMEOUT_MS") {
        overrides.read_timeout_ms = Some(timeout.trim().parse().map_err(|_| {
            ClientError::config(format!("Invalid {}READ_TIMEOUT_MS value", ENV_PREFIX))
                .with_context(format!("Parsing timeout value '{}'", timeout))
        })?);
    }

    overrides.log_level = var("LOG_LEVEL");

    Ok(overrides)
}
