//! Configuration for llmwire clients
//!
//! Settings are layered: built-in defaults, then an optional config file
//! (TOML, YAML or JSON), then `LLMWIRE_*` environment variables, then
//! explicit overrides (usually command-line flags).

mod env_loader;
mod file_loader;
mod loader;
mod logging_config;
mod model;
pub mod timeouts;

pub use env_loader::{ENV_PREFIX, load_from_env, overrides_from_lookup};
pub use file_loader::{default_config_path, load_from_file};
pub use loader::{ConfigLoader, ConfigOverrides};
pub use logging_config::LoggingConfig;
pub use model::{BinaryConfig, ClientConfig, FimConfig, HttpConfig, Protocol};
