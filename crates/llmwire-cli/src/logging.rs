//! Tracing subscriber setup
//!
//! Logs always go to stderr so stdout carries only generated text.

use llmwire_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over the configured level
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,llmwire_core={0},llmwire={0}", config.level))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if config.is_json() {
        builder.json().init();
    } else if config.is_compact() {
        builder.compact().init();
    } else {
        builder.init();
    }
}
