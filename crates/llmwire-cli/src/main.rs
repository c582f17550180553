//! llmwire command-line client
//!
//! Sends a prompt or fill-in-middle request to an inference server over the
//! binary `LLM1` protocol or HTTP server-sent events and streams the answer
//! to stdout.
//!
//! ```bash
//! llmwire prompt "Explain the borrow checker in one line"
//! llmwire --protocol binary fim --prefix @before.rs --suffix @after.rs
//! ```

mod args;
mod commands;
mod logging;
mod signal_handler;

use anyhow::{Result, bail};
use args::Cli;
use clap::Parser;
use llmwire_core::config::default_config_path;
use llmwire_core::{ClientConfig, ConfigLoader, ConfigOverrides};
use std::path::PathBuf;
use std::process::ExitCode;

fn overrides(cli: &Cli) -> ConfigOverrides {
    ConfigOverrides {
        protocol: cli.protocol,
        server_url: cli.server.clone(),
        api_key: cli.api_key.clone(),
        read_timeout_ms: cli.read_timeout_ms,
        log_level: cli.verbose.then(|| "debug".to_string()),
        ..Default::default()
    }
}

/// Defaults, then the config file, then `LLMWIRE_*` variables, then flags
fn load_config(cli: &Cli) -> Result<(ClientConfig, Option<PathBuf>)> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            bail!("Configuration file not found: {}", path.display());
        }
    }
    let source = cli.config.clone().or_else(default_config_path);

    let mut loader = ConfigLoader::new().with_env().with_overrides(overrides(cli));
    if let Some(path) = &source {
        loader = loader.with_file(path);
    }
    Ok((loader.load()?, source))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, source) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.logging);

    match commands::dispatch(&cli, &config, source.as_deref()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
