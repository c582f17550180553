//! Command handlers

pub mod config;
pub mod generate;
pub mod input;

use crate::args::{Cli, Commands, ConfigAction};
use anyhow::Result;
use llmwire_core::ClientConfig;
use std::path::Path;
use std::process::ExitCode;

/// Route a parsed command line to its handler
pub async fn dispatch(cli: &Cli, config: &ClientConfig, source: Option<&Path>) -> Result<ExitCode> {
    let system = cli.system.as_deref();
    match &cli.command {
        Commands::Prompt(args) => {
            let task = generate::prompt_task(system, args)?;
            generate::stream_task(config, task).await
        }
        Commands::Fim(args) => {
            let task = generate::fim_task(system, args)?;
            generate::stream_task(config, task).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                config::show(config, source, *json)?;
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}
