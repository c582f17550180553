//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use llmwire_core::Protocol;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "llmwire")]
#[command(about = "Stream completions from a local LLM inference server")]
#[command(
    long_about = r#"Stream completions from a local LLM inference server

USAGE:
  llmwire prompt "Explain lifetimes"          # Chat-style prompt
  echo "2+2=" | llmwire prompt -              # Prompt from stdin
  llmwire fim --prefix @head.rs --suffix @tail.rs
  llmwire --protocol binary prompt "hi"       # Binary LLM1 protocol
  llmwire config show                         # Effective configuration

Generated text goes to stdout, status and logs to stderr."#
)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "LLMWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Transport: binary (TCP) or http (server-sent events)
    #[arg(long, global = true)]
    pub protocol: Option<Protocol>,

    /// Base URL of the HTTP server
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Value sent verbatim as the Authorization header
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// System prompt
    #[arg(long, global = true)]
    pub system: Option<String>,

    /// Read timeout in milliseconds for the active protocol
    #[arg(long, global = true)]
    pub read_timeout_ms: Option<u64>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a prompt and stream the answer
    Prompt(PromptArgs),

    /// Fill in the middle between a prefix and a suffix
    Fim(FimArgs),

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug)]
pub struct PromptArgs {
    /// Prompt text, `-` reads stdin. `[Range]` is replaced by --range-file
    pub text: String,

    /// File whose content replaces `[Range]` in the prompt
    #[arg(long)]
    pub range_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FimArgs {
    /// Text before the gap, or @file
    #[arg(long, required_unless_present = "file", conflicts_with = "file")]
    pub prefix: Option<String>,

    /// Text after the gap, or @file
    #[arg(long, required_unless_present = "file", conflicts_with = "file")]
    pub suffix: Option<String>,

    /// Split this file at --caret instead of giving prefix and suffix
    #[arg(long, requires = "caret")]
    pub file: Option<PathBuf>,

    /// Character offset of the gap in --file
    #[arg(long, requires = "file")]
    pub caret: Option<usize>,

    /// Prompt template; `[FIM]` wraps the prefix, other text is sent as instruction
    #[arg(long)]
    pub template: Option<String>,

    /// Optional instruction sent with the request
    #[arg(long, conflicts_with = "template")]
    pub prompt: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration (API key redacted)
    Show {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}
