//! `prompt` and `fim` commands

use super::input::{read_file, resolve_text, system_prompt};
use crate::args::{FimArgs, PromptArgs};
use crate::signal_handler::SignalHandler;
use anyhow::{Context, Result};
use llmwire_core::template::{self, SelectionRange};
use llmwire_core::{ChannelSink, ClientConfig, ClientResult, StreamEvent, StreamingClient, Task};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

/// Exit status after an interrupted request
pub const EXIT_CANCELLED: u8 = 130;

fn whole_file(text: String) -> SelectionRange {
    let len = text.chars().count();
    SelectionRange::new(text, 0, len)
}

pub fn prompt_task(system: Option<&str>, args: &PromptArgs) -> Result<Task> {
    let text = resolve_text(&args.text)?;
    let range = args
        .range_file
        .as_deref()
        .map(read_file)
        .transpose()?
        .map(whole_file);
    Ok(template::prompt_task(
        system.unwrap_or_default(),
        &text,
        range.as_ref(),
    ))
}

pub fn fim_task(system: Option<&str>, args: &FimArgs) -> Result<Task> {
    if let (Some(path), Some(caret)) = (&args.file, args.caret) {
        let range = whole_file(read_file(path)?);
        let template = args.template.as_deref().unwrap_or_default();
        let task = template::fill_in_middle_task(
            system.unwrap_or_default(),
            template,
            Some(&range),
            caret,
        )?;
        return Ok(task);
    }

    let prefix = resolve_text(args.prefix.as_deref().context("--prefix is required")?)?;
    let suffix = resolve_text(args.suffix.as_deref().context("--suffix is required")?)?;
    let prompt = args
        .prompt
        .clone()
        .or_else(|| args.template.as_ref().map(|t| t.replace(template::RANGE_PLACEHOLDER, "")))
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());
    Ok(Task::fill_in_middle(
        system_prompt(system),
        prefix,
        suffix,
        prompt,
    ))
}

/// 0 on success, 130 after cancellation, 1 on any other failure
pub fn exit_status(outcome: &ClientResult<String>) -> u8 {
    match outcome {
        Ok(_) => 0,
        Err(e) if e.is_cancelled() => EXIT_CANCELLED,
        Err(_) => 1,
    }
}

/// Write tokens to `out` and status lines to stderr until the sink closes
async fn forward_events<W: Write>(
    events: &mut UnboundedReceiver<StreamEvent>,
    out: &mut W,
) -> std::io::Result<()> {
    while let Some(event) = events.recv().await {
        match event {
            StreamEvent::Token(token) => {
                out.write_all(token.as_bytes())?;
                out.flush()?;
            }
            StreamEvent::Result(_) => writeln!(out)?,
            StreamEvent::Status(status) => eprintln!("{}", status),
            StreamEvent::Progress(_) => {}
        }
    }
    Ok(())
}

/// Stream a task: tokens to stdout, status to stderr
pub async fn stream_task(config: &ClientConfig, task: Task) -> Result<ExitCode> {
    let client = StreamingClient::from_config(config)?;
    tracing::info!(protocol = %client.protocol(), kind = %task.kind(), "starting request");

    let cancel = CancellationToken::new();
    let signals =
        SignalHandler::start(cancel.clone()).context("failed to install Ctrl+C handler")?;
    let (sink, mut events) = ChannelSink::channel();
    let request = client.spawn(task, Arc::new(sink), cancel.clone());

    let printed = forward_events(&mut events, &mut std::io::stdout()).await;
    if printed.is_err() {
        cancel.cancel();
    }

    let outcome = request.await.context("request task failed");
    signals.stop().await;
    printed.context("failed to write to stdout")?;
    let outcome = outcome?;
    Ok(ExitCode::from(exit_status(&outcome)))
}
