//! Ctrl+C handling
//!
//! The first SIGINT cancels the running request; a second one exits at once.

use futures::stream::StreamExt;
use signal_hook::consts::SIGINT;
use signal_hook_tokio::{Handle, Signals};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::commands::generate::EXIT_CANCELLED;

pub struct SignalHandler {
    handle: Handle,
    task: JoinHandle<()>,
}

impl SignalHandler {
    /// Start listening for SIGINT
    pub fn start(cancel: CancellationToken) -> std::io::Result<Self> {
        let signals = Signals::new([SIGINT])?;
        let handle = signals.handle();
        let task = tokio::spawn(watch(signals, cancel));
        Ok(Self { handle, task })
    }

    /// Stop listening and wait for the watcher task to finish.
    ///
    /// The signal-hook registration stays in place until the process exits,
    /// so SIGINT no longer terminates the process after this call.
    pub async fn stop(self) {
        self.handle.close();
        let _ = self.task.await;
    }
}

async fn watch(mut signals: Signals, cancel: CancellationToken) {
    while let Some(signal) = signals.next().await {
        if signal != SIGINT {
            continue;
        }
        if cancel.is_cancelled() {
            eprintln!("\nAborted.");
            std::process::exit(i32::from(EXIT_CANCELLED));
        }
        eprintln!("\nCancelling request... (Ctrl+C again to abort)");
        tracing::info!("cancellation requested by user");
        cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stop_ends_watcher_without_cancelling() {
        let cancel = CancellationToken::new();
        let handler = SignalHandler::start(cancel.clone()).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handler.stop())
            .await
            .unwrap();
        assert!(!cancel.is_cancelled());
    }
}
