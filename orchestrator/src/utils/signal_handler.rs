use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[cfg(unix)]
use signal::unix::{signal, SignalKind};

use crate::error::{OrchestratorError, OrchestratorResult};

/// Signal types that can trigger shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGTERM - container runtime graceful shutdown
    Terminate,
    /// SIGINT - Ctrl+C
    Interrupt,
    /// SIGQUIT - no patience for in-flight work
    Quit,
    /// A component of the service asked for shutdown, e.g. the HTTP server stopped
    Internal,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownSignal::Terminate => write!(f, "SIGTERM"),
            ShutdownSignal::Interrupt => write!(f, "SIGINT"),
            ShutdownSignal::Quit => write!(f, "SIGQUIT"),
            ShutdownSignal::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Waits for an OS signal or an internal request and drives the shutdown sequence.
///
/// The internal trigger is a [`CancellationToken`]. Cancelling it (or any clone of it) ends
/// [`SignalHandler::wait_for_shutdown`] with [`ShutdownSignal::Internal`].
pub struct SignalHandler {
    shutdown_signal: Option<ShutdownSignal>,
    internal_trigger: CancellationToken,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self { shutdown_signal: None, internal_trigger: CancellationToken::new() }
    }

    /// Handle that components use to request shutdown
    pub fn shutdown_trigger(&self) -> CancellationToken {
        self.internal_trigger.clone()
    }

    /// Wait for any shutdown signal and return which one was received
    pub async fn wait_for_shutdown(&mut self) -> OrchestratorResult<ShutdownSignal> {
        let signal = self.wait_for_signal().await?;
        self.shutdown_signal = Some(signal);
        info!(%signal, "Received shutdown signal");
        Ok(signal)
    }

    pub fn shutdown_signal(&self) -> Option<ShutdownSignal> {
        self.shutdown_signal
    }

    #[cfg(unix)]
    async fn wait_for_signal(&self) -> OrchestratorResult<ShutdownSignal> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigquit = signal(SignalKind::quit())?;

        info!("Signal handler listening for SIGTERM, SIGINT, SIGQUIT and internal shutdown requests");

        let received = tokio::select! {
            _ = sigterm.recv() => ShutdownSignal::Terminate,
            _ = sigint.recv() => ShutdownSignal::Interrupt,
            _ = sigquit.recv() => {
                warn!("Force quit requested, in-flight deployments will not be awaited past the timeout");
                ShutdownSignal::Quit
            }
            _ = self.internal_trigger.cancelled() => ShutdownSignal::Internal,
        };
        Ok(received)
    }

    #[cfg(not(unix))]
    async fn wait_for_signal(&self) -> OrchestratorResult<ShutdownSignal> {
        info!("Signal handler listening for Ctrl+C and internal shutdown requests");

        let received = tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                ShutdownSignal::Interrupt
            }
            _ = self.internal_trigger.cancelled() => ShutdownSignal::Internal,
        };
        Ok(received)
    }

    /// Run `shutdown_fn` and give up after `timeout`.
    ///
    /// A timed out shutdown is an error. Under SIGQUIT the process exits immediately instead.
    pub async fn handle_graceful_shutdown<F, Fut>(&self, shutdown_fn: F, timeout: Duration) -> OrchestratorResult<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = OrchestratorResult<()>>,
    {
        let signal = self.shutdown_signal.unwrap_or(ShutdownSignal::Interrupt);
        info!(%signal, timeout_secs = timeout.as_secs(), "Starting graceful shutdown");

        match tokio::time::timeout(timeout, shutdown_fn()).await {
            Ok(Ok(())) => {
                info!("Graceful shutdown completed");
                Ok(())
            }
            Ok(Err(e)) => {
                error!(error = %e, "Graceful shutdown failed");
                Err(e)
            }
            Err(_) if signal == ShutdownSignal::Quit => {
                warn!("Shutdown timed out under SIGQUIT, exiting now");
                std::process::exit(1);
            }
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "Shutdown timed out, some deployments may be left PROCESSING");
                Err(OrchestratorError::OrchestratorAnyHowError(anyhow!(
                    "shutdown did not finish within {} seconds",
                    timeout.as_secs()
                )))
            }
        }
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn internal_trigger_ends_wait() {
        let mut handler = SignalHandler::new();
        handler.shutdown_trigger().cancel();

        let signal = handler.wait_for_shutdown().await.expect("signal");
        assert_eq!(signal, ShutdownSignal::Internal);
        assert_eq!(handler.shutdown_signal(), Some(ShutdownSignal::Internal));
    }

    #[tokio::test]
    async fn shutdown_times_out() {
        let handler = SignalHandler::new();
        let result = handler
            .handle_graceful_shutdown(
                || async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(())
                },
                Duration::from_millis(20),
            )
            .await;
        assert!(result.is_err());
    }
}
