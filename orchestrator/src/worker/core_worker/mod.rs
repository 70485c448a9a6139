/// Background loops of the orchestrator
///
/// - [`worker::DeploymentWorker`] claims queued jobs and runs a bounded number at once
/// - [`sweeper::RetrySweeper`] re-queues retryable failures and recovers stale claims
/// - [`controller::WorkerController`] starts them together with the domain verification worker
///   and stops them on shutdown
pub mod config;
pub mod controller;
pub mod metrics;
pub mod sweeper;
pub mod worker;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub use config::WorkerConfig;
pub use controller::WorkerController;
pub use sweeper::RetrySweeper;
pub use worker::DeploymentWorker;

/// Sleep for `duration` unless the token is cancelled first. Returns `true` when cancelled.
pub(crate) async fn sleep_or_cancelled(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = tokio::time::sleep(duration) => false,
    }
}
