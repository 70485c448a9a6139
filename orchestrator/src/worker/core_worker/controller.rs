/// Worker controller for the background loops
///
/// Spawns the deployment worker, the retry sweeper and the domain verification worker on one
/// shared cancellation token.
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::config::WorkerConfig;
use super::sweeper::RetrySweeper;
use super::worker::DeploymentWorker;
use crate::core::config::Config;
use crate::worker::domain_verification::DomainVerificationWorker;

/// Controller for managing workers
pub struct WorkerController {
    config: Arc<Config>,
    worker_config: WorkerConfig,
    shutdown_token: CancellationToken,
    worker_handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl WorkerController {
    pub fn new(config: Arc<Config>, worker_config: WorkerConfig, shutdown_token: CancellationToken) -> Self {
        Self { config, worker_config, shutdown_token, worker_handles: Vec::new() }
    }

    /// Start all workers
    pub fn start(&mut self) {
        info!(orchestrator_id = %self.config.orchestrator_id(), "Starting worker controller");

        let mut deployment_worker =
            DeploymentWorker::new(self.worker_config.clone(), self.config.clone(), self.shutdown_token.clone());
        self.worker_handles.push(("deployment", tokio::spawn(async move { deployment_worker.run().await })));

        let sweeper = RetrySweeper::new(self.config.clone(), self.shutdown_token.clone());
        self.worker_handles.push(("retry_sweeper", tokio::spawn(async move { sweeper.run().await })));

        let verifier = DomainVerificationWorker::new(self.config.clone(), self.shutdown_token.clone());
        self.worker_handles.push(("domain_verification", tokio::spawn(async move { verifier.run().await })));

        info!(worker_count = self.worker_handles.len(), "All workers started successfully");
    }

    /// Wait for all workers to complete (typically after shutdown signal)
    pub async fn wait_for_completion(&mut self) {
        for (name, handle) in self.worker_handles.drain(..) {
            if let Err(e) = handle.await {
                error!(worker = name, error = %e, "Worker task panicked");
            }
        }
        info!("All workers completed");
    }

    /// Cancel the token and wait for the workers. In-flight deployments finish first, so callers
    /// bound this with the shutdown timeout.
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown of workers");
        self.shutdown_token.cancel();
        self.wait_for_completion().await;
        info!("Worker controller shutdown complete");
    }

    pub fn is_running(&self) -> bool {
        self.worker_handles.iter().any(|(_, handle)| !handle.is_finished())
    }
}

/// Controller configured from the service params
pub fn create_default_controller(config: Arc<Config>, shutdown_token: CancellationToken) -> WorkerController {
    let worker_config = WorkerConfig::from(config.service_config());
    WorkerController::new(config, worker_config, shutdown_token)
}
