pub mod core_worker;
pub mod domain_service;
pub mod domain_verification;
pub mod event_handler;
pub mod service;
pub mod utils;

use std::sync::Arc;

use core_worker::controller::{create_default_controller, WorkerController};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::config::Config;

/// Starts the background workers
///
/// Workers poll the job store directly and claim jobs with atomic updates, so several
/// orchestrator processes can share one store.
///
/// # Arguments
/// * `config` - The configuration for the workers
/// * `shutdown_token` - Cancelled when the process shuts down
///
/// # Returns
/// * `WorkerController` - Handle used to stop the workers
pub fn initialize_worker(config: Arc<Config>, shutdown_token: CancellationToken) -> WorkerController {
    let mut controller = create_default_controller(config, shutdown_token);
    controller.start();
    info!("Workers initialized and started successfully");
    controller
}
