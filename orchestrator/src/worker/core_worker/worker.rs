/// Deployment worker pool
///
/// Polls the job store for claimable jobs and runs up to `max_concurrent` of them at once. Claims
/// are atomic in the store, so any number of processes can run this loop side by side.
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

use super::config::WorkerConfig;
use super::{metrics, sleep_or_cancelled};
use crate::core::client::database::DatabaseError;
use crate::core::config::Config;
use crate::types::jobs::job_item::DeploymentJob;
use crate::utils::with_jitter;
use crate::worker::event_handler::service::JobHandlerService;

/// Worker state for error handling and circuit breaking
#[derive(Debug, Default)]
struct WorkerState {
    /// Consecutive error count for exponential backoff
    consecutive_errors: u32,
    /// Set while the circuit breaker is open
    circuit_open_at: Option<Instant>,
}

impl WorkerState {
    fn reset_errors(&mut self) {
        if self.circuit_open_at.is_some() {
            metrics::record_circuit_breaker("closed", self.consecutive_errors);
        }
        self.consecutive_errors = 0;
        self.circuit_open_at = None;
    }

    fn increment_error(&mut self, config: &WorkerConfig) {
        self.consecutive_errors += 1;
        if self.circuit_open_at.is_none() && self.consecutive_errors >= config.circuit_breaker_threshold {
            self.circuit_open_at = Some(Instant::now());
            metrics::record_circuit_breaker("open", self.consecutive_errors);
        }
    }

    fn is_circuit_open(&self) -> bool {
        self.circuit_open_at.is_some()
    }

    fn should_attempt_close(&self, config: &WorkerConfig) -> bool {
        self.circuit_open_at.map(|open_at| open_at.elapsed() >= config.circuit_breaker_reset_timeout).unwrap_or(false)
    }
}

pub struct DeploymentWorker {
    config: WorkerConfig,
    orchestrator_config: Arc<Config>,
    shutdown_token: CancellationToken,
    state: WorkerState,
    slots: Arc<Semaphore>,
    in_flight: JoinSet<()>,
}

impl DeploymentWorker {
    pub fn new(config: WorkerConfig, orchestrator_config: Arc<Config>, shutdown_token: CancellationToken) -> Self {
        let slots = Arc::new(Semaphore::new(config.max_concurrent));
        Self {
            config,
            orchestrator_config,
            shutdown_token,
            state: WorkerState::default(),
            slots,
            in_flight: JoinSet::new(),
        }
    }

    /// Run the poll loop until the shutdown token is cancelled, then wait for in-flight jobs.
    pub async fn run(&mut self) {
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            max_concurrent = self.config.max_concurrent,
            orchestrator_id = %self.orchestrator_config.orchestrator_id(),
            "Starting deployment worker"
        );

        loop {
            self.reap_finished();

            if self.shutdown_token.is_cancelled() {
                break;
            }

            if self.state.is_circuit_open() {
                if self.state.should_attempt_close(&self.config) {
                    info!("Circuit breaker reset timeout elapsed, attempting to close");
                    self.state.reset_errors();
                } else {
                    if sleep_or_cancelled(&self.shutdown_token, self.config.poll_interval).await {
                        break;
                    }
                    continue;
                }
            }

            // A slot is taken before claiming, so a claimed job never waits for capacity
            let permit = tokio::select! {
                _ = self.shutdown_token.cancelled() => break,
                permit = self.slots.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            match self.try_claim().await {
                Ok(Some(job)) => {
                    self.state.reset_errors();
                    let config = self.orchestrator_config.clone();
                    let span = info_span!(
                        "deployment_job",
                        worker = "deployment",
                        job_id = %job.id,
                        project_id = %job.project_id
                    );
                    self.in_flight.spawn(
                        async move {
                            let job_id = job.id.clone();
                            match JobHandlerService::process_job(job, config).await {
                                Ok(job) => metrics::record_claim_release(&job_id, &job.status.to_string()),
                                Err(e) => {
                                    error!(error = %e, "Failed to record deployment outcome");
                                    metrics::record_claim_release(&job_id, "bookkeeping_failed");
                                }
                            }
                            drop(permit);
                        }
                        .instrument(span),
                    );
                }
                Ok(None) => {
                    drop(permit);
                    self.state.reset_errors();
                    metrics::record_empty_poll();
                    let delay = with_jitter(self.config.poll_interval, self.config.poll_jitter_ms);
                    if sleep_or_cancelled(&self.shutdown_token, delay).await {
                        break;
                    }
                }
                Err(e) => {
                    drop(permit);
                    metrics::record_db_error("claim_next_job", &e.to_string());
                    self.state.increment_error(&self.config);

                    let backoff_delay = self.config.calculate_backoff(self.state.consecutive_errors - 1);
                    warn!(
                        consecutive_errors = self.state.consecutive_errors,
                        backoff_ms = backoff_delay.as_millis() as u64,
                        "Applying exponential backoff"
                    );
                    if sleep_or_cancelled(&self.shutdown_token, backoff_delay).await {
                        break;
                    }
                }
            }
        }

        self.drain().await;
        info!("Deployment worker stopped");
    }

    /// Atomically claim the next available job
    async fn try_claim(&self) -> Result<Option<DeploymentJob>, DatabaseError> {
        let start = Instant::now();
        let job = self.orchestrator_config.database().claim_next_job(self.orchestrator_config.orchestrator_id()).await?;
        metrics::record_claim_latency(start.elapsed().as_secs_f64() * 1000.0);

        if let Some(ref job) = job {
            metrics::record_claim_success(&job.id, &job.project_id);
        }
        Ok(job)
    }

    fn reap_finished(&mut self) {
        while let Some(result) = self.in_flight.try_join_next() {
            if let Err(e) = result {
                error!(error = %e, "Deployment task aborted");
            }
        }
    }

    /// Wait for every in-flight job. The caller bounds this with the shutdown timeout.
    async fn drain(&mut self) {
        if !self.in_flight.is_empty() {
            info!(in_flight = self.in_flight.len(), "Waiting for in-flight deployments to finish");
        }
        while let Some(result) = self.in_flight.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "Deployment task aborted");
            }
        }
    }
}
