use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use opentelemetry::KeyValue;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::{metrics, sleep_or_cancelled};
use crate::core::client::database::DatabaseError;
use crate::core::config::Config;
use crate::error::job::JobError;
use crate::types::jobs::types::{FailureKind, JobFailure};
use crate::utils::metrics::ORCHESTRATOR_METRICS;

/// Jobs looked at per sweep and per category
const SWEEP_BATCH_LIMIT: i64 = 100;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub stale_recovered: usize,
    pub requeued: usize,
}

/// Periodic maintenance of the job store.
///
/// First fails PROCESSING jobs whose claim outlived the processing timeout, then puts retryable
/// failures back into the queue with exponential backoff. A job recovered from a stale claim is
/// therefore eligible for retry within the same sweep.
pub struct RetrySweeper {
    config: Arc<Config>,
    interval: Duration,
    shutdown_token: CancellationToken,
}

impl RetrySweeper {
    pub fn new(config: Arc<Config>, shutdown_token: CancellationToken) -> Self {
        let interval = Duration::from_secs(config.service_config().retry_sweep_interval_seconds.max(1));
        Self { config, interval, shutdown_token }
    }

    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "Starting retry sweeper");
        loop {
            if sleep_or_cancelled(&self.shutdown_token, self.interval).await {
                break;
            }
            let span = info_span!("retry_sweep", worker = "retry_sweeper");
            match sweep_once(&self.config).instrument(span).await {
                Ok(report) => metrics::record_sweep(report.requeued, report.stale_recovered),
                Err(e) => metrics::record_db_error("retry_sweep", &e.to_string()),
            }
        }
        info!("Retry sweeper stopped");
    }
}

/// One sweep over the job store
pub async fn sweep_once(config: &Config) -> Result<SweepReport, DatabaseError> {
    let stale_recovered = recover_stale_claims(config).await?;
    let requeued = requeue_retryable(config).await?;
    Ok(SweepReport { stale_recovered, requeued })
}

async fn recover_stale_claims(config: &Config) -> Result<usize, DatabaseError> {
    let timeout = config.service_config().processing_timeout();
    let cutoff = Utc::now() - chrono::Duration::from_std(timeout).unwrap_or(chrono::Duration::MAX);
    let stale = config.database().get_stale_processing_jobs(cutoff, SWEEP_BATCH_LIMIT).await?;

    let mut recovered = 0;
    for job in stale {
        let message = JobError::ProcessingTimedOut { timeout_secs: timeout.as_secs() }.to_string();
        match config.database().fail_job(&job.id, JobFailure::new(FailureKind::ProviderTransient, message.clone())).await
        {
            Ok(failed) => {
                recovered += 1;
                ORCHESTRATOR_METRICS.stale_jobs_recovered.add(1, &[]);
                warn!(
                    job_id = %job.id,
                    project_id = %job.project_id,
                    claimed_by = ?job.claimed_by,
                    "Failed a job whose claim expired"
                );
                if failed.is_terminal_failure() {
                    config.database().record_project_failure(&job.project_id, &job.id, &message).await?;
                }
            }
            // Finished on its own since the read
            Err(DatabaseError::StateConflict(_)) => debug!(job_id = %job.id, "Stale job already settled"),
            Err(e) => return Err(e),
        }
    }
    Ok(recovered)
}

async fn requeue_retryable(config: &Config) -> Result<usize, DatabaseError> {
    let policy = config.retry_policy();
    let jobs = config.database().get_retryable_jobs(SWEEP_BATCH_LIMIT).await?;

    let mut requeued = 0;
    for job in jobs {
        let delay = policy.backoff(job.attempt_count);
        let available_at = Utc::now() + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::MAX);

        match config.database().requeue_job(&job.id, available_at).await {
            Ok(job) => {
                requeued += 1;
                ORCHESTRATOR_METRICS.jobs_retried.add(1, &[KeyValue::new("trigger", "sweeper")]);
                info!(
                    job_id = %job.id,
                    attempt = job.attempt_count,
                    max_attempts = job.max_attempts,
                    delay_secs = delay.as_secs(),
                    "Job re-queued with backoff"
                );
            }
            // Retried manually or by another sweeper since the read
            Err(DatabaseError::StateConflict(_)) => debug!(job_id = %job.id, "Job no longer retryable"),
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Failed to re-queue job");
                return Err(e);
            }
        }
    }
    Ok(requeued)
}
