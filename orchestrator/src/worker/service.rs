use std::sync::Arc;

use chrono::Utc;
use opentelemetry::KeyValue;
use tracing::{info, warn};

use crate::core::client::database::DatabaseError;
use crate::core::config::Config;
use crate::error::job::{JobError, JobResult};
use crate::types::hostname::is_reserved_host;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::payload::DeploymentPayload;
use crate::types::jobs::types::{FailureKind, JobStatus};
use crate::utils::metrics::ORCHESTRATOR_METRICS;

/// Upper bound on the jobs returned for one project
pub const MAX_JOBS_PER_LISTING: i64 = 100;

pub struct JobService;

impl JobService {
    /// Validates the request and inserts a QUEUED job with `attempt_count = 1`.
    ///
    /// # Arguments
    /// * `project_id` - Owning project, must not be blank
    /// * `payload` - Content snapshot, frozen from here on
    /// * `priority` - Higher is served first, defaults to 0
    ///
    /// # Returns
    /// * `JobResult<DeploymentJob>` - The stored job, `JobError::Validation` or `JobError::ReservedDomain`
    pub async fn enqueue(
        config: Arc<Config>,
        project_id: &str,
        payload: DeploymentPayload,
        priority: Option<i32>,
    ) -> JobResult<DeploymentJob> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(JobError::Validation("project_id is required".to_string()));
        }
        payload.validate().map_err(JobError::Validation)?;
        let host = payload.deployment_host();
        if is_reserved_host(&host, &config.deployment_params().reserved_domains) {
            return Err(JobError::ReservedDomain { host });
        }

        let job = DeploymentJob::new(project_id, payload, priority.unwrap_or(0), config.retry_policy().max_attempts);
        let job = config.database().create_job(job).await?;

        ORCHESTRATOR_METRICS.jobs_enqueued.add(1, &[KeyValue::new("operation_type", "enqueue")]);
        info!(
            job_id = %job.id,
            project_id = %job.project_id,
            priority = job.priority,
            host = %job.payload.deployment_host(),
            "Deployment job enqueued"
        );
        Ok(job)
    }

    /// Retrieves a job by its id
    pub async fn get_job(config: Arc<Config>, id: &str) -> JobResult<DeploymentJob> {
        config.database().get_job_by_id(id).await?.ok_or_else(|| JobError::JobNotFound { id: id.to_string() })
    }

    /// Newest first, at most [`MAX_JOBS_PER_LISTING`]
    pub async fn list_jobs(config: Arc<Config>, project_id: &str) -> JobResult<Vec<DeploymentJob>> {
        Ok(config.database().get_jobs_by_project(project_id, MAX_JOBS_PER_LISTING).await?)
    }

    /// Puts a FAILED job back into the queue right away.
    ///
    /// Only failures of a retryable kind with attempts left qualify. The store re-checks the
    /// status and attempt count atomically, so a job that changed meanwhile is a state conflict.
    pub async fn retry_job(config: Arc<Config>, id: &str) -> JobResult<DeploymentJob> {
        let job = Self::get_job(config.clone(), id).await?;

        if job.status != JobStatus::Failed {
            return Err(JobError::NotRetryable {
                id: job.id,
                status: job.status,
                reason: "only FAILED jobs can be retried".to_string(),
            });
        }
        if let Some(kind @ (FailureKind::Validation | FailureKind::ProviderPermanent)) = job.failure_kind {
            return Err(JobError::NotRetryable {
                id: job.id,
                status: job.status,
                reason: format!("{} failures are not retried", kind),
            });
        }
        if !job.has_attempts_left() {
            return Err(JobError::NotRetryable {
                id: job.id,
                status: job.status,
                reason: format!("all {} attempts are used", job.max_attempts),
            });
        }

        let job = match config.database().requeue_job(id, Utc::now()).await {
            Ok(job) => job,
            Err(DatabaseError::StateConflict(reason)) => {
                warn!(job_id = %id, reason = %reason, "Job changed while being retried");
                return Err(JobError::StateConflict(reason));
            }
            Err(e) => return Err(e.into()),
        };

        ORCHESTRATOR_METRICS.jobs_retried.add(1, &[KeyValue::new("trigger", "manual")]);
        info!(job_id = %job.id, attempt = job.attempt_count, max_attempts = job.max_attempts, "Job re-queued");
        Ok(job)
    }
}
