use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use opentelemetry::KeyValue;
use tracing::{error, info, warn};

use crate::core::config::Config;
use crate::error::job::{JobError, JobResult};
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::types::{DeploymentResult, JobFailure};
use crate::utils::metrics::ORCHESTRATOR_METRICS;
use crate::worker::event_handler::jobs::deployment::DeploymentJobHandler;
use crate::worker::event_handler::jobs::JobHandlerTrait;

pub struct JobHandlerService;

impl JobHandlerService {
    /// Runs one attempt of a claimed job and records the outcome.
    pub async fn process_job(job: DeploymentJob, config: Arc<Config>) -> JobResult<DeploymentJob> {
        Self::process_job_with(&DeploymentJobHandler, job, config).await
    }

    /// Same as [`Self::process_job`] with an explicit handler.
    ///
    /// A panic inside the handler is caught and recorded like any other failure. The error
    /// returned here is only about bookkeeping, e.g. the job was already failed by stale claim
    /// recovery; the attempt's own failure is stored on the job.
    ///
    /// # Returns
    /// * `JobResult<DeploymentJob>` - The job as stored after the attempt
    pub async fn process_job_with(
        handler: &dyn JobHandlerTrait,
        job: DeploymentJob,
        config: Arc<Config>,
    ) -> JobResult<DeploymentJob> {
        let start = Instant::now();
        info!(attempt = job.attempt_count, max_attempts = job.max_attempts, "Deployment attempt started");

        // The handler call sits inside the future so a panic before its first await is caught too
        let attempt = async { handler.process_job(config.clone(), &job).await };
        let outcome = match AssertUnwindSafe(attempt).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let msg = Self::extract_panic_message(&panic);
                error!(panic = %msg, "Deployment handler panicked");
                Err(JobError::Panicked(msg))
            }
        };

        let elapsed = start.elapsed().as_secs_f64();
        match outcome {
            Ok(result) => Self::record_success(&job, result, config, elapsed).await,
            Err(e) => Self::record_failure(&job, e, config, elapsed).await,
        }
    }

    async fn record_success(
        job: &DeploymentJob,
        result: DeploymentResult,
        config: Arc<Config>,
        elapsed: f64,
    ) -> JobResult<DeploymentJob> {
        let url = result.url.clone();
        let completed = config.database().complete_job(&job.id, result).await?;
        config.database().record_project_deployment(&job.project_id, &job.id, &url).await?;

        let attributes = [KeyValue::new("outcome", "completed")];
        ORCHESTRATOR_METRICS.jobs_completed.add(1, &[]);
        ORCHESTRATOR_METRICS.deploy_duration.record(elapsed, &attributes);
        info!(url = %url, duration_secs = elapsed, "Deployment completed");
        Ok(completed)
    }

    async fn record_failure(
        job: &DeploymentJob,
        error: JobError,
        config: Arc<Config>,
        elapsed: f64,
    ) -> JobResult<DeploymentJob> {
        let kind = error.kind();
        let message = error.to_string();
        warn!(failure_kind = %kind, error = %message, "Deployment attempt failed");

        let failed = config.database().fail_job(&job.id, JobFailure::new(kind, message.clone())).await?;
        if failed.is_terminal_failure() {
            config.database().record_project_failure(&job.project_id, &job.id, &message).await?;
            error!(
                failure_kind = %kind,
                attempt = failed.attempt_count,
                max_attempts = failed.max_attempts,
                "Deployment failed permanently"
            );
        } else {
            info!(attempt = failed.attempt_count, "Deployment left for the retry sweeper");
        }

        ORCHESTRATOR_METRICS.jobs_failed.add(1, &[KeyValue::new("failure_kind", kind.to_string())]);
        ORCHESTRATOR_METRICS.deploy_duration.record(elapsed, &[KeyValue::new("outcome", "failed")]);
        Ok(failed)
    }

    fn extract_panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
        panic
            .downcast_ref::<String>()
            .map(|s| s.as_str())
            .or_else(|| panic.downcast_ref::<&str>().copied())
            .unwrap_or("Unknown panic")
            .to_string()
    }
}
