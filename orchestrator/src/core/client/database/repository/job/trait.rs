use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::client::database::error::DatabaseError;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::types::{DeploymentResult, JobFailure};

/// Repository for the deployment job queue.
///
/// Every state transition is a conditional update on the expected current status, so two callers
/// racing on the same job cannot both win. A transition whose precondition does not hold fails
/// with [`DatabaseError::StateConflict`], an unknown id with [`DatabaseError::ItemNotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create_job(&self, job: DeploymentJob) -> Result<DeploymentJob, DatabaseError>;

    async fn get_job_by_id(&self, id: &str) -> Result<Option<DeploymentJob>, DatabaseError>;

    /// Jobs of a project, newest first
    async fn get_jobs_by_project(&self, project_id: &str, limit: i64) -> Result<Vec<DeploymentJob>, DatabaseError>;

    /// Atomically claim the next job
    ///
    /// A job is claimable if:
    /// - Status is QUEUED
    /// - available_at is in the past
    /// - no other job of the same project is PROCESSING
    ///
    /// Priority: highest `priority` first, then FIFO by created_at. Returns `None` when nothing
    /// is claimable.
    async fn claim_next_job(&self, worker_id: &str) -> Result<Option<DeploymentJob>, DatabaseError>;

    /// Record the provider deploy started by the current attempt. PROCESSING only
    async fn set_job_deploy_id(&self, id: &str, deploy_id: &str) -> Result<DeploymentJob, DatabaseError>;

    /// PROCESSING -> COMPLETED
    async fn complete_job(&self, id: &str, result: DeploymentResult) -> Result<DeploymentJob, DatabaseError>;

    /// PROCESSING -> FAILED
    async fn fail_job(&self, id: &str, failure: JobFailure) -> Result<DeploymentJob, DatabaseError>;

    /// FAILED -> QUEUED for the next attempt, only while `attempt_count < max_attempts`
    async fn requeue_job(&self, id: &str, available_at: DateTime<Utc>) -> Result<DeploymentJob, DatabaseError>;

    /// FAILED jobs with a retryable failure kind and attempts left, oldest failure first
    async fn get_retryable_jobs(&self, limit: i64) -> Result<Vec<DeploymentJob>, DatabaseError>;

    /// PROCESSING jobs claimed before `started_before`
    async fn get_stale_processing_jobs(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<DeploymentJob>, DatabaseError>;
}
