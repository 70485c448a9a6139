pub mod constant;
pub mod error;
pub mod memory;
pub mod mongo_client;
pub mod repository;
pub mod repository_client;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::domains::domain_item::ProjectDomain;
use crate::types::domains::types::DomainStatusUpdate;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::types::{DeploymentResult, JobFailure};
use crate::types::projects::ProjectSite;
pub use error::DatabaseError;

/// Trait defining database operations
///
/// This is the single seam the services and workers talk to. The MongoDB and in-memory stores both
/// implement it through [`repository_client::RepositoryDatabaseClient`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// health_check - Verify the store is reachable
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Deployment jobs

    /// create_job - Insert a new QUEUED job
    async fn create_job(&self, job: DeploymentJob) -> Result<DeploymentJob, DatabaseError>;
    /// get_job_by_id - Get a job by its ID
    async fn get_job_by_id(&self, id: &str) -> Result<Option<DeploymentJob>, DatabaseError>;
    /// get_jobs_by_project - Jobs of a project, newest first
    async fn get_jobs_by_project(&self, project_id: &str, limit: i64) -> Result<Vec<DeploymentJob>, DatabaseError>;
    /// claim_next_job - Atomically move the next claimable job to PROCESSING
    async fn claim_next_job(&self, worker_id: &str) -> Result<Option<DeploymentJob>, DatabaseError>;
    /// set_job_deploy_id - Record the provider deploy of the running attempt
    async fn set_job_deploy_id(&self, id: &str, deploy_id: &str) -> Result<DeploymentJob, DatabaseError>;
    /// complete_job - PROCESSING -> COMPLETED
    async fn complete_job(&self, id: &str, result: DeploymentResult) -> Result<DeploymentJob, DatabaseError>;
    /// fail_job - PROCESSING -> FAILED
    async fn fail_job(&self, id: &str, failure: JobFailure) -> Result<DeploymentJob, DatabaseError>;
    /// requeue_job - FAILED -> QUEUED for another attempt
    async fn requeue_job(&self, id: &str, available_at: DateTime<Utc>) -> Result<DeploymentJob, DatabaseError>;
    /// get_retryable_jobs - FAILED jobs the retry policy may pick up
    async fn get_retryable_jobs(&self, limit: i64) -> Result<Vec<DeploymentJob>, DatabaseError>;
    /// get_stale_processing_jobs - PROCESSING jobs claimed before the given instant
    async fn get_stale_processing_jobs(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<DeploymentJob>, DatabaseError>;

    // Custom domains

    async fn create_domain(&self, domain: ProjectDomain) -> Result<ProjectDomain, DatabaseError>;
    async fn get_domain_by_id(&self, id: &str) -> Result<Option<ProjectDomain>, DatabaseError>;
    async fn get_domain_by_name(&self, domain: &str) -> Result<Option<ProjectDomain>, DatabaseError>;
    async fn get_domains_by_project(&self, project_id: &str) -> Result<Vec<ProjectDomain>, DatabaseError>;
    async fn delete_domain(&self, id: &str) -> Result<bool, DatabaseError>;
    async fn unset_other_primaries(&self, project_id: &str, keep_id: &str) -> Result<u64, DatabaseError>;
    async fn set_domain_primary(&self, id: &str) -> Result<ProjectDomain, DatabaseError>;
    /// claim_domains_for_check - Lease domains due for a verification check
    async fn claim_domains_for_check(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProjectDomain>, DatabaseError>;
    async fn update_domain_status(&self, id: &str, update: DomainStatusUpdate) -> Result<ProjectDomain, DatabaseError>;
    async fn mark_stale_domains(&self, created_before: DateTime<Utc>) -> Result<u64, DatabaseError>;

    // Project site records

    async fn get_project_site(&self, project_id: &str) -> Result<Option<ProjectSite>, DatabaseError>;
    async fn set_project_site_id(
        &self,
        project_id: &str,
        site_id: &str,
        site_name: &str,
    ) -> Result<ProjectSite, DatabaseError>;
    async fn record_project_deployment(
        &self,
        project_id: &str,
        job_id: &str,
        deployment_url: &str,
    ) -> Result<(), DatabaseError>;
    async fn record_project_failure(&self, project_id: &str, job_id: &str, error: &str) -> Result<(), DatabaseError>;
}
