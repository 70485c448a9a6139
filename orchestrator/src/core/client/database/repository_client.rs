//! DatabaseClient implementation using the repository pattern
//!
//! This client implements the DatabaseClient trait by delegating to the
//! job, domain and project repositories. The same adapter serves the MongoDB
//! repositories and the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::DatabaseError;
use super::memory::InMemoryStore;
use super::mongo_client::MongoClient;
use super::repository::{
    DomainRepository, JobRepository, MongoDomainRepository, MongoJobRepository, MongoProjectRepository,
    ProjectRepository,
};
use super::DatabaseClient;
use crate::types::domains::domain_item::ProjectDomain;
use crate::types::domains::types::DomainStatusUpdate;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::types::{DeploymentResult, JobFailure};
use crate::types::projects::ProjectSite;

/// DatabaseClient implementation that uses repositories internally
pub struct RepositoryDatabaseClient {
    job_repo: Arc<dyn JobRepository>,
    domain_repo: Arc<dyn DomainRepository>,
    project_repo: Arc<dyn ProjectRepository>,
    /// Present for the MongoDB backend, used by health checks
    mongo: Option<Arc<MongoClient>>,
}

impl RepositoryDatabaseClient {
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        domain_repo: Arc<dyn DomainRepository>,
        project_repo: Arc<dyn ProjectRepository>,
    ) -> Self {
        Self { job_repo, domain_repo, project_repo, mongo: None }
    }

    pub fn mongodb(client: Arc<MongoClient>) -> Self {
        Self {
            job_repo: Arc::new(MongoJobRepository::new(client.clone())),
            domain_repo: Arc::new(MongoDomainRepository::new(client.clone())),
            project_repo: Arc::new(MongoProjectRepository::new(client.clone())),
            mongo: Some(client),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(store.clone(), store.clone(), store)
    }
}

#[async_trait]
impl DatabaseClient for RepositoryDatabaseClient {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        match &self.mongo {
            Some(client) => client.health_check().await,
            None => Ok(()),
        }
    }

    // ================================================================================
    // Job Management Methods - delegate to JobRepository
    // ================================================================================

    async fn create_job(&self, job: DeploymentJob) -> Result<DeploymentJob, DatabaseError> {
        self.job_repo.create_job(job).await
    }

    async fn get_job_by_id(&self, id: &str) -> Result<Option<DeploymentJob>, DatabaseError> {
        self.job_repo.get_job_by_id(id).await
    }

    async fn get_jobs_by_project(&self, project_id: &str, limit: i64) -> Result<Vec<DeploymentJob>, DatabaseError> {
        self.job_repo.get_jobs_by_project(project_id, limit).await
    }

    async fn claim_next_job(&self, worker_id: &str) -> Result<Option<DeploymentJob>, DatabaseError> {
        self.job_repo.claim_next_job(worker_id).await
    }

    async fn set_job_deploy_id(&self, id: &str, deploy_id: &str) -> Result<DeploymentJob, DatabaseError> {
        self.job_repo.set_job_deploy_id(id, deploy_id).await
    }

    async fn complete_job(&self, id: &str, result: DeploymentResult) -> Result<DeploymentJob, DatabaseError> {
        self.job_repo.complete_job(id, result).await
    }

    async fn fail_job(&self, id: &str, failure: JobFailure) -> Result<DeploymentJob, DatabaseError> {
        self.job_repo.fail_job(id, failure).await
    }

    async fn requeue_job(&self, id: &str, available_at: DateTime<Utc>) -> Result<DeploymentJob, DatabaseError> {
        self.job_repo.requeue_job(id, available_at).await
    }

    async fn get_retryable_jobs(&self, limit: i64) -> Result<Vec<DeploymentJob>, DatabaseError> {
        self.job_repo.get_retryable_jobs(limit).await
    }

    async fn get_stale_processing_jobs(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<DeploymentJob>, DatabaseError> {
        self.job_repo.get_stale_processing_jobs(started_before, limit).await
    }

    // ================================================================================
    // Domain Methods - delegate to DomainRepository
    // ================================================================================

    async fn create_domain(&self, domain: ProjectDomain) -> Result<ProjectDomain, DatabaseError> {
        self.domain_repo.create_domain(domain).await
    }

    async fn get_domain_by_id(&self, id: &str) -> Result<Option<ProjectDomain>, DatabaseError> {
        self.domain_repo.get_domain_by_id(id).await
    }

    async fn get_domain_by_name(&self, domain: &str) -> Result<Option<ProjectDomain>, DatabaseError> {
        self.domain_repo.get_domain_by_name(domain).await
    }

    async fn get_domains_by_project(&self, project_id: &str) -> Result<Vec<ProjectDomain>, DatabaseError> {
        self.domain_repo.get_domains_by_project(project_id).await
    }

    async fn delete_domain(&self, id: &str) -> Result<bool, DatabaseError> {
        self.domain_repo.delete_domain(id).await
    }

    async fn unset_other_primaries(&self, project_id: &str, keep_id: &str) -> Result<u64, DatabaseError> {
        self.domain_repo.unset_other_primaries(project_id, keep_id).await
    }

    async fn set_domain_primary(&self, id: &str) -> Result<ProjectDomain, DatabaseError> {
        self.domain_repo.set_domain_primary(id).await
    }

    async fn claim_domains_for_check(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProjectDomain>, DatabaseError> {
        self.domain_repo.claim_domains_for_check(now, lease_until, limit).await
    }

    async fn update_domain_status(&self, id: &str, update: DomainStatusUpdate) -> Result<ProjectDomain, DatabaseError> {
        self.domain_repo.update_domain_status(id, update).await
    }

    async fn mark_stale_domains(&self, created_before: DateTime<Utc>) -> Result<u64, DatabaseError> {
        self.domain_repo.mark_stale_domains(created_before).await
    }

    // ================================================================================
    // Project Methods - delegate to ProjectRepository
    // ================================================================================

    async fn get_project_site(&self, project_id: &str) -> Result<Option<ProjectSite>, DatabaseError> {
        self.project_repo.get_project_site(project_id).await
    }

    async fn set_project_site_id(
        &self,
        project_id: &str,
        site_id: &str,
        site_name: &str,
    ) -> Result<ProjectSite, DatabaseError> {
        self.project_repo.set_project_site_id(project_id, site_id, site_name).await
    }

    async fn record_project_deployment(
        &self,
        project_id: &str,
        job_id: &str,
        deployment_url: &str,
    ) -> Result<(), DatabaseError> {
        self.project_repo.record_project_deployment(project_id, job_id, deployment_url).await
    }

    async fn record_project_failure(&self, project_id: &str, job_id: &str, error: &str) -> Result<(), DatabaseError> {
        self.project_repo.record_project_failure(project_id, job_id, error).await
    }
}
