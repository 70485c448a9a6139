use async_trait::async_trait;

use crate::core::client::database::error::DatabaseError;
use crate::types::projects::ProjectSite;

/// Repository for the deployment fields of project records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn get_project_site(&self, project_id: &str) -> Result<Option<ProjectSite>, DatabaseError>;

    /// Store the hosted site of a project unless one is already recorded.
    ///
    /// Returns the record as stored. When another writer recorded a site first, the returned
    /// `site_id` is theirs and the caller must use it.
    async fn set_project_site_id(
        &self,
        project_id: &str,
        site_id: &str,
        site_name: &str,
    ) -> Result<ProjectSite, DatabaseError>;

    /// Successful deployment: url, DEPLOYED status, and the job that produced it
    async fn record_project_deployment(
        &self,
        project_id: &str,
        job_id: &str,
        deployment_url: &str,
    ) -> Result<(), DatabaseError>;

    /// Terminal job failure surfaced to the project owner
    async fn record_project_failure(&self, project_id: &str, job_id: &str, error: &str) -> Result<(), DatabaseError>;
}
