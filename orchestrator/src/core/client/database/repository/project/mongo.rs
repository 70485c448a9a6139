use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use mongodb::bson::{self, doc, Bson};
use tracing::debug;

use super::r#trait::ProjectRepository;
use crate::core::client::database::constant::PROJECT_SITES_COLLECTION;
use crate::core::client::database::error::DatabaseError;
use crate::core::client::database::mongo_client::MongoClient;
use crate::types::projects::{ProjectDeploymentStatus, ProjectSite};

pub struct MongoProjectRepository {
    client: Arc<MongoClient>,
}

impl MongoProjectRepository {
    pub fn new(client: Arc<MongoClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProjectRepository for MongoProjectRepository {
    async fn get_project_site(&self, project_id: &str) -> Result<Option<ProjectSite>, DatabaseError> {
        self.client.find_one(PROJECT_SITES_COLLECTION, doc! { "project_id": project_id }).await
    }

    async fn set_project_site_id(
        &self,
        project_id: &str,
        site_id: &str,
        site_name: &str,
    ) -> Result<ProjectSite, DatabaseError> {
        let now = Utc::now().trunc_subsecs(3);

        // A record may exist without a site, e.g. after a failure was recorded
        let filter = doc! { "project_id": project_id, "site_id": Bson::Null };
        let update = doc! { "$set": { "site_id": site_id, "site_name": site_name, "updated_at": now } };
        let result = self.client.update_one::<ProjectSite>(PROJECT_SITES_COLLECTION, filter, update).await?;

        if result.matched_count == 0 {
            let mut site = ProjectSite::new(project_id);
            site.site_id = Some(site_id.to_string());
            site.site_name = Some(site_name.to_string());
            match self.client.insert_if_not_exists(PROJECT_SITES_COLLECTION, doc! { "project_id": project_id }, &site).await
            {
                Ok(inserted) => debug!(project_id, inserted, "Recorded project site"),
                // Concurrent upsert of the same project, the unique index kept one
                Err(DatabaseError::DuplicateKey(_)) => {}
                Err(e) => return Err(e),
            }
        }

        self.get_project_site(project_id)
            .await?
            .ok_or_else(|| DatabaseError::ItemNotFound(format!("project site {}", project_id)))
    }

    async fn record_project_deployment(
        &self,
        project_id: &str,
        job_id: &str,
        deployment_url: &str,
    ) -> Result<(), DatabaseError> {
        let update = doc! {
            "$set": {
                "deployment_url": deployment_url,
                "deployment_status": bson::to_bson(&ProjectDeploymentStatus::Deployed)?,
                "last_job_id": job_id,
                "last_error": Bson::Null,
                "updated_at": Utc::now().trunc_subsecs(3),
            }
        };
        self.client.upsert_one::<ProjectSite>(PROJECT_SITES_COLLECTION, doc! { "project_id": project_id }, update).await
    }

    async fn record_project_failure(&self, project_id: &str, job_id: &str, error: &str) -> Result<(), DatabaseError> {
        let update = doc! {
            "$set": {
                "deployment_status": bson::to_bson(&ProjectDeploymentStatus::Failed)?,
                "last_job_id": job_id,
                "last_error": error,
                "updated_at": Utc::now().trunc_subsecs(3),
            }
        };
        self.client.upsert_one::<ProjectSite>(PROJECT_SITES_COLLECTION, doc! { "project_id": project_id }, update).await
    }
}
