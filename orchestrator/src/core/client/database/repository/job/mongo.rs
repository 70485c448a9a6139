use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use tracing::{debug, warn};

use super::r#trait::JobRepository;
use crate::core::client::database::constant::{JOBS_COLLECTION, MAX_CONFLICT_RETRIES};
use crate::core::client::database::error::DatabaseError;
use crate::core::client::database::mongo_client::MongoClient;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::types::{DeploymentResult, FailureKind, JobFailure, JobStatus};

pub struct MongoJobRepository {
    client: Arc<MongoClient>,
}

impl MongoJobRepository {
    pub fn new(client: Arc<MongoClient>) -> Self {
        Self { client }
    }

    fn status(status: JobStatus) -> Result<Bson, DatabaseError> {
        Ok(bson::to_bson(&status)?)
    }

    fn return_updated() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build()
    }

    /// Conditional update of one job. `filter` must already pin the expected state.
    async fn transition(
        &self,
        id: &str,
        filter: Document,
        update: Document,
        expected: &str,
    ) -> Result<DeploymentJob, DatabaseError> {
        match self.client.find_one_and_update(JOBS_COLLECTION, filter, update, Self::return_updated()).await? {
            Some(job) => Ok(job),
            None => Err(self.explain_miss(id, expected).await),
        }
    }

    /// Tell an unknown id apart from a job in the wrong state.
    async fn explain_miss(&self, id: &str, expected: &str) -> DatabaseError {
        match self.get_job_by_id(id).await {
            Ok(Some(job)) => DatabaseError::StateConflict(format!(
                "job {} is {} (attempt {}/{}), expected {}",
                id, job.status, job.attempt_count, job.max_attempts, expected
            )),
            Ok(None) => DatabaseError::ItemNotFound(format!("job {}", id)),
            Err(e) => e,
        }
    }

    /// Projects that currently hold a PROCESSING job
    async fn busy_projects(&self) -> Result<Vec<Bson>, DatabaseError> {
        self.client
            .distinct::<DeploymentJob>(JOBS_COLLECTION, "project_id", doc! { "status": Self::status(JobStatus::Processing)? })
            .await
    }
}

#[async_trait]
impl JobRepository for MongoJobRepository {
    async fn create_job(&self, job: DeploymentJob) -> Result<DeploymentJob, DatabaseError> {
        self.client.insert_one(JOBS_COLLECTION, &job).await?;
        debug!(job_id = %job.id, project_id = %job.project_id, "Job inserted");
        Ok(job)
    }

    async fn get_job_by_id(&self, id: &str) -> Result<Option<DeploymentJob>, DatabaseError> {
        self.client.find_one(JOBS_COLLECTION, doc! { "id": id }).await
    }

    async fn get_jobs_by_project(&self, project_id: &str, limit: i64) -> Result<Vec<DeploymentJob>, DatabaseError> {
        let options = FindOptions::builder().sort(doc! { "created_at": -1 }).limit(limit).build();
        self.client.find_many(JOBS_COLLECTION, doc! { "project_id": project_id }, Some(options)).await
    }

    async fn claim_next_job(&self, worker_id: &str) -> Result<Option<DeploymentJob>, DatabaseError> {
        for attempt in 1..=MAX_CONFLICT_RETRIES {
            let busy = self.busy_projects().await?;
            let now = Utc::now().trunc_subsecs(3);

            let filter = doc! {
                "status": Self::status(JobStatus::Queued)?,
                "available_at": { "$lte": now },
                "project_id": { "$nin": busy },
            };
            let update = doc! {
                "$set": {
                    "status": Self::status(JobStatus::Processing)?,
                    "claimed_by": worker_id,
                    "started_at": now,
                    "updated_at": now,
                }
            };
            let options = FindOneAndUpdateOptions::builder()
                .sort(doc! { "priority": -1, "created_at": 1 })
                .return_document(ReturnDocument::After)
                .build();

            match self.client.find_one_and_update::<DeploymentJob>(JOBS_COLLECTION, filter, update, options).await {
                Ok(job) => return Ok(job),
                // Another worker claimed a job of the same project since we read the busy set
                Err(DatabaseError::DuplicateKey(message)) => {
                    debug!(attempt, worker_id, error = %message, "Lost claim race, retrying with a fresh view");
                }
                Err(e) => return Err(e),
            }
        }

        warn!(worker_id, "Giving up claim after repeated conflicts");
        Ok(None)
    }

    async fn set_job_deploy_id(&self, id: &str, deploy_id: &str) -> Result<DeploymentJob, DatabaseError> {
        let filter = doc! { "id": id, "status": Self::status(JobStatus::Processing)? };
        let update = doc! { "$set": { "deploy_id": deploy_id, "updated_at": Utc::now().trunc_subsecs(3) } };
        self.transition(id, filter, update, "PROCESSING").await
    }

    async fn complete_job(&self, id: &str, result: DeploymentResult) -> Result<DeploymentJob, DatabaseError> {
        let now = Utc::now().trunc_subsecs(3);
        let filter = doc! { "id": id, "status": Self::status(JobStatus::Processing)? };
        let update = doc! {
            "$set": {
                "status": Self::status(JobStatus::Completed)?,
                "result": bson::to_bson(&result)?,
                "error_message": Bson::Null,
                "failure_kind": Bson::Null,
                "claimed_by": Bson::Null,
                "completed_at": now,
                "updated_at": now,
            }
        };
        self.transition(id, filter, update, "PROCESSING").await
    }

    async fn fail_job(&self, id: &str, failure: JobFailure) -> Result<DeploymentJob, DatabaseError> {
        let now = Utc::now().trunc_subsecs(3);
        let filter = doc! { "id": id, "status": Self::status(JobStatus::Processing)? };
        let update = doc! {
            "$set": {
                "status": Self::status(JobStatus::Failed)?,
                "error_message": failure.message,
                "failure_kind": bson::to_bson(&failure.kind)?,
                "claimed_by": Bson::Null,
                "completed_at": now,
                "updated_at": now,
            }
        };
        self.transition(id, filter, update, "PROCESSING").await
    }

    async fn requeue_job(&self, id: &str, available_at: DateTime<Utc>) -> Result<DeploymentJob, DatabaseError> {
        let filter = doc! {
            "id": id,
            "status": Self::status(JobStatus::Failed)?,
            "$expr": { "$lt": ["$attempt_count", "$max_attempts"] },
        };
        let update = doc! {
            "$inc": { "attempt_count": 1 },
            "$set": {
                "status": Self::status(JobStatus::Queued)?,
                "available_at": available_at.trunc_subsecs(3),
                "deploy_id": Bson::Null,
                "started_at": Bson::Null,
                "completed_at": Bson::Null,
                "updated_at": Utc::now().trunc_subsecs(3),
            }
        };
        self.transition(id, filter, update, "FAILED with attempts left").await
    }

    async fn get_retryable_jobs(&self, limit: i64) -> Result<Vec<DeploymentJob>, DatabaseError> {
        let kinds = [FailureKind::ProviderTransient, FailureKind::StateConflict]
            .iter()
            .map(bson::to_bson)
            .collect::<Result<Vec<_>, _>>()?;
        let filter = doc! {
            "status": Self::status(JobStatus::Failed)?,
            "failure_kind": { "$in": kinds },
            "$expr": { "$lt": ["$attempt_count", "$max_attempts"] },
        };
        let options = FindOptions::builder().sort(doc! { "completed_at": 1 }).limit(limit).build();
        self.client.find_many(JOBS_COLLECTION, filter, Some(options)).await
    }

    async fn get_stale_processing_jobs(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<DeploymentJob>, DatabaseError> {
        let filter = doc! {
            "status": Self::status(JobStatus::Processing)?,
            "started_at": { "$lt": started_before.trunc_subsecs(3) },
        };
        let options = FindOptions::builder().sort(doc! { "started_at": 1 }).limit(limit).build();
        self.client.find_many(JOBS_COLLECTION, filter, Some(options)).await
    }
}
