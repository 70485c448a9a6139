use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::Utc;
use orchestrator_utils::env_utils::get_env_var_or_default;
use rstest::*;

use crate::core::client::database::DatabaseError;
use crate::core::client::{DatabaseClient, RepositoryDatabaseClient};
use crate::core::config::build_database_client;
use crate::tests::common::payload_for;
use crate::types::domains::domain_item::ProjectDomain;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::types::{FailureKind, JobFailure, JobStatus};
use crate::types::params::DatabaseArgs;

fn job(project_id: &str, priority: i32) -> DeploymentJob {
    DeploymentJob::new(project_id, payload_for(Some("dentist-1"), "wondrousdigital.com"), priority, 3)
}

/// Creates jobs in order, far enough apart for millisecond timestamps
async fn create_all(db: &dyn DatabaseClient, jobs: Vec<DeploymentJob>) -> Vec<DeploymentJob> {
    let mut created = Vec::new();
    for mut job in jobs {
        job.created_at = Utc::now();
        created.push(db.create_job(job).await.unwrap());
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    created
}

#[fixture]
fn memory() -> Arc<dyn DatabaseClient> {
    Arc::new(RepositoryDatabaseClient::in_memory())
}

/// A fresh MongoDB database, connected the way `run` connects so the indexes come from startup.
/// Reads `SITE_ORCHESTRATOR_MONGODB_CONNECTION_URL`, defaulting to a local server.
async fn mongo() -> Arc<dyn DatabaseClient> {
    let connection_url =
        get_env_var_or_default("SITE_ORCHESTRATOR_MONGODB_CONNECTION_URL", "mongodb://localhost:27017");
    let database_name = format!("orchestrator_test_{}", uuid::Uuid::new_v4().simple());
    build_database_client(&DatabaseArgs::MongoDB { connection_url, database_name }).await.unwrap()
}

async fn claims_highest_priority_then_oldest(db: Arc<dyn DatabaseClient>) {
    let jobs = create_all(db.as_ref(), vec![job("proj-a", 0), job("proj-b", 5), job("proj-c", 5)]).await;

    let order: Vec<String> = [
        db.claim_next_job("w").await.unwrap().unwrap(),
        db.claim_next_job("w").await.unwrap().unwrap(),
        db.claim_next_job("w").await.unwrap().unwrap(),
    ]
    .into_iter()
    .map(|job| job.id)
    .collect();

    assert_eq!(order, vec![jobs[1].id.clone(), jobs[2].id.clone(), jobs[0].id.clone()]);
    assert!(db.claim_next_job("w").await.unwrap().is_none());
}

async fn claim_marks_the_job_processing(db: Arc<dyn DatabaseClient>) {
    let created = create_all(db.as_ref(), vec![job("proj-a", 0)]).await.remove(0);

    let claimed = db.claim_next_job("worker-7").await.unwrap().unwrap();

    assert_eq!(claimed.id, created.id);
    assert_eq!(claimed.status, JobStatus::Processing);
    assert_eq!(claimed.claimed_by.as_deref(), Some("worker-7"));
    assert!(claimed.started_at.is_some());
    assert_eq!(db.get_job_by_id(&created.id).await.unwrap().unwrap().status, JobStatus::Processing);
}

async fn future_jobs_are_not_claimed(db: Arc<dyn DatabaseClient>) {
    let mut later = job("proj-a", 10);
    later.available_at = Utc::now() + chrono::Duration::hours(1);
    db.create_job(later).await.unwrap();

    assert!(db.claim_next_job("w").await.unwrap().is_none());
}

async fn one_processing_job_per_project(db: Arc<dyn DatabaseClient>) {
    let jobs = create_all(db.as_ref(), vec![job("proj-a", 0), job("proj-a", 0), job("proj-b", 0)]).await;

    let first = db.claim_next_job("w1").await.unwrap().unwrap();
    let second = db.claim_next_job("w2").await.unwrap().unwrap();
    assert_eq!(first.id, jobs[0].id);
    assert_eq!(second.id, jobs[2].id);
    assert!(db.claim_next_job("w3").await.unwrap().is_none());

    db.complete_job(&first.id, crate::types::jobs::types::DeploymentResult {
        site_id: "prj_1".to_string(),
        deploy_id: "dpl_1".to_string(),
        url: "https://dentist-1.wondrousdigital.com".to_string(),
    })
    .await
    .unwrap();
    assert_eq!(db.claim_next_job("w3").await.unwrap().unwrap().id, jobs[1].id);
}

/// 32 claimers race over 4 projects with 5 jobs each. Returns what they got.
async fn race_claimers(db: Arc<dyn DatabaseClient>) -> Vec<DeploymentJob> {
    for project in ["proj-a", "proj-b", "proj-c", "proj-d"] {
        for _ in 0..5 {
            db.create_job(job(project, 0)).await.unwrap();
        }
    }

    let claimers: Vec<_> = (0..32)
        .map(|i| {
            let db = db.clone();
            tokio::spawn(async move { db.claim_next_job(&format!("worker-{}", i)).await.unwrap() })
        })
        .collect();

    let mut claimed = Vec::new();
    for claimer in claimers {
        claimed.extend(claimer.await.unwrap());
    }

    let ids: HashSet<_> = claimed.iter().map(|job| job.id.clone()).collect();
    let projects: HashSet<_> = claimed.iter().map(|job| job.project_id.clone()).collect();
    assert_eq!(ids.len(), claimed.len(), "a job was handed to two workers");
    assert_eq!(projects.len(), claimed.len(), "a project holds two PROCESSING jobs");
    claimed
}

async fn transitions_require_the_expected_status(db: Arc<dyn DatabaseClient>) {
    let created = create_all(db.as_ref(), vec![job("proj-a", 0)]).await.remove(0);
    let failure = || JobFailure::new(FailureKind::ProviderTransient, "boom");

    assert_matches!(db.requeue_job(&created.id, Utc::now()).await, Err(DatabaseError::StateConflict(_)));
    assert_matches!(db.fail_job(&created.id, failure()).await, Err(DatabaseError::StateConflict(_)));

    db.claim_next_job("w").await.unwrap().unwrap();
    let failed = db.fail_job(&created.id, failure()).await.unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert!(failed.claimed_by.is_none());
    assert_matches!(db.fail_job(&created.id, failure()).await, Err(DatabaseError::StateConflict(_)));

    let requeued = db.requeue_job(&created.id, Utc::now()).await.unwrap();
    assert_eq!(requeued.status, JobStatus::Queued);
    assert_eq!(requeued.attempt_count, 2);
    assert_matches!(db.requeue_job(&created.id, Utc::now()).await, Err(DatabaseError::StateConflict(_)));
    assert_matches!(db.requeue_job("missing", Utc::now()).await, Err(DatabaseError::ItemNotFound(_)));
}

async fn only_retryable_failures_are_listed(db: Arc<dyn DatabaseClient>) {
    let jobs = create_all(db.as_ref(), vec![job("proj-a", 0), job("proj-b", 0)]).await;
    db.claim_next_job("w").await.unwrap();
    db.claim_next_job("w").await.unwrap();
    db.fail_job(&jobs[0].id, JobFailure::new(FailureKind::ProviderTransient, "503")).await.unwrap();
    db.fail_job(&jobs[1].id, JobFailure::new(FailureKind::Validation, "bad")).await.unwrap();

    let retryable = db.get_retryable_jobs(10).await.unwrap();

    assert_eq!(retryable.len(), 1);
    assert_eq!(retryable[0].id, jobs[0].id);
}

async fn one_primary_domain_per_project(db: Arc<dyn DatabaseClient>) {
    let first = db.create_domain(ProjectDomain::new("proj-a", "dentist.com", "prj_1", true)).await.unwrap();
    assert_matches!(
        db.create_domain(ProjectDomain::new("proj-a", "smile.com", "prj_1", true)).await,
        Err(DatabaseError::DuplicateKey(_))
    );
    assert_matches!(
        db.create_domain(ProjectDomain::new("proj-b", "dentist.com", "prj_2", false)).await,
        Err(DatabaseError::DuplicateKey(_))
    );

    let second = db.create_domain(ProjectDomain::new("proj-a", "smile.com", "prj_1", false)).await.unwrap();
    assert_matches!(db.set_domain_primary(&second.id).await, Err(DatabaseError::DuplicateKey(_)));

    assert_eq!(db.unset_other_primaries("proj-a", &second.id).await.unwrap(), 1);
    assert!(db.set_domain_primary(&second.id).await.unwrap().is_primary);
    assert!(!db.get_domain_by_id(&first.id).await.unwrap().unwrap().is_primary);
}

async fn project_site_id_is_set_once(db: Arc<dyn DatabaseClient>) {
    db.set_project_site_id("proj-a", "prj_1", "site-proj-a").await.unwrap();

    let site = db.set_project_site_id("proj-a", "prj_2", "site-proj-a").await.unwrap();

    assert_eq!(site.site_id.as_deref(), Some("prj_1"));
}

#[rstest]
#[tokio::test]
async fn memory_claims_highest_priority_then_oldest(memory: Arc<dyn DatabaseClient>) {
    claims_highest_priority_then_oldest(memory).await;
}

#[rstest]
#[tokio::test]
async fn memory_claim_marks_the_job_processing(memory: Arc<dyn DatabaseClient>) {
    claim_marks_the_job_processing(memory).await;
}

#[rstest]
#[tokio::test]
async fn memory_future_jobs_are_not_claimed(memory: Arc<dyn DatabaseClient>) {
    future_jobs_are_not_claimed(memory).await;
}

#[rstest]
#[tokio::test]
async fn memory_one_processing_job_per_project(memory: Arc<dyn DatabaseClient>) {
    one_processing_job_per_project(memory).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_claimers_take_one_job_per_project(memory: Arc<dyn DatabaseClient>) {
    let claimed = race_claimers(memory.clone()).await;

    assert_eq!(claimed.len(), 4);
    assert!(memory.claim_next_job("late-worker").await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
async fn memory_transitions_require_the_expected_status(memory: Arc<dyn DatabaseClient>) {
    transitions_require_the_expected_status(memory).await;
}

#[rstest]
#[tokio::test]
async fn memory_only_retryable_failures_are_listed(memory: Arc<dyn DatabaseClient>) {
    only_retryable_failures_are_listed(memory).await;
}

#[rstest]
#[tokio::test]
async fn memory_one_primary_domain_per_project(memory: Arc<dyn DatabaseClient>) {
    one_primary_domain_per_project(memory).await;
}

#[rstest]
#[tokio::test]
async fn memory_project_site_id_is_set_once(memory: Arc<dyn DatabaseClient>) {
    project_site_id_is_set_once(memory).await;
}

#[rstest]
#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn mongo_claims_highest_priority_then_oldest() {
    claims_highest_priority_then_oldest(mongo().await).await;
}

#[rstest]
#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn mongo_one_processing_job_per_project() {
    one_processing_job_per_project(mongo().await).await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires a running MongoDB"]
async fn mongo_concurrent_claimers_take_one_job_per_project() {
    // Claimers that keep losing the race give up with nothing, so fewer than 4 may win
    let claimed = race_claimers(mongo().await).await;

    assert!(!claimed.is_empty());
    assert!(claimed.len() <= 4);
}

#[rstest]
#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn mongo_transitions_require_the_expected_status() {
    transitions_require_the_expected_status(mongo().await).await;
}

#[rstest]
#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn mongo_one_primary_domain_per_project() {
    one_primary_domain_per_project(mongo().await).await;
}

#[rstest]
#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn mongo_project_site_id_is_set_once() {
    project_site_id_is_set_once(mongo().await).await;
}
