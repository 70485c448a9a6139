use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rstest::*;
use tokio_util::sync::CancellationToken;

use crate::core::config::Config;
use crate::tests::common::{payload, payload_for, FakeHostingClient};
use crate::tests::config::TestConfigBuilder;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::payload::DeploymentPayload;
use crate::types::jobs::types::{FailureKind, JobFailure, JobStatus};
use crate::types::projects::ProjectDeploymentStatus;
use crate::worker::core_worker::sweeper::{sweep_once, SweepReport};
use crate::worker::core_worker::{DeploymentWorker, WorkerConfig};
use crate::worker::initialize_worker;
use crate::worker::service::JobService;

async fn failed_job(config: &Arc<Config>, project_id: &str, kind: FailureKind, max_attempts: u32) -> DeploymentJob {
    let job = DeploymentJob::new(project_id, payload_for(Some("dentist-1"), "wondrousdigital.com"), 0, max_attempts);
    config.database().create_job(job.clone()).await.unwrap();
    config.database().claim_next_job("w").await.unwrap().unwrap();
    config.database().fail_job(&job.id, JobFailure::new(kind, "boom")).await.unwrap()
}

/// Wait until every job reaches one of `statuses`, or give up after five seconds
async fn wait_for_status(config: &Arc<Config>, ids: &[String], statuses: &[JobStatus]) -> Vec<DeploymentJob> {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let mut jobs = Vec::new();
        for id in ids {
            jobs.push(JobService::get_job(config.clone(), id).await.unwrap());
        }
        if jobs.iter().all(|job| statuses.contains(&job.status)) || tokio::time::Instant::now() > deadline {
            return jobs;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[rstest]
#[tokio::test]
async fn sweeper_requeues_retryable_failures_with_backoff() {
    let config = TestConfigBuilder::new().build();
    let job = failed_job(&config, "proj-1", FailureKind::ProviderTransient, 3).await;
    let before = Utc::now();

    let report = sweep_once(&config).await.unwrap();

    assert_eq!(report, SweepReport { stale_recovered: 0, requeued: 1 });
    let job = JobService::get_job(config, &job.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.attempt_count, 2);
    // First retry waits the base delay
    assert!(job.available_at >= before + chrono::Duration::seconds(30));
    assert!(job.available_at <= Utc::now() + chrono::Duration::seconds(30));
}

#[rstest]
#[case(FailureKind::Validation, 3)]
#[case(FailureKind::ProviderPermanent, 3)]
#[case(FailureKind::StateConflict, 1)]
#[tokio::test]
async fn sweeper_leaves_terminal_failures_alone(#[case] kind: FailureKind, #[case] max_attempts: u32) {
    let config = TestConfigBuilder::new().build();
    let job = failed_job(&config, "proj-1", kind, max_attempts).await;

    let report = sweep_once(&config).await.unwrap();

    assert_eq!(report.requeued, 0);
    assert_eq!(JobService::get_job(config, &job.id).await.unwrap().status, JobStatus::Failed);
}

#[rstest]
#[tokio::test]
async fn stale_claims_are_failed_and_retried_in_one_sweep(payload: DeploymentPayload) {
    let config =
        TestConfigBuilder::new().configure_params(|params| params.service.job_processing_timeout_seconds = 0).build();
    let job = JobService::enqueue(config.clone(), "proj-1", payload, None).await.unwrap();
    config.database().claim_next_job("crashed-worker").await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let report = sweep_once(&config).await.unwrap();

    assert_eq!(report, SweepReport { stale_recovered: 1, requeued: 1 });
    let job = JobService::get_job(config, &job.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.attempt_count, 2);
    assert!(job.claimed_by.is_none());
    assert_eq!(job.failure_kind, Some(FailureKind::ProviderTransient));
}

#[rstest]
#[tokio::test]
async fn stale_claim_on_last_attempt_fails_the_project(payload: DeploymentPayload) {
    let config = TestConfigBuilder::new()
        .configure_params(|params| {
            params.service.job_processing_timeout_seconds = 0;
            params.retry_policy.max_attempts = 1;
        })
        .build();
    let job = JobService::enqueue(config.clone(), "proj-1", payload, None).await.unwrap();
    config.database().claim_next_job("crashed-worker").await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let report = sweep_once(&config).await.unwrap();

    assert_eq!(report, SweepReport { stale_recovered: 1, requeued: 0 });
    let job = JobService::get_job(config.clone(), &job.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.unwrap().contains("timed out"));
    let site = config.database().get_project_site("proj-1").await.unwrap().unwrap();
    assert_eq!(site.deployment_status, Some(ProjectDeploymentStatus::Failed));
}

#[rstest]
#[tokio::test]
async fn recent_claims_are_not_stale(payload: DeploymentPayload) {
    let config = TestConfigBuilder::new().build();
    JobService::enqueue(config.clone(), "proj-1", payload, None).await.unwrap();
    config.database().claim_next_job("busy-worker").await.unwrap().unwrap();

    assert_eq!(sweep_once(&config).await.unwrap(), SweepReport::default());
}

#[rstest]
#[tokio::test]
async fn worker_pool_runs_queued_jobs_to_completion(payload: DeploymentPayload) {
    let hosting = Arc::new(FakeHostingClient::default());
    let config = TestConfigBuilder::new().configure_hosting_client(hosting.clone()).build();
    let mut ids = Vec::new();
    for project in ["proj-1", "proj-2", "proj-3"] {
        ids.push(JobService::enqueue(config.clone(), project, payload.clone(), None).await.unwrap().id);
    }

    let token = CancellationToken::new();
    let mut worker = DeploymentWorker::new(
        WorkerConfig::new(Duration::from_millis(20), 2),
        config.clone(),
        token.clone(),
    );
    let handle = tokio::spawn(async move { worker.run().await });

    let jobs = wait_for_status(&config, &ids, &[JobStatus::Completed]).await;
    token.cancel();
    handle.await.unwrap();

    assert!(jobs.iter().all(|job| job.status == JobStatus::Completed));
    assert_eq!(hosting.deploy_count(), 3);
    assert_eq!(hosting.create_site_calls(), 3);
}

#[rstest]
#[tokio::test]
async fn jobs_of_one_project_run_one_at_a_time(payload: DeploymentPayload) {
    let config = TestConfigBuilder::new().build();
    JobService::enqueue(config.clone(), "proj-1", payload.clone(), None).await.unwrap();
    JobService::enqueue(config.clone(), "proj-1", payload.clone(), None).await.unwrap();
    let other = JobService::enqueue(config.clone(), "proj-2", payload, None).await.unwrap();

    let first = config.database().claim_next_job("w1").await.unwrap().unwrap();
    let second = config.database().claim_next_job("w2").await.unwrap().unwrap();

    assert_eq!(first.project_id, "proj-1");
    assert_eq!(second.id, other.id);
    assert!(config.database().claim_next_job("w3").await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
async fn controller_stops_every_worker_on_shutdown(payload: DeploymentPayload) {
    let config = TestConfigBuilder::new().build();
    let job = JobService::enqueue(config.clone(), "proj-1", payload, None).await.unwrap();

    let mut controller = initialize_worker(config.clone(), CancellationToken::new());
    let jobs = wait_for_status(&config, &[job.id], &[JobStatus::Completed]).await;
    assert_eq!(jobs[0].status, JobStatus::Completed);

    tokio::time::timeout(Duration::from_secs(5), controller.shutdown()).await.unwrap();
    assert!(!controller.is_running());
}
