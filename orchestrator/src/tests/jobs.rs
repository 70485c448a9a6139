use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::Utc;
use orchestrator_hosting_client_interface::{DeployStatus, MockHostingClient};
use rstest::*;

use crate::core::config::Config;
use crate::error::job::JobError;
use crate::tests::common::{payload, payload_for, FakeHostingClient, Fault};
use crate::tests::config::TestConfigBuilder;
use crate::types::constant::INDEX_FILE_NAME;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::payload::DeploymentPayload;
use crate::types::jobs::types::{FailureKind, JobFailure, JobStatus};
use crate::types::projects::ProjectDeploymentStatus;
use crate::worker::event_handler::jobs::MockJobHandlerTrait;
use crate::worker::event_handler::service::JobHandlerService;
use crate::worker::service::JobService;

fn setup() -> (Arc<FakeHostingClient>, Arc<Config>) {
    let hosting = Arc::new(FakeHostingClient::default());
    let config = TestConfigBuilder::new().configure_hosting_client(hosting.clone()).build();
    (hosting, config)
}

/// Enqueue and claim, leaving the job PROCESSING
async fn claimed(config: &Arc<Config>, project_id: &str, payload: DeploymentPayload) -> DeploymentJob {
    let job = JobService::enqueue(config.clone(), project_id, payload, None).await.unwrap();
    let claimed = config.database().claim_next_job("test-worker").await.unwrap().unwrap();
    assert_eq!(claimed.id, job.id);
    claimed
}

#[rstest]
#[tokio::test]
async fn enqueue_stores_a_queued_first_attempt(payload: DeploymentPayload) {
    let (_, config) = setup();

    let job = JobService::enqueue(config.clone(), "  proj-1 ", payload, Some(5)).await.unwrap();

    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.project_id, "proj-1");
    assert_eq!(job.attempt_count, 1);
    assert_eq!(job.max_attempts, 3);
    assert_eq!(job.priority, 5);
    assert!(job.available_at <= Utc::now());

    let stored = JobService::get_job(config, &job.id).await.unwrap();
    assert_eq!(stored, job);
}

#[rstest]
#[case("", payload_for(None, "dentist.com"))]
#[case("proj-1", payload_for(None, ""))]
#[case("proj-1", payload_for(None, "not a domain"))]
#[case("proj-1", payload_for(Some("bad_label"), "wondrousdigital.com"))]
#[tokio::test]
async fn enqueue_rejects_invalid_requests(#[case] project_id: &str, #[case] payload: DeploymentPayload) {
    let (_, config) = setup();

    let result = JobService::enqueue(config.clone(), project_id, payload, None).await;

    assert_matches!(result, Err(JobError::Validation(_)));
    assert!(config.database().claim_next_job("w").await.unwrap().is_none());
}

#[rstest]
#[case(None, "wondrousdigital.com")]
#[case(None, "WWW.WondrousDigital.com.")]
#[case(Some("www"), "wondrousdigital.com")]
#[tokio::test]
async fn enqueue_refuses_reserved_hosts(#[case] subdomain: Option<&str>, #[case] domain: &str) {
    let (hosting, config) = setup();

    let error = JobService::enqueue(config.clone(), "proj-1", payload_for(subdomain, domain), None).await.unwrap_err();

    assert_eq!(error.kind(), FailureKind::Validation);
    assert_matches!(error, JobError::ReservedDomain { .. });
    assert!(config.database().claim_next_job("w").await.unwrap().is_none());
    assert_eq!(hosting.create_site_calls(), 0);
}

#[rstest]
#[tokio::test]
async fn unknown_job_is_not_found() {
    let (_, config) = setup();
    assert_matches!(JobService::get_job(config, "missing").await, Err(JobError::JobNotFound { .. }));
}

#[rstest]
#[tokio::test]
async fn listing_is_newest_first(payload: DeploymentPayload) {
    let (_, config) = setup();
    let first = JobService::enqueue(config.clone(), "proj-1", payload.clone(), None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    let second = JobService::enqueue(config.clone(), "proj-1", payload.clone(), None).await.unwrap();
    JobService::enqueue(config.clone(), "proj-2", payload, None).await.unwrap();

    let jobs = JobService::list_jobs(config, "proj-1").await.unwrap();

    assert_eq!(jobs.iter().map(|j| j.id.as_str()).collect::<Vec<_>>(), vec![second.id.as_str(), first.id.as_str()]);
}

#[rstest]
#[tokio::test]
async fn successful_deployment_completes_job_and_updates_project(payload: DeploymentPayload) {
    let (hosting, config) = setup();
    hosting.script_deploy(vec![DeployStatus::Pending, DeployStatus::Pending, DeployStatus::Ready]);
    let job = claimed(&config, "proj-1", payload).await;

    let job = JobHandlerService::process_job(job, config.clone()).await.unwrap();

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.claimed_by.is_none());
    assert!(job.completed_at.is_some());
    let result = job.result.clone().unwrap();
    assert_eq!(result.url, "https://dentist-1.wondrousdigital.com");
    assert_eq!(result.deploy_id, "dpl_1");
    assert_eq!(job.deploy_id.as_deref(), Some("dpl_1"));
    assert!(hosting.is_attached(&result.site_id, "dentist-1.wondrousdigital.com"));

    let site = config.database().get_project_site("proj-1").await.unwrap().unwrap();
    assert_eq!(site.site_id.as_deref(), Some(result.site_id.as_str()));
    assert_eq!(site.deployment_url.as_deref(), Some("https://dentist-1.wondrousdigital.com"));
    assert_eq!(site.deployment_status, Some(ProjectDeploymentStatus::Deployed));
    assert_eq!(site.last_job_id.as_deref(), Some(job.id.as_str()));

    let artifact = hosting.last_artifact().unwrap();
    let index = String::from_utf8(artifact.file(INDEX_FILE_NAME).unwrap().content.clone()).unwrap();
    assert!(index.contains("Welcome &lt;friends&gt;"));
}

#[rstest]
#[tokio::test]
async fn later_deployments_reuse_the_hosted_site(payload: DeploymentPayload) {
    let (hosting, config) = setup();

    let first = claimed(&config, "proj-1", payload.clone()).await;
    let first = JobHandlerService::process_job(first, config.clone()).await.unwrap();
    let second = claimed(&config, "proj-1", payload).await;
    let second = JobHandlerService::process_job(second, config.clone()).await.unwrap();

    assert_eq!(hosting.create_site_calls(), 1);
    assert_eq!(hosting.deploy_count(), 2);
    assert_eq!(first.result.unwrap().site_id, second.result.unwrap().site_id);
}

#[rstest]
#[tokio::test]
async fn reserved_root_domain_fails_before_any_provider_call() {
    // No expectations: any provider call panics and the message would name the mock instead
    let config = TestConfigBuilder::new().configure_hosting_client(Arc::new(MockHostingClient::new())).build();
    // Inserted directly, enqueue refuses reserved hosts
    let job = DeploymentJob::new("proj-1", payload_for(None, "WondrousDigital.com."), 0, 3);
    config.database().create_job(job).await.unwrap();
    let job = config.database().claim_next_job("test-worker").await.unwrap().unwrap();

    let job = JobHandlerService::process_job(job, config.clone()).await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.failure_kind, Some(FailureKind::Validation));
    assert!(job.error_message.unwrap().contains("reserved"));
    let site = config.database().get_project_site("proj-1").await.unwrap().unwrap();
    assert_eq!(site.deployment_status, Some(ProjectDeploymentStatus::Failed));
    assert!(site.site_id.is_none());
}

#[rstest]
#[tokio::test]
async fn provider_deploy_error_is_a_terminal_failure(payload: DeploymentPayload) {
    let (hosting, config) = setup();
    hosting.script_deploy(vec![DeployStatus::Error("build exploded".to_string())]);
    let job = claimed(&config, "proj-1", payload).await;

    let job = JobHandlerService::process_job(job, config.clone()).await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.failure_kind, Some(FailureKind::ProviderPermanent));
    assert!(!job.is_retryable());
    let site = config.database().get_project_site("proj-1").await.unwrap().unwrap();
    assert_eq!(site.deployment_status, Some(ProjectDeploymentStatus::Failed));
    assert!(site.last_error.unwrap().contains("build exploded"));
}

#[rstest]
#[tokio::test]
async fn deploy_that_never_settles_times_out_as_transient(payload: DeploymentPayload) {
    let hosting = Arc::new(FakeHostingClient::default());
    hosting.script_deploy(vec![DeployStatus::Pending; 1000]);
    let config = TestConfigBuilder::new()
        .configure_hosting_client(hosting.clone())
        .configure_params(|params| params.deployment.deploy_timeout = Duration::from_millis(100))
        .build();
    let job = claimed(&config, "proj-1", payload).await;

    let job = JobHandlerService::process_job(job, config.clone()).await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.failure_kind, Some(FailureKind::ProviderTransient));
    assert!(job.is_retryable());
    // Attempts are left, so the project record keeps its previous state
    let site = config.database().get_project_site("proj-1").await.unwrap().unwrap();
    assert!(site.deployment_status.is_none());
}

#[rstest]
#[case(Fault::Transient, FailureKind::ProviderTransient)]
#[case(Fault::Permanent(403), FailureKind::ProviderPermanent)]
#[tokio::test]
async fn provider_faults_are_classified(
    payload: DeploymentPayload,
    #[case] fault: Fault,
    #[case] expected: FailureKind,
) {
    let (hosting, config) = setup();
    hosting.fail_next("deploy", fault);
    let job = claimed(&config, "proj-1", payload).await;

    let job = JobHandlerService::process_job(job, config).await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.failure_kind, Some(expected));
}

#[rstest]
#[tokio::test]
async fn panicking_handler_is_recorded_as_failure(payload: DeploymentPayload) {
    let (_, config) = setup();
    let job = claimed(&config, "proj-1", payload).await;
    let mut handler = MockJobHandlerTrait::new();
    handler.expect_process_job().times(1).returning(|_, _| panic!("renderer blew up"));

    let job = JobHandlerService::process_job_with(&handler, job, config).await.unwrap();

    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.failure_kind, Some(FailureKind::Validation));
    assert!(job.error_message.unwrap().contains("renderer blew up"));
}

async fn failed_job(config: &Arc<Config>, kind: FailureKind, max_attempts: u32) -> DeploymentJob {
    let job = DeploymentJob::new("proj-1", payload_for(Some("dentist-1"), "wondrousdigital.com"), 0, max_attempts);
    config.database().create_job(job.clone()).await.unwrap();
    config.database().claim_next_job("w").await.unwrap().unwrap();
    config.database().fail_job(&job.id, JobFailure::new(kind, "boom")).await.unwrap()
}

#[rstest]
#[tokio::test]
async fn retry_requeues_transient_failure_immediately() {
    let (_, config) = setup();
    let job = failed_job(&config, FailureKind::ProviderTransient, 3).await;

    let job = JobService::retry_job(config, &job.id).await.unwrap();

    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.attempt_count, 2);
    assert!(job.available_at <= Utc::now());
    assert!(job.deploy_id.is_none());
}

#[rstest]
#[case(FailureKind::Validation, 3)]
#[case(FailureKind::ProviderPermanent, 3)]
#[case(FailureKind::ProviderTransient, 1)]
#[tokio::test]
async fn retry_refuses_permanent_or_exhausted_failures(#[case] kind: FailureKind, #[case] max_attempts: u32) {
    let (_, config) = setup();
    let job = failed_job(&config, kind, max_attempts).await;

    let result = JobService::retry_job(config.clone(), &job.id).await;

    assert_matches!(result, Err(JobError::NotRetryable { status: JobStatus::Failed, .. }));
    assert_eq!(JobService::get_job(config, &job.id).await.unwrap().status, JobStatus::Failed);
}

#[rstest]
#[tokio::test]
async fn retry_refuses_jobs_that_are_not_failed(payload: DeploymentPayload) {
    let (_, config) = setup();
    let job = JobService::enqueue(config.clone(), "proj-1", payload, None).await.unwrap();

    assert_matches!(
        JobService::retry_job(config.clone(), &job.id).await,
        Err(JobError::NotRetryable { status: JobStatus::Queued, .. })
    );
    assert_matches!(JobService::retry_job(config, "missing").await, Err(JobError::JobNotFound { .. }));
}
