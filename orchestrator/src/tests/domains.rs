use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::Utc;
use orchestrator_hosting_client_interface::{AddDomainOutcome, HostingClient, SslState};
use rstest::*;
use tokio_util::sync::CancellationToken;

use crate::core::config::Config;
use crate::error::domain::DomainError;
use crate::tests::common::{FakeHostingClient, Fault};
use crate::tests::config::TestConfigBuilder;
use crate::types::constant::site_name_for_project;
use crate::types::domains::domain_item::ProjectDomain;
use crate::types::domains::types::DomainState;
use crate::worker::domain_service::DomainService;
use crate::worker::domain_verification::DomainVerificationWorker;

fn setup() -> (Arc<FakeHostingClient>, Arc<Config>) {
    let hosting = Arc::new(FakeHostingClient::default());
    let config = TestConfigBuilder::new().configure_hosting_client(hosting.clone()).build();
    (hosting, config)
}

async fn primaries(config: &Arc<Config>, project_id: &str) -> Vec<ProjectDomain> {
    DomainService::list_domains(config.clone(), project_id).await.unwrap().into_iter().filter(|d| d.is_primary).collect()
}

/// Adds domains in order, a little apart so creation order is unambiguous
async fn add_all(config: &Arc<Config>, project_id: &str, domains: &[&str]) -> Vec<ProjectDomain> {
    let mut added = Vec::new();
    for domain in domains {
        added.push(DomainService::add_domain(config.clone(), project_id, domain).await.unwrap());
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    added
}

#[rstest]
#[tokio::test]
async fn first_domain_is_attached_unverified_and_primary() {
    let (hosting, config) = setup();

    let domain = DomainService::add_domain(config.clone(), "proj-1", " Dentist.COM. ").await.unwrap();

    assert_eq!(domain.domain, "dentist.com");
    assert!(domain.is_primary);
    assert!(!domain.verified);
    assert_eq!(domain.state(), DomainState::Unverified);
    assert!(hosting.is_attached(&domain.site_id, "dentist.com"));
    let site = config.database().get_project_site("proj-1").await.unwrap().unwrap();
    assert_eq!(site.site_id.as_deref(), Some(domain.site_id.as_str()));
}

#[rstest]
#[tokio::test]
async fn later_domains_are_not_primary() {
    let (hosting, config) = setup();

    let added = add_all(&config, "proj-1", &["dentist.com", "www.dentist.com"]).await;

    assert!(added[0].is_primary);
    assert!(!added[1].is_primary);
    assert_eq!(added[0].site_id, added[1].site_id);
    assert_eq!(hosting.create_site_calls(), 1);
}

#[rstest]
#[case("not a domain")]
#[case("localhost")]
#[case("")]
#[case("-bad-.com")]
#[tokio::test]
async fn invalid_domains_are_rejected(#[case] domain: &str) {
    let (_, config) = setup();
    assert_matches!(
        DomainService::add_domain(config.clone(), "proj-1", domain).await,
        Err(DomainError::InvalidDomain(_))
    );
    assert!(DomainService::list_domains(config, "proj-1").await.unwrap().is_empty());
}

#[rstest]
#[case("wondrousdigital.com")]
#[case("WWW.WondrousDigital.com.")]
#[tokio::test]
async fn platform_domains_cannot_be_attached(#[case] domain: &str) {
    // No expectations: any provider call would panic
    let config = TestConfigBuilder::new()
        .configure_hosting_client(Arc::new(orchestrator_hosting_client_interface::MockHostingClient::new()))
        .build();
    assert_matches!(
        DomainService::add_domain(config, "proj-1", domain).await,
        Err(DomainError::ReservedDomain(_))
    );
}

#[rstest]
#[tokio::test]
async fn blank_project_is_rejected() {
    let (_, config) = setup();
    assert_matches!(DomainService::add_domain(config, "  ", "dentist.com").await, Err(DomainError::Validation(_)));
}

#[rstest]
#[tokio::test]
async fn domain_of_another_project_is_in_use() {
    let (_, config) = setup();
    DomainService::add_domain(config.clone(), "proj-1", "dentist.com").await.unwrap();

    assert_matches!(
        DomainService::add_domain(config, "proj-2", "DENTIST.com").await,
        Err(DomainError::DomainInUse { domain }) if domain == "dentist.com"
    );
}

#[rstest]
#[tokio::test]
async fn adding_the_same_domain_twice_returns_the_stored_row() {
    let (_, config) = setup();
    let first = DomainService::add_domain(config.clone(), "proj-1", "dentist.com").await.unwrap();

    let second = DomainService::add_domain(config.clone(), "proj-1", "dentist.com").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(DomainService::list_domains(config, "proj-1").await.unwrap().len(), 1);
}

#[rstest]
#[tokio::test]
async fn domain_already_on_the_site_is_stored_unverified() {
    let (hosting, config) = setup();
    let site_id = hosting.create_site(&site_name_for_project("proj-1")).await.unwrap();
    hosting.add_domain(&site_id, "dentist.com").await.unwrap();
    assert_eq!(hosting.add_domain(&site_id, "dentist.com").await.unwrap(), AddDomainOutcome::AlreadyExists);

    let domain = DomainService::add_domain(config.clone(), "proj-1", "dentist.com").await.unwrap();

    assert_eq!(domain.site_id, site_id);
    assert_eq!(domain.state(), DomainState::Unverified);
    assert!(domain.is_primary);
    assert!(domain.next_check_at <= Utc::now());
    assert!(hosting.is_attached(&site_id, "dentist.com"));
    assert_eq!(DomainService::list_domains(config, "proj-1").await.unwrap().len(), 1);
}

#[rstest]
#[tokio::test]
async fn provider_failure_stores_nothing() {
    let (hosting, config) = setup();
    hosting.fail_next("add_domain", Fault::Permanent(403));

    assert_matches!(
        DomainService::add_domain(config.clone(), "proj-1", "dentist.com").await,
        Err(DomainError::ProviderError(_))
    );
    assert!(DomainService::list_domains(config, "proj-1").await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn set_primary_switches_the_primary() {
    let (_, config) = setup();
    let added = add_all(&config, "proj-1", &["dentist.com", "www.dentist.com", "smile.com"]).await;

    let primary = DomainService::set_primary(config.clone(), "proj-1", &added[2].id).await.unwrap();

    assert!(primary.is_primary);
    let primaries = primaries(&config, "proj-1").await;
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].id, added[2].id);
}

#[rstest]
#[tokio::test]
async fn set_primary_on_the_primary_is_a_no_op() {
    let (_, config) = setup();
    let added = add_all(&config, "proj-1", &["dentist.com"]).await;

    let primary = DomainService::set_primary(config, "proj-1", &added[0].id).await.unwrap();

    assert_eq!(primary, added[0]);
}

#[rstest]
#[tokio::test]
async fn set_primary_checks_ownership() {
    let (_, config) = setup();
    let added = add_all(&config, "proj-1", &["dentist.com"]).await;

    assert_matches!(
        DomainService::set_primary(config.clone(), "proj-2", &added[0].id).await,
        Err(DomainError::WrongProject { .. })
    );
    assert_matches!(
        DomainService::set_primary(config, "proj-1", "missing").await,
        Err(DomainError::DomainNotFound { .. })
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_switches_leave_exactly_one_primary() {
    let (_, config) = setup();
    let added = add_all(&config, "proj-1", &["a.dentist.com", "b.dentist.com", "c.dentist.com", "d.dentist.com"]).await;

    let mut handles = Vec::new();
    for _ in 0..3 {
        for domain in &added {
            let config = config.clone();
            let id = domain.id.clone();
            handles.push(tokio::spawn(async move { DomainService::set_primary(config, "proj-1", &id).await }));
        }
    }
    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(result, Ok(_) | Err(DomainError::PrimaryConflict { .. })), "unexpected {:?}", result);
    }

    assert_eq!(primaries(&config, "proj-1").await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn removing_the_primary_promotes_the_oldest_remaining() {
    let (hosting, config) = setup();
    let added = add_all(&config, "proj-1", &["dentist.com", "www.dentist.com", "smile.com"]).await;

    let removed = DomainService::remove_domain(config.clone(), "proj-1", &added[0].id).await.unwrap();

    assert_eq!(removed.id, added[0].id);
    assert_eq!(hosting.removed_domains(), vec!["dentist.com".to_string()]);
    assert!(!hosting.is_attached(&removed.site_id, "dentist.com"));
    let primaries = primaries(&config, "proj-1").await;
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].id, added[1].id);
}

#[rstest]
#[tokio::test]
async fn removing_a_secondary_keeps_the_primary() {
    let (_, config) = setup();
    let added = add_all(&config, "proj-1", &["dentist.com", "www.dentist.com"]).await;

    DomainService::remove_domain(config.clone(), "proj-1", &added[1].id).await.unwrap();

    let remaining = DomainService::list_domains(config.clone(), "proj-1").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].is_primary);
    assert_matches!(
        DomainService::remove_domain(config, "proj-1", &added[1].id).await,
        Err(DomainError::DomainNotFound { .. })
    );
}

#[rstest]
#[tokio::test]
async fn removing_the_last_domain_leaves_no_primary() {
    let (_, config) = setup();
    let added = add_all(&config, "proj-1", &["dentist.com"]).await;

    DomainService::remove_domain(config.clone(), "proj-1", &added[0].id).await.unwrap();

    assert!(DomainService::list_domains(config, "proj-1").await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn checks_walk_the_domain_to_live_keeping_verified_at() {
    let (hosting, config) = setup();
    let domain = add_all(&config, "proj-1", &["dentist.com"]).await.remove(0);

    let unverified = DomainService::reverify(config.clone(), "proj-1", &domain.id).await.unwrap();
    assert_eq!(unverified.state(), DomainState::Unverified);
    assert_eq!(unverified.verification_details.reasons, vec!["DNS records not found".to_string()]);
    assert!(unverified.last_checked_at.is_some());
    assert!(unverified.next_check_at > Utc::now() - chrono::Duration::seconds(1));

    hosting.set_domain_status("dentist.com", true, SslState::Initializing);
    let pending = DomainService::reverify(config.clone(), "proj-1", &domain.id).await.unwrap();
    assert_eq!(pending.state(), DomainState::VerifiedSslPending);
    let verified_at = pending.verified_at.unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    hosting.set_domain_status("dentist.com", true, SslState::Ready);
    let live = DomainService::reverify(config, "proj-1", &domain.id).await.unwrap();
    assert_eq!(live.state(), DomainState::Live);
    assert_eq!(live.verified_at, Some(verified_at));
    assert!(!live.needs_polling());
}

#[rstest]
#[tokio::test]
async fn provider_error_during_a_check_is_recorded() {
    let (hosting, config) = setup();
    let domain = add_all(&config, "proj-1", &["dentist.com"]).await.remove(0);
    hosting.fail_next("get_domain_status", Fault::Transient);

    let checked = DomainService::reverify(config, "proj-1", &domain.id).await.unwrap();

    assert!(!checked.verified);
    assert_eq!(checked.ssl_state, SslState::Pending);
    assert_eq!(checked.verification_details.reasons.len(), 1);
    assert!(checked.verification_details.reasons[0].starts_with("provider error"));
}

#[rstest]
#[tokio::test]
async fn polling_round_checks_due_domains_and_leases_them() {
    let (hosting, config) = setup();
    add_all(&config, "proj-1", &["dentist.com", "smile.com"]).await;
    hosting.set_domain_status("smile.com", true, SslState::Ready);
    let worker = DomainVerificationWorker::new(config.clone(), CancellationToken::new());

    assert_eq!(worker.run_once().await.unwrap(), 2);
    // Both are leased until their next check
    assert_eq!(worker.run_once().await.unwrap(), 0);

    let domains = DomainService::list_domains(config, "proj-1").await.unwrap();
    let state_of = |name: &str| domains.iter().find(|d| d.domain == name).map(ProjectDomain::state);
    assert_eq!(state_of("dentist.com"), Some(DomainState::Unverified));
    assert_eq!(state_of("smile.com"), Some(DomainState::Live));
}

#[rstest]
#[tokio::test]
async fn live_domains_are_not_polled_again() {
    let (hosting, config) = setup();
    add_all(&config, "proj-1", &["dentist.com"]).await;
    hosting.set_domain_status("dentist.com", true, SslState::Ready);
    let worker = DomainVerificationWorker::new(config.clone(), CancellationToken::new());
    assert_eq!(worker.run_once().await.unwrap(), 1);

    // Past the check interval
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(worker.run_once().await.unwrap(), 0);
}

#[rstest]
#[tokio::test]
async fn expired_domains_go_stale_until_a_manual_check_verifies_them() {
    let hosting = Arc::new(FakeHostingClient::default());
    let config = TestConfigBuilder::new()
        .configure_hosting_client(hosting.clone())
        .configure_params(|params| params.verification.verification_lifetime = chrono::Duration::zero())
        .build();
    let domain = add_all(&config, "proj-1", &["dentist.com"]).await.remove(0);
    let worker = DomainVerificationWorker::new(config.clone(), CancellationToken::new());

    assert_eq!(worker.run_once().await.unwrap(), 0);
    let stale = config.database().get_domain_by_id(&domain.id).await.unwrap().unwrap();
    assert!(stale.stale);
    assert!(!stale.needs_polling());

    // Still unverified: the flag stays
    let checked = DomainService::reverify(config.clone(), "proj-1", &domain.id).await.unwrap();
    assert!(checked.stale);

    hosting.set_domain_status("dentist.com", true, SslState::Ready);
    let live = DomainService::reverify(config, "proj-1", &domain.id).await.unwrap();
    assert!(!live.stale);
    assert_eq!(live.state(), DomainState::Live);
}

#[rstest]
#[tokio::test]
async fn ssl_error_keeps_polling_until_live() {
    let hosting = Arc::new(FakeHostingClient::default());
    let config = TestConfigBuilder::new()
        .configure_hosting_client(hosting.clone())
        .configure_params(|params| params.verification.check_interval = Duration::ZERO)
        .build();
    let domain = add_all(&config, "proj-1", &["dentist.com"]).await.remove(0);
    let worker = DomainVerificationWorker::new(config.clone(), CancellationToken::new());

    hosting.set_domain_status("dentist.com", true, SslState::Error);
    assert_eq!(worker.run_once().await.unwrap(), 1);
    let errored = config.database().get_domain_by_id(&domain.id).await.unwrap().unwrap();
    assert_eq!(errored.state(), DomainState::SslError);
    assert!(errored.needs_polling());

    tokio::time::sleep(Duration::from_millis(5)).await;
    hosting.set_domain_status("dentist.com", true, SslState::Ready);
    assert_eq!(worker.run_once().await.unwrap(), 1);
    let live = config.database().get_domain_by_id(&domain.id).await.unwrap().unwrap();
    assert_eq!(live.state(), DomainState::Live);
    assert_eq!(live.verified_at, errored.verified_at);

    assert_eq!(worker.run_once().await.unwrap(), 0);
}
