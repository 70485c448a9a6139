use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use orchestrator_hosting_client_interface::{
    AddDomainOutcome, DeployStatus, DomainStatus, HostingClient, HostingClientError, SiteArtifact, SslState,
    VerificationDetails,
};
use rstest::*;

use crate::types::jobs::payload::{DeploymentPayload, Section, SiteContent};

pub fn sample_content() -> SiteContent {
    SiteContent {
        title: Some("Bright Smile Dental".to_string()),
        sections: vec![Section {
            id: "hero".to_string(),
            kind: "hero".to_string(),
            heading: Some("Welcome <friends>".to_string()),
            body: Some("Family dentistry since 1998".to_string()),
            items: vec![],
        }],
        ..SiteContent::default()
    }
}

/// A subdomain deployment under the platform domain
#[fixture]
pub fn payload() -> DeploymentPayload {
    payload_for(Some("dentist-1"), "wondrousdigital.com")
}

/// Payload deploying straight to `domain`
pub fn payload_for(subdomain: Option<&str>, domain: &str) -> DeploymentPayload {
    DeploymentPayload {
        subdomain: subdomain.map(str::to_string),
        deployment_domain: domain.to_string(),
        content: sample_content(),
    }
}

/// Failure injected into the next call of one [`FakeHostingClient`] operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Transient,
    Permanent(u16),
}

impl Fault {
    fn into_error(self, operation: &str) -> HostingClientError {
        match self {
            Fault::Transient => HostingClientError::transient(operation, "503 Service Unavailable"),
            Fault::Permanent(status) => HostingClientError::permanent(operation, Some(status), "rejected"),
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    sites: HashMap<String, String>,
    create_site_calls: usize,
    deploys: Vec<(String, SiteArtifact)>,
    deploy_statuses: VecDeque<DeployStatus>,
    attached: HashSet<(String, String)>,
    removed: Vec<(String, String)>,
    domain_statuses: HashMap<String, DomainStatus>,
    faults: HashMap<&'static str, VecDeque<Fault>>,
}

/// In-process provider with the idempotency rules of the real one.
///
/// Deploys report READY unless statuses are scripted with [`FakeHostingClient::script_deploy`].
/// Domains report unverified until [`FakeHostingClient::set_domain_status`] says otherwise.
#[derive(Debug, Default)]
pub struct FakeHostingClient {
    state: Mutex<FakeState>,
}

impl FakeHostingClient {
    pub fn script_deploy(&self, statuses: Vec<DeployStatus>) {
        self.state.lock().unwrap().deploy_statuses = statuses.into();
    }

    pub fn set_domain_status(&self, domain: &str, verified: bool, ssl_state: SslState) {
        let status = DomainStatus { verified, ssl_state, verification_details: VerificationDetails::default() };
        self.state.lock().unwrap().domain_statuses.insert(domain.to_string(), status);
    }

    pub fn fail_next(&self, operation: &'static str, fault: Fault) {
        self.state.lock().unwrap().faults.entry(operation).or_default().push_back(fault);
    }

    pub fn create_site_calls(&self) -> usize {
        self.state.lock().unwrap().create_site_calls
    }

    pub fn deploy_count(&self) -> usize {
        self.state.lock().unwrap().deploys.len()
    }

    pub fn last_artifact(&self) -> Option<SiteArtifact> {
        self.state.lock().unwrap().deploys.last().map(|(_, artifact)| artifact.clone())
    }

    pub fn is_attached(&self, site_id: &str, domain: &str) -> bool {
        self.state.lock().unwrap().attached.contains(&(site_id.to_string(), domain.to_string()))
    }

    pub fn removed_domains(&self) -> Vec<String> {
        self.state.lock().unwrap().removed.iter().map(|(_, domain)| domain.clone()).collect()
    }

    fn take_fault(&self, operation: &'static str) -> Result<(), HostingClientError> {
        let mut state = self.state.lock().unwrap();
        match state.faults.get_mut(operation).and_then(|faults| faults.pop_front()) {
            Some(fault) => Err(fault.into_error(operation)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HostingClient for FakeHostingClient {
    async fn create_site(&self, name: &str) -> Result<String, HostingClientError> {
        self.take_fault("create_site")?;
        let mut state = self.state.lock().unwrap();
        state.create_site_calls += 1;
        let next_id = format!("prj_{}", state.sites.len() + 1);
        Ok(state.sites.entry(name.to_string()).or_insert(next_id).clone())
    }

    async fn deploy(&self, site_id: &str, artifact: &SiteArtifact) -> Result<String, HostingClientError> {
        self.take_fault("deploy")?;
        let mut state = self.state.lock().unwrap();
        state.deploys.push((site_id.to_string(), artifact.clone()));
        Ok(format!("dpl_{}", state.deploys.len()))
    }

    async fn get_deploy_status(&self, _site_id: &str, _deploy_id: &str) -> Result<DeployStatus, HostingClientError> {
        self.take_fault("get_deploy_status")?;
        Ok(self.state.lock().unwrap().deploy_statuses.pop_front().unwrap_or(DeployStatus::Ready))
    }

    async fn add_domain(&self, site_id: &str, domain: &str) -> Result<AddDomainOutcome, HostingClientError> {
        self.take_fault("add_domain")?;
        let mut state = self.state.lock().unwrap();
        if state.attached.insert((site_id.to_string(), domain.to_string())) {
            Ok(AddDomainOutcome::Added)
        } else {
            Ok(AddDomainOutcome::AlreadyExists)
        }
    }

    async fn remove_domain(&self, site_id: &str, domain: &str) -> Result<(), HostingClientError> {
        self.take_fault("remove_domain")?;
        let mut state = self.state.lock().unwrap();
        state.attached.remove(&(site_id.to_string(), domain.to_string()));
        state.removed.push((site_id.to_string(), domain.to_string()));
        Ok(())
    }

    async fn get_domain_status(&self, _site_id: &str, domain: &str) -> Result<DomainStatus, HostingClientError> {
        self.take_fault("get_domain_status")?;
        Ok(self.state.lock().unwrap().domain_statuses.get(domain).cloned().unwrap_or(DomainStatus {
            verified: false,
            ssl_state: SslState::Pending,
            verification_details: VerificationDetails {
                reasons: vec!["DNS records not found".to_string()],
                ..VerificationDetails::default()
            },
        }))
    }
}
