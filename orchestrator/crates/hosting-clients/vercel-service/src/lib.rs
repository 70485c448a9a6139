pub mod client;
pub mod constants;
pub mod error;
pub mod types;

use async_trait::async_trait;
use base64::Engine as _;
use orchestrator_hosting_client_interface::{
    AddDomainOutcome, DeployStatus, DnsRecord, DomainStatus, HostingClient, HostingClientError, SiteArtifact,
    SslState, VerificationDetails,
};
use reqwest::StatusCode;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::VercelClient;
use crate::constants::{APEX_A_RECORD_VALUE, DEPLOYMENT_TARGET, DOMAIN_IN_USE_CODE, SUBDOMAIN_CNAME_VALUE};
use crate::error::VercelError;
use crate::types::{VercelDeploymentFile, VercelDomainConfig, VercelProjectDomain, VercelReadyState};

#[derive(Debug, Clone)]
pub struct VercelValidatedArgs {
    pub vercel_api_token: String,
    pub vercel_api_url: Url,
    pub vercel_team_id: Option<String>,
    pub vercel_request_timeout_secs: u64,
}

/// Hosting client backed by the Vercel REST API. A "site" is a Vercel project.
pub struct VercelHostingService {
    pub vercel_client: VercelClient,
}

impl VercelHostingService {
    pub fn new_with_args(args: &VercelValidatedArgs) -> Result<Self, VercelError> {
        Ok(Self { vercel_client: VercelClient::new_with_args(args)? })
    }
}

#[async_trait]
impl HostingClient for VercelHostingService {
    #[tracing::instrument(skip(self))]
    async fn create_site(&self, name: &str) -> Result<String, HostingClientError> {
        if let Some(project) = self.vercel_client.get_project(name).await? {
            debug!(site_id = %project.id, "Reusing existing site");
            return Ok(project.id);
        }

        match self.vercel_client.create_project(name).await {
            Ok(project) => {
                info!(site_id = %project.id, "Created site");
                Ok(project.id)
            }
            // Someone else created it between our lookup and create
            Err(e) if e.status() == Some(StatusCode::CONFLICT) => {
                let project = self.vercel_client.get_project(name).await?.ok_or_else(|| {
                    HostingClientError::invalid_response("create_site", "site reported as existing but not found")
                })?;
                Ok(project.id)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self, artifact), fields(file_count = artifact.files.len()))]
    async fn deploy(&self, site_id: &str, artifact: &SiteArtifact) -> Result<String, HostingClientError> {
        let files = artifact
            .files
            .iter()
            .map(|f| VercelDeploymentFile {
                file: f.path.clone(),
                data: base64::engine::general_purpose::STANDARD.encode(&f.content),
                encoding: "base64",
            })
            .collect();

        let deployment = self.vercel_client.create_deployment(site_id, files, DEPLOYMENT_TARGET).await?;
        info!(deploy_id = %deployment.id, "Deploy submitted");
        Ok(deployment.id)
    }

    async fn get_deploy_status(&self, _site_id: &str, deploy_id: &str) -> Result<DeployStatus, HostingClientError> {
        let deployment = self.vercel_client.get_deployment(deploy_id).await?;
        Ok(match deployment.ready_state {
            VercelReadyState::Queued | VercelReadyState::Building | VercelReadyState::Initializing => {
                DeployStatus::Pending
            }
            VercelReadyState::Ready => DeployStatus::Ready,
            VercelReadyState::Error => {
                DeployStatus::Error(deployment.error_message.unwrap_or_else(|| "deploy failed".to_string()))
            }
            VercelReadyState::Canceled => DeployStatus::Error("deploy was canceled".to_string()),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn add_domain(&self, site_id: &str, domain: &str) -> Result<AddDomainOutcome, HostingClientError> {
        match self.vercel_client.add_project_domain(site_id, domain).await {
            Ok(_) => Ok(AddDomainOutcome::Added),
            Err(e) if matches!(e.status(), Some(StatusCode::CONFLICT) | Some(StatusCode::BAD_REQUEST)) => {
                // The provider answers a repeated add with a conflict. Only treat it as success when
                // the domain really sits on this site.
                if self.vercel_client.get_project_domain(site_id, domain).await?.is_some() {
                    debug!("Domain already attached to site");
                    return Ok(AddDomainOutcome::AlreadyExists);
                }
                let message = if e.code() == Some(DOMAIN_IN_USE_CODE) {
                    format!("domain {} is already in use by another site", domain)
                } else {
                    e.to_string()
                };
                warn!(error = %e, error_type = e.error_type(), "Provider refused domain");
                Err(HostingClientError::permanent("add_domain", e.status().map(|s| s.as_u16()), message))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn remove_domain(&self, site_id: &str, domain: &str) -> Result<(), HostingClientError> {
        if !self.vercel_client.remove_project_domain(site_id, domain).await? {
            debug!("Domain was not attached, nothing to remove");
        }
        Ok(())
    }

    async fn get_domain_status(&self, site_id: &str, domain: &str) -> Result<DomainStatus, HostingClientError> {
        let project_domain = self.vercel_client.get_project_domain(site_id, domain).await?.ok_or_else(|| {
            HostingClientError::permanent("get_domain_status", Some(404), format!("domain {} is not attached", domain))
        })?;
        let config = self.vercel_client.get_domain_config(domain).await?;
        Ok(merge_domain_status(domain, &project_domain, &config))
    }
}

/// Folds the verification endpoint and the DNS configuration endpoint into one status.
///
/// The provider has no explicit certificate state; it issues a certificate once the domain is
/// verified and DNS points at it, so readiness is derived from the configuration answer.
pub fn merge_domain_status(
    domain: &str,
    project_domain: &VercelProjectDomain,
    config: &VercelDomainConfig,
) -> DomainStatus {
    let mut details = VerificationDetails { misconfigured: config.misconfigured, ..Default::default() };

    for challenge in &project_domain.verification {
        details.expected_records.push(DnsRecord {
            record_type: challenge.record_type.clone(),
            name: challenge.domain.clone(),
            value: challenge.value.clone(),
        });
        if let Some(reason) = &challenge.reason {
            details.reasons.push(reason.clone());
        }
    }

    if config.misconfigured {
        details.expected_records.push(expected_routing_record(domain));
        details.reasons.push(format!("DNS for {} does not point at the hosting provider", domain));
    }

    if let Some(configured_by) = &config.configured_by {
        details.observed_records.push(DnsRecord {
            record_type: configured_by.clone(),
            name: domain.to_string(),
            value: String::new(),
        });
    }

    if !config.conflicts.is_empty() {
        details.reasons.push(format!("{} conflicting DNS record(s) found", config.conflicts.len()));
    }

    let ssl_state = if !project_domain.verified || config.misconfigured {
        SslState::Pending
    } else if !config.conflicts.is_empty() {
        SslState::Error
    } else if config.accepted_challenges.is_empty() {
        SslState::Initializing
    } else {
        SslState::Ready
    };

    DomainStatus { verified: project_domain.verified, ssl_state, verification_details: details }
}

fn expected_routing_record(domain: &str) -> DnsRecord {
    if domain.split('.').count() <= 2 {
        DnsRecord { record_type: "A".to_string(), name: domain.to_string(), value: APEX_A_RECORD_VALUE.to_string() }
    } else {
        DnsRecord {
            record_type: "CNAME".to_string(),
            name: domain.to_string(),
            value: SUBDOMAIN_CNAME_VALUE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VercelVerificationChallenge;
    use rstest::rstest;

    fn project_domain(verified: bool) -> VercelProjectDomain {
        VercelProjectDomain {
            name: "www.dentist.com".to_string(),
            verified,
            verification: if verified {
                vec![]
            } else {
                vec![VercelVerificationChallenge {
                    record_type: "TXT".to_string(),
                    domain: "_vercel.dentist.com".to_string(),
                    value: "vc-domain-verify=www.dentist.com,abc".to_string(),
                    reason: Some("pending_domain_verification".to_string()),
                }]
            },
        }
    }

    fn config(misconfigured: bool, challenges: &[&str], conflicts: usize) -> VercelDomainConfig {
        VercelDomainConfig {
            misconfigured,
            configured_by: if misconfigured { None } else { Some("CNAME".to_string()) },
            accepted_challenges: challenges.iter().map(|c| c.to_string()).collect(),
            conflicts: (0..conflicts).map(|_| serde_json::json!({ "type": "A" })).collect(),
        }
    }

    #[rstest]
    #[case(false, config(true, &[], 0), SslState::Pending)]
    #[case(true, config(true, &[], 0), SslState::Pending)]
    #[case(true, config(false, &[], 0), SslState::Initializing)]
    #[case(true, config(false, &["http-01"], 0), SslState::Ready)]
    #[case(true, config(false, &["http-01"], 1), SslState::Error)]
    fn merges_verification_and_configuration(
        #[case] verified: bool,
        #[case] config: VercelDomainConfig,
        #[case] expected: SslState,
    ) {
        let status = merge_domain_status("www.dentist.com", &project_domain(verified), &config);
        assert_eq!(status.verified, verified);
        assert_eq!(status.ssl_state, expected);
    }

    #[test]
    fn unverified_domain_lists_expected_records_and_reasons() {
        let status = merge_domain_status("www.dentist.com", &project_domain(false), &config(true, &[], 0));
        let details = status.verification_details;
        assert!(details.misconfigured);
        assert_eq!(details.expected_records.len(), 2);
        assert_eq!(details.expected_records[0].record_type, "TXT");
        assert_eq!(details.expected_records[1].record_type, "CNAME");
        assert!(details.reasons.iter().any(|r| r == "pending_domain_verification"));
        assert!(details.observed_records.is_empty());
    }

    #[test]
    fn apex_domains_expect_an_a_record() {
        assert_eq!(expected_routing_record("dentist.com").record_type, "A");
        assert_eq!(expected_routing_record("www.dentist.com").record_type, "CNAME");
    }
}
