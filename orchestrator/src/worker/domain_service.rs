use std::sync::Arc;

use orchestrator_hosting_client_interface::AddDomainOutcome;
use tracing::{debug, info, warn};

use crate::core::client::database::constant::MAX_CONFLICT_RETRIES;
use crate::core::client::database::DatabaseError;
use crate::core::config::Config;
use crate::error::domain::{DomainError, DomainResult};
use crate::types::domains::domain_item::ProjectDomain;
use crate::types::hostname::{is_reserved_host, is_valid_fqdn, normalize_host};
use crate::worker::domain_verification::check_domain;
use crate::worker::utils::resolve_project_site;

/// Custom domain management and the primary-domain coordinator.
pub struct DomainService;

impl DomainService {
    /// Attaches a custom domain to the project's hosted site and stores it UNVERIFIED.
    ///
    /// Adding a domain the project already owns returns the stored row. The first domain of a
    /// project becomes its primary.
    pub async fn add_domain(config: Arc<Config>, project_id: &str, domain: &str) -> DomainResult<ProjectDomain> {
        let project_id = Self::require_project(project_id)?;
        let host = normalize_host(domain);
        if !is_valid_fqdn(&host) {
            return Err(DomainError::InvalidDomain(domain.trim().to_string()));
        }
        if is_reserved_host(&host, &config.deployment_params().reserved_domains) {
            return Err(DomainError::ReservedDomain(host));
        }

        if let Some(existing) = config.database().get_domain_by_name(&host).await? {
            return Self::owned_by(existing, project_id);
        }

        let site_id = resolve_project_site::<DomainError>(&config, project_id).await?;
        match config.hosting_client().add_domain(&site_id, &host).await? {
            AddDomainOutcome::Added => info!(domain = %host, site_id = %site_id, "Domain attached to hosted site"),
            AddDomainOutcome::AlreadyExists => debug!(domain = %host, "Domain already attached to hosted site"),
        }

        let is_primary = config.database().get_domains_by_project(project_id).await?.is_empty();
        let stored = match config.database().create_domain(ProjectDomain::new(project_id, &host, &site_id, is_primary)).await
        {
            Ok(stored) => stored,
            Err(DatabaseError::DuplicateKey(reason)) => {
                debug!(domain = %host, reason = %reason, "Domain insert raced");
                match config.database().get_domain_by_name(&host).await? {
                    Some(existing) => return Self::owned_by(existing, project_id),
                    // Another first domain took the primary slot meanwhile
                    None => {
                        config.database().create_domain(ProjectDomain::new(project_id, &host, &site_id, false)).await?
                    }
                }
            }
            Err(e) => return Err(e.into()),
        };

        info!(domain_id = %stored.id, domain = %stored.domain, is_primary = stored.is_primary, "Domain added");
        Ok(stored)
    }

    /// Detaches the domain from the provider and deletes it. Removing the primary promotes the
    /// oldest remaining domain.
    pub async fn remove_domain(config: Arc<Config>, project_id: &str, domain_id: &str) -> DomainResult<ProjectDomain> {
        let domain = Self::project_domain(&config, project_id, domain_id).await?;

        config.hosting_client().remove_domain(&domain.site_id, &domain.domain).await?;
        if !config.database().delete_domain(&domain.id).await? {
            debug!(domain_id = %domain.id, "Domain row already deleted");
        }
        info!(domain_id = %domain.id, domain = %domain.domain, "Domain removed");

        if domain.is_primary {
            let remaining = config.database().get_domains_by_project(&domain.project_id).await?;
            if let Some(next) = remaining.first() {
                let promoted = Self::set_primary(config.clone(), &domain.project_id, &next.id).await?;
                info!(domain_id = %promoted.id, domain = %promoted.domain, "Promoted oldest domain to primary");
            }
        }
        Ok(domain)
    }

    /// Makes `domain_id` the project's only primary domain.
    ///
    /// Clears the other primaries first and then sets this one. Losing the second step to a
    /// concurrent switch repeats the sequence, a bounded number of times.
    pub async fn set_primary(config: Arc<Config>, project_id: &str, domain_id: &str) -> DomainResult<ProjectDomain> {
        let domain = Self::project_domain(&config, project_id, domain_id).await?;
        if domain.is_primary {
            debug!(domain_id = %domain.id, "Domain already primary");
            return Ok(domain);
        }

        let mut last_conflict = String::new();
        for attempt in 1..=MAX_CONFLICT_RETRIES {
            let cleared = config.database().unset_other_primaries(&domain.project_id, &domain.id).await?;
            match config.database().set_domain_primary(&domain.id).await {
                Ok(primary) => {
                    info!(domain_id = %primary.id, domain = %primary.domain, cleared, "Primary domain set");
                    return Ok(primary);
                }
                Err(DatabaseError::DuplicateKey(reason)) => {
                    warn!(domain_id = %domain.id, attempt, reason = %reason, "Primary switch lost a race, repeating");
                    last_conflict = reason;
                }
                Err(DatabaseError::ItemNotFound(_)) => {
                    return Err(DomainError::DomainNotFound { id: domain.id });
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::PrimaryConflict { id: domain.id, reason: last_conflict })
    }

    /// Domains of a project, oldest first
    pub async fn list_domains(config: Arc<Config>, project_id: &str) -> DomainResult<Vec<ProjectDomain>> {
        let project_id = Self::require_project(project_id)?;
        Ok(config.database().get_domains_by_project(project_id).await?)
    }

    /// Runs a verification check right away, stale domains included.
    pub async fn reverify(config: Arc<Config>, project_id: &str, domain_id: &str) -> DomainResult<ProjectDomain> {
        let domain = Self::project_domain(&config, project_id, domain_id).await?;
        check_domain(&config, &domain).await
    }

    fn require_project(project_id: &str) -> DomainResult<&str> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(DomainError::Validation("project_id is required".to_string()));
        }
        Ok(project_id)
    }

    fn owned_by(existing: ProjectDomain, project_id: &str) -> DomainResult<ProjectDomain> {
        if existing.project_id == project_id {
            debug!(domain_id = %existing.id, "Domain already added to this project");
            Ok(existing)
        } else {
            Err(DomainError::DomainInUse { domain: existing.domain })
        }
    }

    async fn project_domain(config: &Config, project_id: &str, domain_id: &str) -> DomainResult<ProjectDomain> {
        let project_id = Self::require_project(project_id)?;
        let domain = config
            .database()
            .get_domain_by_id(domain_id)
            .await?
            .ok_or_else(|| DomainError::DomainNotFound { id: domain_id.to_string() })?;
        if domain.project_id != project_id {
            return Err(DomainError::WrongProject { id: domain.id, project_id: project_id.to_string() });
        }
        Ok(domain)
    }
}
