//! In-memory store for development and tests.
//!
//! Implements the same contracts as the MongoDB repositories. The unique indexes are emulated by
//! checking and writing under one write lock per collection. Data is lost when the process exits,
//! and the store cannot be shared between processes.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::DatabaseError;
use super::repository::{DomainRepository, JobRepository, ProjectRepository};
use crate::types::domains::domain_item::ProjectDomain;
use crate::types::domains::types::DomainStatusUpdate;
use crate::types::jobs::job_item::DeploymentJob;
use crate::types::jobs::types::{DeploymentResult, JobFailure, JobStatus};
use crate::types::projects::{ProjectDeploymentStatus, ProjectSite};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    jobs: RwLock<HashMap<String, DeploymentJob>>,
    domains: RwLock<HashMap<String, ProjectDomain>>,
    sites: RwLock<HashMap<String, ProjectSite>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, DatabaseError> {
    lock.read().map_err(|_| DatabaseError::Unavailable("lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, DatabaseError> {
    lock.write().map_err(|_| DatabaseError::Unavailable("lock poisoned".to_string()))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to a job that passes `check`, otherwise report a state conflict.
    fn transition_job<C, F>(&self, id: &str, expected: &str, check: C, f: F) -> Result<DeploymentJob, DatabaseError>
    where
        C: Fn(&DeploymentJob) -> bool,
        F: FnOnce(&mut DeploymentJob),
    {
        let mut jobs = write(&self.jobs)?;
        let job = jobs.get_mut(id).ok_or_else(|| DatabaseError::ItemNotFound(format!("job {}", id)))?;
        if !check(job) {
            return Err(DatabaseError::StateConflict(format!(
                "job {} is {} (attempt {}/{}), expected {}",
                id, job.status, job.attempt_count, job.max_attempts, expected
            )));
        }
        f(job);
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    fn is_processing(job: &DeploymentJob) -> bool {
        job.status == JobStatus::Processing
    }
}

#[async_trait]
impl JobRepository for InMemoryStore {
    async fn create_job(&self, job: DeploymentJob) -> Result<DeploymentJob, DatabaseError> {
        let mut jobs = write(&self.jobs)?;
        if jobs.contains_key(&job.id) {
            return Err(DatabaseError::DuplicateKey(format!("job {} already exists", job.id)));
        }
        jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    async fn get_job_by_id(&self, id: &str) -> Result<Option<DeploymentJob>, DatabaseError> {
        Ok(read(&self.jobs)?.get(id).cloned())
    }

    async fn get_jobs_by_project(&self, project_id: &str, limit: i64) -> Result<Vec<DeploymentJob>, DatabaseError> {
        let jobs = read(&self.jobs)?;
        let mut results: Vec<_> = jobs.values().filter(|j| j.project_id == project_id).cloned().collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(results)
    }

    async fn claim_next_job(&self, worker_id: &str) -> Result<Option<DeploymentJob>, DatabaseError> {
        let mut jobs = write(&self.jobs)?;
        let now = Utc::now();

        let busy: HashSet<&str> =
            jobs.values().filter(|j| j.status == JobStatus::Processing).map(|j| j.project_id.as_str()).collect();

        let next_id = jobs
            .values()
            .filter(|j| j.status == JobStatus::Queued && j.available_at <= now && !busy.contains(j.project_id.as_str()))
            .min_by(|a, b| b.priority.cmp(&a.priority).then(a.created_at.cmp(&b.created_at)))
            .map(|j| j.id.clone());

        let Some(id) = next_id else {
            return Ok(None);
        };
        let Some(job) = jobs.get_mut(&id) else {
            return Ok(None);
        };
        job.status = JobStatus::Processing;
        job.claimed_by = Some(worker_id.to_string());
        job.started_at = Some(now);
        job.updated_at = now;
        Ok(Some(job.clone()))
    }

    async fn set_job_deploy_id(&self, id: &str, deploy_id: &str) -> Result<DeploymentJob, DatabaseError> {
        self.transition_job(id, "PROCESSING", Self::is_processing, |job| {
            job.deploy_id = Some(deploy_id.to_string());
        })
    }

    async fn complete_job(&self, id: &str, result: DeploymentResult) -> Result<DeploymentJob, DatabaseError> {
        self.transition_job(id, "PROCESSING", Self::is_processing, |job| {
            job.status = JobStatus::Completed;
            job.result = Some(result);
            job.error_message = None;
            job.failure_kind = None;
            job.claimed_by = None;
            job.completed_at = Some(Utc::now());
        })
    }

    async fn fail_job(&self, id: &str, failure: JobFailure) -> Result<DeploymentJob, DatabaseError> {
        self.transition_job(id, "PROCESSING", Self::is_processing, |job| {
            job.status = JobStatus::Failed;
            job.error_message = Some(failure.message);
            job.failure_kind = Some(failure.kind);
            job.claimed_by = None;
            job.completed_at = Some(Utc::now());
        })
    }

    async fn requeue_job(&self, id: &str, available_at: DateTime<Utc>) -> Result<DeploymentJob, DatabaseError> {
        self.transition_job(
            id,
            "FAILED with attempts left",
            |job| job.status == JobStatus::Failed && job.has_attempts_left(),
            |job| {
                job.status = JobStatus::Queued;
                job.attempt_count += 1;
                job.available_at = available_at;
                job.deploy_id = None;
                job.started_at = None;
                job.completed_at = None;
            },
        )
    }

    async fn get_retryable_jobs(&self, limit: i64) -> Result<Vec<DeploymentJob>, DatabaseError> {
        let jobs = read(&self.jobs)?;
        let mut results: Vec<_> =
            jobs.values().filter(|j| j.is_retryable() && j.failure_kind.is_some()).cloned().collect();
        results.sort_by_key(|j| j.completed_at);
        results.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(results)
    }

    async fn get_stale_processing_jobs(
        &self,
        started_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<DeploymentJob>, DatabaseError> {
        let jobs = read(&self.jobs)?;
        let mut results: Vec<_> = jobs
            .values()
            .filter(|j| j.status == JobStatus::Processing && j.started_at.is_some_and(|s| s < started_before))
            .cloned()
            .collect();
        results.sort_by_key(|j| j.started_at);
        results.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(results)
    }
}

#[async_trait]
impl DomainRepository for InMemoryStore {
    async fn create_domain(&self, domain: ProjectDomain) -> Result<ProjectDomain, DatabaseError> {
        let mut domains = write(&self.domains)?;
        if domains.values().any(|d| d.domain == domain.domain) {
            return Err(DatabaseError::DuplicateKey(format!("domain {} already exists", domain.domain)));
        }
        if domain.is_primary && domains.values().any(|d| d.project_id == domain.project_id && d.is_primary) {
            return Err(DatabaseError::DuplicateKey(format!(
                "project {} already has a primary domain",
                domain.project_id
            )));
        }
        domains.insert(domain.id.clone(), domain.clone());
        Ok(domain)
    }

    async fn get_domain_by_id(&self, id: &str) -> Result<Option<ProjectDomain>, DatabaseError> {
        Ok(read(&self.domains)?.get(id).cloned())
    }

    async fn get_domain_by_name(&self, domain: &str) -> Result<Option<ProjectDomain>, DatabaseError> {
        Ok(read(&self.domains)?.values().find(|d| d.domain == domain).cloned())
    }

    async fn get_domains_by_project(&self, project_id: &str) -> Result<Vec<ProjectDomain>, DatabaseError> {
        let domains = read(&self.domains)?;
        let mut results: Vec<_> = domains.values().filter(|d| d.project_id == project_id).cloned().collect();
        results.sort_by_key(|d| d.created_at);
        Ok(results)
    }

    async fn delete_domain(&self, id: &str) -> Result<bool, DatabaseError> {
        Ok(write(&self.domains)?.remove(id).is_some())
    }

    async fn unset_other_primaries(&self, project_id: &str, keep_id: &str) -> Result<u64, DatabaseError> {
        let mut domains = write(&self.domains)?;
        let now = Utc::now();
        let mut changed = 0;
        for domain in domains.values_mut().filter(|d| d.project_id == project_id && d.is_primary && d.id != keep_id) {
            domain.is_primary = false;
            domain.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn set_domain_primary(&self, id: &str) -> Result<ProjectDomain, DatabaseError> {
        let mut domains = write(&self.domains)?;
        let project_id = domains
            .get(id)
            .map(|d| d.project_id.clone())
            .ok_or_else(|| DatabaseError::ItemNotFound(format!("domain {}", id)))?;

        if domains.values().any(|d| d.project_id == project_id && d.is_primary && d.id != id) {
            return Err(DatabaseError::DuplicateKey(format!("project {} already has a primary domain", project_id)));
        }

        let domain = domains.get_mut(id).ok_or_else(|| DatabaseError::ItemNotFound(format!("domain {}", id)))?;
        domain.is_primary = true;
        domain.updated_at = Utc::now();
        Ok(domain.clone())
    }

    async fn claim_domains_for_check(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProjectDomain>, DatabaseError> {
        let mut domains = write(&self.domains)?;
        let mut due: Vec<_> = domains
            .values()
            .filter(|d| d.needs_polling() && d.next_check_at <= now)
            .map(|d| (d.next_check_at, d.id.clone()))
            .collect();
        due.sort();
        due.truncate(limit);

        let mut leased = Vec::with_capacity(due.len());
        for (_, id) in due {
            if let Some(domain) = domains.get_mut(&id) {
                domain.next_check_at = lease_until;
                leased.push(domain.clone());
            }
        }
        Ok(leased)
    }

    async fn update_domain_status(&self, id: &str, update: DomainStatusUpdate) -> Result<ProjectDomain, DatabaseError> {
        let mut domains = write(&self.domains)?;
        let domain = domains.get_mut(id).ok_or_else(|| DatabaseError::ItemNotFound(format!("domain {}", id)))?;
        domain.apply_update(&update);
        Ok(domain.clone())
    }

    async fn mark_stale_domains(&self, created_before: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let mut domains = write(&self.domains)?;
        let now = Utc::now();
        let mut flagged = 0;
        for domain in domains.values_mut().filter(|d| !d.verified && !d.stale && d.created_at < created_before) {
            domain.stale = true;
            domain.updated_at = now;
            flagged += 1;
        }
        Ok(flagged)
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn get_project_site(&self, project_id: &str) -> Result<Option<ProjectSite>, DatabaseError> {
        Ok(read(&self.sites)?.get(project_id).cloned())
    }

    async fn set_project_site_id(
        &self,
        project_id: &str,
        site_id: &str,
        site_name: &str,
    ) -> Result<ProjectSite, DatabaseError> {
        let mut sites = write(&self.sites)?;
        let site = sites.entry(project_id.to_string()).or_insert_with(|| ProjectSite::new(project_id));
        if site.site_id.is_none() {
            site.site_id = Some(site_id.to_string());
            site.site_name = Some(site_name.to_string());
            site.updated_at = Utc::now();
        }
        Ok(site.clone())
    }

    async fn record_project_deployment(
        &self,
        project_id: &str,
        job_id: &str,
        deployment_url: &str,
    ) -> Result<(), DatabaseError> {
        let mut sites = write(&self.sites)?;
        let site = sites.entry(project_id.to_string()).or_insert_with(|| ProjectSite::new(project_id));
        site.deployment_url = Some(deployment_url.to_string());
        site.deployment_status = Some(ProjectDeploymentStatus::Deployed);
        site.last_job_id = Some(job_id.to_string());
        site.last_error = None;
        site.updated_at = Utc::now();
        Ok(())
    }

    async fn record_project_failure(&self, project_id: &str, job_id: &str, error: &str) -> Result<(), DatabaseError> {
        let mut sites = write(&self.sites)?;
        let site = sites.entry(project_id.to_string()).or_insert_with(|| ProjectSite::new(project_id));
        site.deployment_status = Some(ProjectDeploymentStatus::Failed);
        site.last_job_id = Some(job_id.to_string());
        site.last_error = Some(error.to_string());
        site.updated_at = Utc::now();
        Ok(())
    }
}
