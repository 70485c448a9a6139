use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::client::database::error::DatabaseError;
use crate::types::domains::domain_item::ProjectDomain;
use crate::types::domains::types::DomainStatusUpdate;

/// Repository for custom domains.
///
/// Two unique indexes back this collection: `domain` across all projects, and `project_id`
/// over rows with `is_primary = true`. Writes that would break either fail with
/// [`DatabaseError::DuplicateKey`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DomainRepository: Send + Sync {
    async fn create_domain(&self, domain: ProjectDomain) -> Result<ProjectDomain, DatabaseError>;

    async fn get_domain_by_id(&self, id: &str) -> Result<Option<ProjectDomain>, DatabaseError>;

    async fn get_domain_by_name(&self, domain: &str) -> Result<Option<ProjectDomain>, DatabaseError>;

    /// Domains of a project, oldest first
    async fn get_domains_by_project(&self, project_id: &str) -> Result<Vec<ProjectDomain>, DatabaseError>;

    /// Returns `false` if the row was already gone
    async fn delete_domain(&self, id: &str) -> Result<bool, DatabaseError>;

    /// Clear `is_primary` on every primary of the project except `keep_id`. Returns the number
    /// of rows changed
    async fn unset_other_primaries(&self, project_id: &str, keep_id: &str) -> Result<u64, DatabaseError>;

    /// Set `is_primary` on one row. Fails with `DuplicateKey` if another primary exists
    async fn set_domain_primary(&self, id: &str) -> Result<ProjectDomain, DatabaseError>;

    /// Lease up to `limit` domains due for a check.
    ///
    /// A domain is due if it is not stale, not live (verified with a ready certificate) and its
    /// `next_check_at` has passed. Leased rows get `next_check_at = lease_until`, so a concurrent
    /// verifier skips them.
    async fn claim_domains_for_check(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProjectDomain>, DatabaseError>;

    /// Write the outcome of a verification check
    async fn update_domain_status(&self, id: &str, update: DomainStatusUpdate) -> Result<ProjectDomain, DatabaseError>;

    /// Flag unverified domains created before `created_before` as stale. Returns the number flagged
    async fn mark_stale_domains(&self, created_before: DateTime<Utc>) -> Result<u64, DatabaseError>;
}
