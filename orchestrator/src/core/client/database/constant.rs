/// Collection name for deployment jobs
pub const JOBS_COLLECTION: &str = "deployment_jobs";

/// Collection name for custom domains bound to projects
pub const DOMAINS_COLLECTION: &str = "project_domains";

/// Collection name for the deployment fields of project records
///
/// Keyed by `project_id`. Holds the hosted site id, which must never change once written.
pub const PROJECT_SITES_COLLECTION: &str = "project_sites";

/// Unique partial index on `project_id` over PROCESSING jobs
pub const ONE_PROCESSING_JOB_PER_PROJECT_INDEX: &str = "one_processing_job_per_project";

/// Unique partial index on `project_id` over primary domains
pub const ONE_PRIMARY_DOMAIN_PER_PROJECT_INDEX: &str = "one_primary_domain_per_project";

/// How many times a claim or primary switch is re-attempted after losing a race on a unique index
pub const MAX_CONFLICT_RETRIES: usize = 5;
