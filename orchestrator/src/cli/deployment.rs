use clap::Args;

/// Parameters that shape how a single deployment job runs.
#[derive(Debug, Clone, Args)]
pub struct DeploymentCliArgs {
    /// Hosts of the platform's own sites. A job resolving to one of them is rejected.
    #[arg(
        env = "SITE_ORCHESTRATOR_RESERVED_DOMAINS",
        long,
        value_delimiter = ',',
        default_value = "wondrousdigital.com,www.wondrousdigital.com"
    )]
    pub reserved_domains: Vec<String>,

    /// Attempts a job gets before its failure becomes final.
    #[arg(env = "SITE_ORCHESTRATOR_MAX_ATTEMPTS", long, default_value = "3")]
    pub max_attempts: u32,

    /// First retry delay, doubled on every further attempt.
    #[arg(env = "SITE_ORCHESTRATOR_RETRY_BASE_DELAY_SECONDS", long, default_value = "30")]
    pub retry_base_delay_seconds: u64,

    /// Upper bound for the retry delay.
    #[arg(env = "SITE_ORCHESTRATOR_RETRY_MAX_DELAY_SECONDS", long, default_value = "900")]
    pub retry_max_delay_seconds: u64,

    /// How long a deploy may stay pending on the provider before the attempt fails.
    #[arg(env = "SITE_ORCHESTRATOR_DEPLOY_TIMEOUT_SECONDS", long, default_value = "120")]
    pub deploy_timeout_seconds: u64,

    /// Interval between deploy status checks (milliseconds).
    #[arg(env = "SITE_ORCHESTRATOR_DEPLOY_STATUS_POLL_INTERVAL_MS", long, default_value = "2000")]
    pub deploy_status_poll_interval_ms: u64,
}
