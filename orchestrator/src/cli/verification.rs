use clap::Args;

/// Parameters used to config the domain verification worker.
#[derive(Debug, Clone, Args)]
pub struct VerificationCliArgs {
    /// Interval between checks of the same domain.
    #[arg(env = "SITE_ORCHESTRATOR_DOMAIN_CHECK_INTERVAL_SECONDS", long, default_value = "60")]
    pub domain_check_interval_seconds: u64,

    /// Domains checked per poll.
    #[arg(env = "SITE_ORCHESTRATOR_DOMAIN_CHECK_BATCH_SIZE", long, default_value = "25")]
    pub domain_check_batch_size: usize,

    /// Unverified domains older than this are flagged stale and no longer polled.
    #[arg(env = "SITE_ORCHESTRATOR_DOMAIN_VERIFICATION_LIFETIME_HOURS", long, default_value = "24")]
    pub domain_verification_lifetime_hours: u64,
}
