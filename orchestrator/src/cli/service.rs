use clap::Args;

fn parse_positive_usize(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if value == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(value)
}

#[derive(Debug, Clone, Args)]
pub struct ServiceCliArgs {
    /// The maximum number of deployment jobs this process runs at the same time.
    #[arg(env = "SITE_ORCHESTRATOR_MAX_CONCURRENT_DEPLOYMENTS", long, default_value = "4", value_parser = parse_positive_usize)]
    pub max_concurrent_deployments: usize,

    /// Polling interval when no jobs are available (milliseconds).
    #[arg(env = "SITE_ORCHESTRATOR_POLL_INTERVAL_MS", long, default_value = "2000")]
    pub poll_interval_ms: u64,

    /// Random delay added to each idle poll so processes do not poll in lockstep (milliseconds).
    #[arg(env = "SITE_ORCHESTRATOR_POLL_JITTER_MS", long, default_value = "250")]
    pub poll_jitter_ms: u64,

    /// Jobs stuck in PROCESSING longer than this are failed so the project is unblocked.
    #[arg(env = "SITE_ORCHESTRATOR_JOB_PROCESSING_TIMEOUT_SECONDS", long, default_value = "900")]
    pub job_processing_timeout_seconds: u64,

    /// How often failed jobs are considered for retry.
    #[arg(env = "SITE_ORCHESTRATOR_RETRY_SWEEP_INTERVAL_SECONDS", long, default_value = "15")]
    pub retry_sweep_interval_seconds: u64,

    /// How long shutdown waits for in-flight jobs.
    #[arg(env = "SITE_ORCHESTRATOR_SHUTDOWN_TIMEOUT_SECONDS", long, default_value = "30")]
    pub shutdown_timeout_seconds: u64,

    /// Consecutive store errors after which a worker pauses polling.
    #[arg(env = "SITE_ORCHESTRATOR_CIRCUIT_BREAKER_THRESHOLD", long, default_value = "5")]
    pub circuit_breaker_threshold: u32,

    /// How long an open circuit stays open.
    #[arg(env = "SITE_ORCHESTRATOR_CIRCUIT_BREAKER_RESET_TIMEOUT_SECONDS", long, default_value = "60")]
    pub circuit_breaker_reset_timeout_seconds: u64,
}
