use std::time::Duration;

use crate::cli::deployment::DeploymentCliArgs;
use crate::types::hostname::normalize_host;

#[derive(Debug, Clone)]
pub struct DeploymentParams {
    /// Normalized hosts that no project may deploy to or attach
    pub reserved_domains: Vec<String>,
    pub deploy_timeout: Duration,
    pub deploy_status_poll_interval: Duration,
}

impl Default for DeploymentParams {
    fn default() -> Self {
        Self {
            reserved_domains: vec!["wondrousdigital.com".to_string(), "www.wondrousdigital.com".to_string()],
            deploy_timeout: Duration::from_secs(120),
            deploy_status_poll_interval: Duration::from_millis(2000),
        }
    }
}

impl From<&DeploymentCliArgs> for DeploymentParams {
    fn from(args: &DeploymentCliArgs) -> Self {
        Self {
            reserved_domains: args
                .reserved_domains
                .iter()
                .map(|d| normalize_host(d))
                .filter(|d| !d.is_empty())
                .collect(),
            deploy_timeout: Duration::from_secs(args.deploy_timeout_seconds),
            deploy_status_poll_interval: Duration::from_millis(args.deploy_status_poll_interval_ms),
        }
    }
}
