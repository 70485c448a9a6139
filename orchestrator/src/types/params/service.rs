use std::time::Duration;

use crate::cli::server::ServerCliArgs;
use crate::cli::service::ServiceCliArgs;

#[derive(Debug, Clone)]
pub struct ServiceParams {
    /// Deployment jobs this process runs at the same time
    pub max_concurrent_deployments: usize,
    /// Polling interval when no jobs available (milliseconds)
    pub poll_interval_ms: u64,
    pub poll_jitter_ms: u64,
    pub job_processing_timeout_seconds: u64,
    pub retry_sweep_interval_seconds: u64,
    pub shutdown_timeout_seconds: u64,
    pub circuit_breaker_threshold: u32,
    pub circuit_breaker_reset_timeout_seconds: u64,
}

impl ServiceParams {
    pub fn processing_timeout(&self) -> Duration {
        Duration::from_secs(self.job_processing_timeout_seconds)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

impl Default for ServiceParams {
    fn default() -> Self {
        Self {
            max_concurrent_deployments: 4,
            poll_interval_ms: 2000,
            poll_jitter_ms: 250,
            job_processing_timeout_seconds: 900,
            retry_sweep_interval_seconds: 15,
            shutdown_timeout_seconds: 30,
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_timeout_seconds: 60,
        }
    }
}

impl From<ServiceCliArgs> for ServiceParams {
    fn from(args: ServiceCliArgs) -> Self {
        Self {
            max_concurrent_deployments: args.max_concurrent_deployments,
            poll_interval_ms: args.poll_interval_ms,
            poll_jitter_ms: args.poll_jitter_ms,
            job_processing_timeout_seconds: args.job_processing_timeout_seconds,
            retry_sweep_interval_seconds: args.retry_sweep_interval_seconds,
            shutdown_timeout_seconds: args.shutdown_timeout_seconds,
            circuit_breaker_threshold: args.circuit_breaker_threshold,
            circuit_breaker_reset_timeout_seconds: args.circuit_breaker_reset_timeout_seconds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerParams {
    pub host: String,
    pub port: u16,
}

impl Default for ServerParams {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 3000 }
    }
}

impl From<ServerCliArgs> for ServerParams {
    fn from(args: ServerCliArgs) -> Self {
        Self { host: args.host, port: args.port }
    }
}
