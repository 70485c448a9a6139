//! Startup information logging
//!
//! Prints the effective configuration once, so an operator can tell from the first lines of the
//! log how a process was started. Secrets are never printed.

use tracing::info;

use crate::core::config::Config;

/// Log the resolved configuration of a `run` process
pub fn log_startup_info(config: &Config) {
    info!("═══════════════════════════════════════════════════════════════════");
    info!("                  Site Orchestrator Starting                       ");
    info!("═══════════════════════════════════════════════════════════════════");
    info!("Orchestrator ID: {}", config.orchestrator_id());

    log_service_config(config);
    log_deployment_config(config);
    log_verification_config(config);
    log_server_config(config);

    info!("═══════════════════════════════════════════════════════════════════");
}

fn log_service_config(config: &Config) {
    let service = config.service_config();
    info!("┌─ Deployment Workers");
    info!("│  Concurrent deployments: {}", service.max_concurrent_deployments);
    info!("│  Poll interval: {}ms (+ up to {}ms jitter)", service.poll_interval_ms, service.poll_jitter_ms);
    info!("│  Processing timeout: {}s", service.job_processing_timeout_seconds);
    info!("│  Retry sweep interval: {}s", service.retry_sweep_interval_seconds);
    info!(
        "│  Circuit breaker: {} consecutive errors, reset after {}s",
        service.circuit_breaker_threshold, service.circuit_breaker_reset_timeout_seconds
    );
    info!("└─");
}

fn log_deployment_config(config: &Config) {
    let deployment = config.deployment_params();
    let retry = config.retry_policy();
    info!("┌─ Deployments");
    info!("│  Reserved domains: {}", deployment.reserved_domains.join(", "));
    info!("│  Deploy timeout: {}s", deployment.deploy_timeout.as_secs());
    info!("│  Max attempts: {}", retry.max_attempts);
    info!("│  Retry backoff: {}s doubling up to {}s", retry.base_delay.as_secs(), retry.max_delay.as_secs());
    info!("└─");
}

fn log_verification_config(config: &Config) {
    let verification = config.verification_params();
    info!("┌─ Domain Verification");
    info!("│  Check interval: {}s", verification.check_interval.as_secs());
    info!("│  Batch size: {}", verification.batch_size);
    info!("│  Verification lifetime: {}h", verification.verification_lifetime.num_hours());
    info!("└─");
}

fn log_server_config(config: &Config) {
    let server = config.server_config();
    info!("┌─ HTTP API");
    info!("│  Listening on: {}:{}", server.host, server.port);
    info!("└─");
}
