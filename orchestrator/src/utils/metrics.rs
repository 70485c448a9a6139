use once_cell::sync::Lazy;
use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram, Meter};

pub static ORCHESTRATOR_METRICS: Lazy<OrchestratorMetrics> = Lazy::new(OrchestratorMetrics::register);

pub struct OrchestratorMetrics {
    pub jobs_enqueued: Counter<u64>,
    pub jobs_completed: Counter<u64>,
    pub jobs_failed: Counter<u64>,
    pub jobs_retried: Counter<u64>,
    pub stale_jobs_recovered: Counter<u64>,
    pub deploy_duration: Histogram<f64>,
    pub domain_checks: Counter<u64>,
    pub api_operations: Counter<u64>,
    pub db_calls_response_time: Histogram<f64>,
}

impl OrchestratorMetrics {
    pub fn register() -> Self {
        let meter: Meter = global::meter("crates.site_orchestrator.opentelemetry");

        let jobs_enqueued = meter
            .u64_counter("deployment_jobs_enqueued")
            .with_description("Count of deployment jobs accepted into the queue")
            .with_unit("jobs")
            .build();

        let jobs_completed = meter
            .u64_counter("deployment_jobs_completed")
            .with_description("Count of deployment jobs that reached COMPLETED")
            .with_unit("jobs")
            .build();

        let jobs_failed = meter
            .u64_counter("deployment_jobs_failed")
            .with_description("Count of deployment attempts that ended in FAILED, labelled by failure kind")
            .with_unit("jobs")
            .build();

        let jobs_retried = meter
            .u64_counter("deployment_jobs_retried")
            .with_description("Count of failed jobs moved back to QUEUED")
            .with_unit("jobs")
            .build();

        let stale_jobs_recovered = meter
            .u64_counter("deployment_jobs_stale_recovered")
            .with_description("Count of PROCESSING jobs failed by the sweeper after their claim expired")
            .with_unit("jobs")
            .build();

        let deploy_duration = meter
            .f64_histogram("deployment_duration")
            .with_description("Time from claim to a terminal outcome of one attempt")
            .with_unit("s")
            .build();

        let domain_checks = meter
            .u64_counter("domain_verification_checks")
            .with_description("Count of domain checks against the hosting provider, labelled by outcome")
            .with_unit("checks")
            .build();

        let api_operations = meter
            .u64_counter("api_operations")
            .with_description("Count of HTTP API operations, labelled by operation and outcome")
            .with_unit("requests")
            .build();

        let db_calls_response_time = meter
            .f64_histogram("db_calls_response_time")
            .with_description("Response time of DB calls over time")
            .with_unit("s")
            .build();

        Self {
            jobs_enqueued,
            jobs_completed,
            jobs_failed,
            jobs_retried,
            stale_jobs_recovered,
            deploy_duration,
            domain_checks,
            api_operations,
            db_calls_response_time,
        }
    }
}
