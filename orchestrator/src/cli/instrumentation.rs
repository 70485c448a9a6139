use clap::Args;
use url::Url;

/// Parameters used to export traces and metrics over OTLP.
#[derive(Debug, Clone, Args)]
#[group()]
pub struct InstrumentationCliArgs {
    /// The name of the instrumentation service.
    #[arg(env = "SITE_ORCHESTRATOR_OTEL_SERVICE_NAME", long, default_value = "site_orchestrator")]
    pub otel_service_name: String,

    /// The endpoint of the collector. Export is disabled when unset.
    #[arg(env = "SITE_ORCHESTRATOR_OTEL_COLLECTOR_ENDPOINT", long)]
    pub otel_collector_endpoint: Option<Url>,
}
