use crate::cli::instrumentation::InstrumentationCliArgs;
use crate::OrchestratorError;
use url::Url;

#[derive(Debug, Clone)]
pub struct OTELConfig {
    pub endpoint: Option<Url>,
    pub service_name: String,
}

impl TryFrom<InstrumentationCliArgs> for OTELConfig {
    type Error = OrchestratorError;
    fn try_from(args: InstrumentationCliArgs) -> Result<Self, Self::Error> {
        let service_name = args.otel_service_name.trim().to_string();
        if service_name.is_empty() {
            return Err(OrchestratorError::RunCommandError("otel_service_name must not be empty".to_string()));
        }
        Ok(Self { endpoint: args.otel_collector_endpoint, service_name })
    }
}
