use std::time::Duration;

use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{SdkTracerProvider, Tracer};
use opentelemetry_sdk::Resource;
use tracing::{info, warn};
use url::Url;

use crate::error::OrchestratorError;
use crate::types::params::OTELConfig;
use crate::OrchestratorResult;

const METRIC_EXPORT_INTERVAL: Duration = Duration::from_secs(5);

/// OTLP export of the orchestrator's metrics and spans.
///
/// Without a collector endpoint nothing is installed and the global meter stays a no-op.
pub struct OrchestratorInstrumentation {
    pub otel_config: OTELConfig,
    meter_provider: Option<SdkMeterProvider>,
    tracer_provider: Option<SdkTracerProvider>,
}

impl OrchestratorInstrumentation {
    pub fn new(config: &OTELConfig) -> OrchestratorResult<Self> {
        match config.endpoint {
            None => Ok(Self { otel_config: config.clone(), meter_provider: None, tracer_provider: None }),
            Some(ref endpoint) => {
                let meter_provider = Self::instrument_metric_provider(config, endpoint)?;
                let tracer_provider = Self::instrument_tracer_provider(config, endpoint)?;
                Ok(Self {
                    otel_config: config.clone(),
                    meter_provider: Some(meter_provider),
                    tracer_provider: Some(tracer_provider),
                })
            }
        }
    }

    /// Tracer for the `tracing` bridge layer, if export is enabled
    pub fn tracer(&self) -> Option<Tracer> {
        self.tracer_provider
            .as_ref()
            .map(|provider| provider.tracer(format!("{}_subscriber", self.otel_config.service_name)))
    }

    fn resource(config: &OTELConfig, suffix: &str) -> Resource {
        Resource::builder().with_service_name(format!("{}{}", config.service_name, suffix)).build()
    }

    fn instrument_metric_provider(config: &OTELConfig, endpoint: &Url) -> OrchestratorResult<SdkMeterProvider> {
        let exporter = MetricExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint.as_str())
            .build()
            .map_err(|e| OrchestratorError::InstrumentationError(format!("metric exporter: {}", e)))?;

        let reader = PeriodicReader::builder(exporter).with_interval(METRIC_EXPORT_INTERVAL).build();

        let provider = SdkMeterProvider::builder()
            .with_reader(reader)
            .with_resource(Self::resource(config, "_meter_service"))
            .build();

        global::set_meter_provider(provider.clone());
        Ok(provider)
    }

    fn instrument_tracer_provider(config: &OTELConfig, endpoint: &Url) -> OrchestratorResult<SdkTracerProvider> {
        let exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint.as_str())
            .build()
            .map_err(|e| OrchestratorError::InstrumentationError(format!("span exporter: {}", e)))?;

        let provider = SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(Self::resource(config, "_trace_service"))
            .build();

        global::set_tracer_provider(provider.clone());
        Ok(provider)
    }

    /// Flush and stop both exporters
    pub fn shutdown(&self) -> OrchestratorResult<()> {
        if self.meter_provider.is_none() && self.tracer_provider.is_none() {
            warn!("OTEL endpoint is not set. Skipping shutdown.");
            return Ok(());
        }
        if let Some(ref meter_provider) = self.meter_provider {
            meter_provider
                .shutdown()
                .map_err(|e| OrchestratorError::InstrumentationError(format!("meter shutdown: {}", e)))?;
        }
        if let Some(ref tracer_provider) = self.tracer_provider {
            tracer_provider
                .shutdown()
                .map_err(|e| OrchestratorError::InstrumentationError(format!("tracer shutdown: {}", e)))?;
        }
        info!("Telemetry exporters flushed");
        Ok(())
    }
}
