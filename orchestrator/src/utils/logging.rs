use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::Utc;
use opentelemetry_sdk::trace::Tracer;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::{LookupSpan, SpanRef};
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::{OrchestratorError, OrchestratorResult};

/// Event fields shown in front of the others in the pretty output
const LEADING_FIELDS: &[&str] = &["job_id", "domain_id"];

/// Span fields rendered in the worker column instead of the field list
const WORKER_FIELDS: &[&str] = &["worker", "slot"];

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[90m";
const CYAN: &str = "\x1b[96m";
const GREEN: &str = "\x1b[92m";
const WHITE: &str = "\x1b[97m";

/// Fields recorded on a span, kept in the span's extensions by [`FieldCollectorLayer`]
#[derive(Debug, Clone, Default)]
pub struct SpanFields(BTreeMap<String, String>);

impl Visit for SpanFields {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value).trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

/// Stores every span's fields so the formatters can print them next to the events inside it.
pub struct FieldCollectorLayer;

impl<S> Layer<S> for FieldCollectorLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut fields = SpanFields::default();
        attrs.record(&mut fields);
        span.extensions_mut().insert(fields);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFields>() {
            Some(fields) => values.record(fields),
            None => {
                let mut fields = SpanFields::default();
                values.record(&mut fields);
                extensions.insert(fields);
            }
        }
    }
}

/// Fields of the current span and its parents, outermost first so inner spans win on clashes
fn scope_fields<S>(span: Option<SpanRef<'_, S>>) -> BTreeMap<String, String>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let mut merged = BTreeMap::new();
    if let Some(span) = span {
        for span in span.scope().from_root() {
            if let Some(fields) = span.extensions().get::<SpanFields>() {
                merged.extend(fields.0.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
    }
    merged
}

/// Message plus the remaining event fields, in recording order
#[derive(Default)]
struct EventFields {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        let value = format!("{:?}", value).trim_matches('"').to_string();
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

/// Column-aligned console output:
/// `timestamp | level | worker | service | message (fields)`
pub struct ColumnFormatter;

impl<S, N> FormatEvent<S, N> for ColumnFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let span_fields = scope_fields(ctx.lookup_current());
        let worker = span_fields.get("worker").map(|w| worker_label(w, span_fields.get("slot").map(String::as_str)));

        let mut visitor = EventFields::default();
        event.record(&mut visitor);
        visitor.fields.retain(|(name, _)| !WORKER_FIELDS.contains(&name.as_str()));
        visitor.fields.sort_by_key(|(name, _)| !LEADING_FIELDS.contains(&name.as_str()));

        write!(writer, "{CYAN}{}{RESET} {DIM}|{RESET} ", Utc::now().format("%y-%m-%d %H:%M:%S"))?;
        write!(writer, "{}{:<5}{RESET} {DIM}|{RESET} ", level_color(meta.level()), meta.level())?;
        write!(writer, "{GREEN}{:<22}{RESET} {DIM}|{RESET} ", worker.as_deref().unwrap_or("-"))?;
        write!(writer, "{GREEN}{:<8}{RESET} {DIM}|{RESET} ", service_name(meta.target()))?;
        write!(writer, "{WHITE}{}{RESET}", visitor.message)?;

        if !visitor.fields.is_empty() {
            let rendered: Vec<String> =
                visitor.fields.iter().map(|(name, value)| format!("{DIM}{name}={value}{RESET}")).collect();
            write!(writer, " ({})", rendered.join(", "))?;
        }
        writeln!(writer)
    }
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "\x1b[90m",
        Level::DEBUG => "\x1b[34m",
        Level::INFO => "\x1b[32m",
        Level::WARN => "\x1b[33m",
        Level::ERROR => "\x1b[31m",
    }
}

/// Event fields with numbers and booleans kept as JSON scalars
#[derive(Default)]
struct JsonFields {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl Visit for JsonFields {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        self.record_str(field, format!("{:?}", value).trim_matches('"'));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }
}

/// One JSON object per line for log shippers. Span fields are merged under `fields`, event
/// fields take precedence.
pub struct JsonEventFormatter;

impl<S, N> FormatEvent<S, N> for JsonEventFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let meta = event.metadata();
        let mut visitor = JsonFields::default();
        event.record(&mut visitor);

        let current = ctx.lookup_current();
        let span_name = current.as_ref().map(|span| span.metadata().name());
        let mut fields: Map<String, Value> =
            scope_fields(current).into_iter().map(|(k, v)| (k, Value::String(v))).collect();
        fields.extend(visitor.fields);
        if let Some(name) = span_name {
            fields.insert("span_name".to_string(), Value::String(name.to_string()));
        }

        let mut root = Map::new();
        root.insert(
            "timestamp".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        );
        root.insert("level".to_string(), Value::String(meta.level().to_string()));
        root.insert("target".to_string(), Value::String(meta.target().to_string()));
        root.insert("service".to_string(), Value::String(service_name(meta.target()).to_string()));
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            root.insert("filename".to_string(), Value::String(file.to_string()));
            root.insert("line_number".to_string(), Value::from(line));
        }
        if let Some(message) = visitor.message {
            root.insert("message".to_string(), Value::String(message));
        }
        if !fields.is_empty() {
            root.insert("fields".to_string(), Value::Object(fields));
        }

        let line = serde_json::to_string(&Value::Object(root)).map_err(|_| std::fmt::Error)?;
        writeln!(writer, "{}", line)
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` sets the filter (default `site_orchestrator=info`). `LOG_FORMAT=json` switches
/// from the column layout to one JSON object per line. With a tracer, spans are exported through
/// OpenTelemetry as well. Also installs `color_eyre` for panic reports.
pub fn init_logging(tracer: Option<Tracer>) -> OrchestratorResult<()> {
    color_eyre::install().map_err(|e| OrchestratorError::InstrumentationError(format!("color_eyre: {}", e)))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::builder().with_default_directive(Level::INFO.into()).parse_lossy("site_orchestrator=info"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));
    let (json_layer, column_layer) = if json {
        (Some(fmt::layer().event_format(JsonEventFormatter)), None)
    } else {
        (None, Some(fmt::layer().event_format(ColumnFormatter)))
    };

    let subscriber = Registry::default()
        .with(env_filter)
        .with(FieldCollectorLayer)
        .with(json_layer)
        .with(column_layer)
        .with(ErrorLayer::default())
        .with(tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer)));

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| OrchestratorError::InstrumentationError(format!("global subscriber: {}", e)))
}

/// Short name of the crate that emitted an event
fn service_name(target: &str) -> &'static str {
    match target.split("::").next().unwrap_or_default() {
        "orchestrator_vercel_service" => "VERCEL",
        "orchestrator_hosting_client_interface" => "HOSTING",
        "orchestrator_utils" => "UTILS",
        "site_orchestrator" => "-",
        _ => "EXTERNAL",
    }
}

/// `deployment` + slot `2` is shown as `DEPLOYMENT#2`
fn worker_label(worker: &str, slot: Option<&str>) -> String {
    let name = worker.to_uppercase();
    match slot {
        Some(slot) => format!("{}#{}", name, slot),
        None => name,
    }
}
