use std::future::Future;
use std::time::Instant;

use mongodb::bson::{self, Bson, Document};
use opentelemetry::KeyValue;
use serde::Serialize;

use crate::core::client::database::error::DatabaseError;
use crate::utils::metrics::ORCHESTRATOR_METRICS;

pub trait ToDocument {
    fn to_document(&self) -> Result<Document, DatabaseError>;
}

impl<T: Serialize> ToDocument for T {
    fn to_document(&self) -> Result<Document, DatabaseError> {
        let doc = bson::to_bson(self)?;

        if let Bson::Document(doc) = doc {
            Ok(doc)
        } else {
            Err(DatabaseError::FailedToSerializeDocument(format!("Failed to serialize document: {}", doc)))
        }
    }
}

/// Runs a database call and records its latency, tagged with the operation name and outcome.
pub async fn record_metrics<T, F, Fut>(operation: &'static str, f: F) -> Result<T, DatabaseError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, DatabaseError>>,
{
    let start = Instant::now();
    let result = f().await;
    let outcome = if result.is_ok() { "success" } else { "failure" };
    let attributes = [KeyValue::new("db_operation_name", operation), KeyValue::new("db_operation_outcome", outcome)];
    ORCHESTRATOR_METRICS.db_calls_response_time.record(start.elapsed().as_secs_f64(), &attributes);
    result
}
