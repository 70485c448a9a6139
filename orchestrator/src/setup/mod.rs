use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::IndexModel;
use tracing::info;

use crate::cli::SetupCmd;
use crate::core::client::database::constant::{
    DOMAINS_COLLECTION, JOBS_COLLECTION, ONE_PRIMARY_DOMAIN_PER_PROJECT_INDEX, ONE_PROCESSING_JOB_PER_PROJECT_INDEX,
    PROJECT_SITES_COLLECTION,
};
use crate::core::client::database::mongo_client::MongoClient;
use crate::core::client::database::DatabaseError;
use crate::types::params::DatabaseArgs;
use crate::{OrchestratorError, OrchestratorResult};

/// Creates the indexes the store relies on. Creating an index that already exists is a no-op,
/// so this can run on every deploy.
pub async fn setup(setup_cmd: &SetupCmd) -> OrchestratorResult<()> {
    let DatabaseArgs::MongoDB { connection_url, database_name } = DatabaseArgs::from(setup_cmd.clone()) else {
        return Err(OrchestratorError::SetupCommandError("setup only applies to the MongoDB backend".to_string()));
    };

    info!(database = %database_name, "Setting up resources for Orchestrator...");
    let client = MongoClient::new(&connection_url, &database_name).await?;
    client.health_check().await?;

    ensure_indexes(&client).await?;

    info!("Setup completed");
    Ok(())
}

/// Applies [`index_plan`]. The claim and the primary switch are only exclusive once the partial
/// indexes exist, so `run` calls this before any worker starts.
pub async fn ensure_indexes(client: &MongoClient) -> Result<(), DatabaseError> {
    for (collection, indexes) in index_plan() {
        let count = indexes.len();
        client.create_indexes::<Document>(collection, indexes).await?;
        info!(collection, count, "Indexes ensured");
    }
    Ok(())
}

fn unique(keys: Document, name: &str) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).name(name.to_string()).build())
        .build()
}

fn unique_partial(keys: Document, name: &str, filter: Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).name(name.to_string()).partial_filter_expression(filter).build())
        .build()
}

fn plain(keys: Document, name: &str) -> IndexModel {
    IndexModel::builder().keys(keys).options(IndexOptions::builder().name(name.to_string()).build()).build()
}

/// Every index per collection. The two partial indexes carry the queue's exclusivity rules: one
/// PROCESSING job per project and one primary domain per project.
pub fn index_plan() -> Vec<(&'static str, Vec<IndexModel>)> {
    vec![
        (
            JOBS_COLLECTION,
            vec![
                unique(doc! { "id": 1 }, "job_id"),
                plain(doc! { "status": 1, "available_at": 1, "priority": -1, "created_at": 1 }, "claim_order"),
                plain(doc! { "project_id": 1, "created_at": -1 }, "jobs_by_project"),
                plain(doc! { "status": 1, "started_at": 1 }, "stale_claims"),
                unique_partial(
                    doc! { "project_id": 1 },
                    ONE_PROCESSING_JOB_PER_PROJECT_INDEX,
                    doc! { "status": "PROCESSING" },
                ),
            ],
        ),
        (
            DOMAINS_COLLECTION,
            vec![
                unique(doc! { "id": 1 }, "domain_id"),
                unique(doc! { "domain": 1 }, "domain_name"),
                plain(doc! { "project_id": 1, "created_at": 1 }, "domains_by_project"),
                plain(doc! { "stale": 1, "next_check_at": 1 }, "due_checks"),
                unique_partial(doc! { "project_id": 1 }, ONE_PRIMARY_DOMAIN_PER_PROJECT_INDEX, doc! { "is_primary": true }),
            ],
        ),
        (PROJECT_SITES_COLLECTION, vec![unique(doc! { "project_id": 1 }, "project_site")]),
    ]
}
