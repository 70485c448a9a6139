pub mod mongodb;

use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatabaseBackend {
    /// MongoDB, required when more than one orchestrator process shares the queue
    Mongodb,
    /// Process local store, state is lost on restart
    Memory,
}

/// Parameters used to pick and configure the job store.
#[derive(Debug, Clone, Args)]
pub struct DatabaseCliArgs {
    /// Which backend holds jobs, domains and project site records.
    #[arg(env = "SITE_ORCHESTRATOR_DATABASE_BACKEND", long, value_enum, default_value_t = DatabaseBackend::Mongodb)]
    pub database_backend: DatabaseBackend,

    #[clap(flatten)]
    pub mongodb_args: mongodb::MongoDBCliArgs,
}
