// Client abstractions module - the store and the hosting provider seams

pub mod database;

// Re-export commonly used types
pub use database::{repository_client::RepositoryDatabaseClient, DatabaseClient};
pub use orchestrator_hosting_client_interface::HostingClient;
