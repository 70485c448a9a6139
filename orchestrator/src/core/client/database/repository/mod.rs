pub mod domain;
pub mod job;
pub mod project;

pub use domain::{DomainRepository, MongoDomainRepository};
pub use job::{JobRepository, MongoJobRepository};
pub use project::{MongoProjectRepository, ProjectRepository};
