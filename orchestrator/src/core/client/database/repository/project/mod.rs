mod mongo;
mod r#trait;

pub use mongo::MongoProjectRepository;
pub use r#trait::ProjectRepository;

#[cfg(test)]
pub use r#trait::MockProjectRepository;
