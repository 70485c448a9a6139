mod mongo;
mod r#trait;

pub use mongo::MongoDomainRepository;
pub use r#trait::DomainRepository;

#[cfg(test)]
pub use r#trait::MockDomainRepository;
