pub mod common;
pub mod database;
pub mod domains;
pub mod jobs;
pub mod workers;
