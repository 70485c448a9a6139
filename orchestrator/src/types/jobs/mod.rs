pub mod job_item;
pub mod payload;
pub mod types;
