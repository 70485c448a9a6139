pub mod constant;
pub mod domains;
pub mod hostname;
pub mod jobs;
pub mod params;
pub mod projects;
pub mod serde_utils;
