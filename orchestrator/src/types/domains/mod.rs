pub mod domain_item;
pub mod types;
