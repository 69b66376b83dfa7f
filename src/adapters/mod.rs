pub mod cache;
pub mod sheets;
