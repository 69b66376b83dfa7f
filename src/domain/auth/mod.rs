pub mod cache_status;
pub mod credential_bundle;
pub mod scope_set;
pub mod token;
