use thiserror::Error;

use crate::domain::auth::{cache_status::CacheLookup, credential_bundle::CredentialBundle};

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to write credential cache")]
    Write,
}

/// Persistence for the credential bundle.
///
/// Loading never fails: anything unusable is reported as
/// [`CacheLookup::Absent`] with the reason.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> CacheLookup;
    fn save(&self, bundle: &CredentialBundle) -> error_stack::Result<(), CacheError>;
}
