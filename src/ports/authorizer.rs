use std::path::PathBuf;
use thiserror::Error;

use crate::domain::auth::{scope_set::ScopeSet, token::Token};

#[derive(Error, Debug)]
pub enum AuthorizeError {
    #[error("Missing or invalid client secret file at {}", path.display())]
    MissingClientSecret { path: PathBuf },
    #[error("Failed to prepare configuration directory")]
    PrepareConfDir,
    #[error("Authorization consent flow failed")]
    ConsentFlow,
}

/// Obtains a brand-new token by asking the user for consent.
#[async_trait::async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, scopes: &ScopeSet) -> error_stack::Result<Token, AuthorizeError>;
}
