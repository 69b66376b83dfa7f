use std::sync::Arc;

use chrono::Utc;
use error_stack::ResultExt;
use thiserror::Error;
use tracing::instrument;

use crate::{
    domain::auth::{
        cache_status::CacheStatus, credential_bundle::CredentialBundle, scope_set::ScopeSet,
        token::Token,
    },
    ports::{authorizer::Authorizer, credential_store::CredentialStore, token_refresher::TokenRefresher},
};

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Authorization failed")]
    Authorization,
    #[error("Failed to persist credentials")]
    CacheWrite,
}

/// Decides between the cached token, a refreshed one, or a new consent flow.
pub struct CredentialProvider {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    authorizer: Arc<dyn Authorizer>,
}

impl std::fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("store", &"<CredentialStore>")
            .field("refresher", &"<TokenRefresher>")
            .field("authorizer", &"<Authorizer>")
            .finish()
    }
}

impl CredentialProvider {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        refresher: Arc<dyn TokenRefresher>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        CredentialProvider {
            store,
            refresher,
            authorizer,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_credentials(
        &self,
        scopes: &ScopeSet,
    ) -> error_stack::Result<Token, CredentialError> {
        let status = CacheStatus::classify(self.store.load(), scopes, Utc::now());

        match status {
            CacheStatus::Usable(token) => {
                tracing::debug!("Using cached auth token");
                return Ok(token);
            }
            CacheStatus::TokenExpiredRefreshable {
                token,
                scopes: stored_scopes,
            } => match self.refresher.refresh(&token).await {
                Ok(refreshed) => {
                    self.persist(CredentialBundle::new(stored_scopes, refreshed.clone()))?;
                    return Ok(refreshed);
                }
                Err(report) => {
                    tracing::warn!("Token refresh failed, authorizing again: {:?}", report);
                }
            },
            other => {
                tracing::warn!("Authorization hiccup: {}", other);
            }
        }

        let token = self
            .authorizer
            .authorize(scopes)
            .await
            .change_context(CredentialError::Authorization)?;

        self.persist(CredentialBundle::new(scopes.clone(), token.clone()))?;
        Ok(token)
    }

    fn persist(&self, bundle: CredentialBundle) -> error_stack::Result<(), CredentialError> {
        self.store
            .save(&bundle)
            .change_context(CredentialError::CacheWrite)
    }
}
