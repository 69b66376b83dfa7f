use std::sync::Arc;

use crate::{
    adapters::{
        cache::token_cache::TokenCache,
        sheets::{
            auth::InstalledFlowAuthorizer, http_client, spreadsheet_read::SheetsValuesClient,
            token_refresh::OAuthTokenRefresher,
        },
    },
    application::{credential_provider::CredentialProvider, sheet_fetcher::SheetFetcher},
    config::app_config::AppConfig,
    ports::{
        authorizer::Authorizer, credential_store::CredentialStore, sheet_values::SheetValues,
        token_refresher::TokenRefresher,
    },
};

use super::cli_adapter::CliAdapter;

/// Wires the Google-backed adapters into a [`CliAdapter`].
pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create(config: AppConfig) -> CliAdapter {
        let client = http_client::http_client();

        let store: Arc<dyn CredentialStore> = Arc::new(TokenCache::new(config.token_cache_path()));
        let refresher: Arc<dyn TokenRefresher> =
            Arc::new(OAuthTokenRefresher::new(config.credentials_path()));
        let authorizer: Arc<dyn Authorizer> =
            Arc::new(InstalledFlowAuthorizer::new(&config, client.clone()));
        let values: Arc<dyn SheetValues> = Arc::new(SheetsValuesClient::new(client));

        let fetcher = SheetFetcher::new(
            CredentialProvider::new(store, refresher, authorizer),
            values,
            config.scopes.clone(),
        );

        CliAdapter::new(config, fetcher)
    }
}
