use std::sync::Arc;

use error_stack::ResultExt;
use tracing::instrument;

use crate::{
    domain::{
        auth::{scope_set::ScopeSet, token::Token},
        sheets::{a1_notation::A1Notation, row::Row},
    },
    ports::sheet_values::{FetchError, SheetValues},
};

use super::credential_provider::CredentialProvider;

pub struct SheetFetcher {
    credentials: CredentialProvider,
    values: Arc<dyn SheetValues>,
    scopes: ScopeSet,
}

impl std::fmt::Debug for SheetFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SheetFetcher {{ scopes: {:?} }}", self.scopes)
    }
}

impl SheetFetcher {
    pub fn new(
        credentials: CredentialProvider,
        values: Arc<dyn SheetValues>,
        scopes: ScopeSet,
    ) -> Self {
        SheetFetcher {
            credentials,
            values,
            scopes,
        }
    }

    /// Rows of `range`, or an empty list when the range holds no values.
    ///
    /// Without `credentials`, a token for the configured scopes is obtained
    /// from the [`CredentialProvider`].
    #[instrument(skip(self, credentials))]
    pub async fn get_sheet_data(
        &self,
        sheet_id: &str,
        range: &A1Notation,
        credentials: Option<Token>,
    ) -> error_stack::Result<Vec<Row>, FetchError> {
        let token = match credentials {
            Some(token) => token,
            None => self
                .credentials
                .get_credentials(&self.scopes)
                .await
                .change_context(FetchError::Credentials)?,
        };

        let rows = self
            .values
            .values_get(&token, sheet_id, range)
            .await?
            .unwrap_or_default();

        Ok(rows)
    }
}
