use error_stack::ResultExt;
use google_sheets4::Sheets;
use tracing::instrument;

use crate::{
    domain::{
        auth::token::Token,
        sheets::{a1_notation::A1Notation, row::Row},
    },
    ports::sheet_values::{FetchError, SheetValues},
};

use super::http_client::{HttpsClient, HttpsConnector};

/// Reads cell values through the `google-sheets4` hub.
pub struct SheetsValuesClient {
    client: HttpsClient,
    base_url: Option<String>,
}

impl std::fmt::Debug for SheetsValuesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SheetsValuesClient")
    }
}

impl SheetsValuesClient {
    pub fn new(client: HttpsClient) -> Self {
        SheetsValuesClient {
            client,
            base_url: None,
        }
    }

    /// Points the hub somewhere other than `https://sheets.googleapis.com/`.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn hub(&self, token: &Token) -> Sheets<HttpsConnector> {
        // A String is a static bearer token to the hub
        let mut hub = Sheets::new(self.client.clone(), token.access_token.clone());
        if let Some(base_url) = &self.base_url {
            hub.base_url(base_url.clone());
        }
        hub
    }
}

#[async_trait::async_trait]
impl SheetValues for SheetsValuesClient {
    #[instrument(skip(self, token))]
    async fn values_get(
        &self,
        token: &Token,
        sheet_id: &str,
        range: &A1Notation,
    ) -> error_stack::Result<Option<Vec<Row>>, FetchError> {
        let (_, value_range) = self
            .hub(token)
            .spreadsheets()
            .values_get(sheet_id, range.as_ref())
            .doit()
            .await
            .change_context(FetchError::Service {
                range: range.to_string(),
            })
            .attach_printable_lazy(|| format!("Spreadsheet: {}", sheet_id))?;

        tracing::debug!(
            "Fetched {} rows from {}",
            value_range.values.as_ref().map_or(0, Vec::len),
            value_range.range.as_deref().unwrap_or(range.as_ref())
        );

        Ok(value_range.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sheets::{http_client::http_client, test_server::OneShotServer};
    use serde_json::json;

    async fn values_from(
        server: &OneShotServer,
    ) -> error_stack::Result<Option<Vec<Row>>, FetchError> {
        SheetsValuesClient::new(http_client())
            .with_base_url(server.base_url.clone())
            .values_get(
                &Token::new("access-1"),
                "sheet-1",
                &A1Notation::whole_sheet(),
            )
            .await
    }

    #[tokio::test]
    async fn test_values_get_returns_rows() {
        let server = OneShotServer::respond(
            "200 OK",
            r#"{ "range": "Sheet1!A1:B2", "majorDimension": "ROWS", "values": [["a", "b"], ["c"]] }"#,
        )
        .await;

        let rows = values_from(&server).await.unwrap();
        let request = server.request().await;

        assert_eq!(
            rows,
            Some(vec![vec![json!("a"), json!("b")], vec![json!("c")]])
        );
        assert!(
            request.starts_with("GET /v4/spreadsheets/sheet-1/values/"),
            "request: {request}"
        );
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer access-1"));
    }

    #[tokio::test]
    async fn test_values_get_without_values_is_none() {
        // the API leaves `values` out entirely for an empty range
        let server = OneShotServer::respond(
            "200 OK",
            r#"{ "range": "Sheet1!A1:ZZZ", "majorDimension": "ROWS" }"#,
        )
        .await;

        assert_eq!(values_from(&server).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_get_failure_names_range() {
        let server = OneShotServer::respond(
            "404 Not Found",
            r#"{ "error": { "code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND" } }"#,
        )
        .await;

        let report = values_from(&server).await.unwrap_err();

        match report.current_context() {
            FetchError::Service { range } => assert_eq!(range, "A1:ZZZ"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
