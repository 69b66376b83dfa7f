use thiserror::Error;

use crate::domain::{
    auth::token::Token,
    sheets::{a1_notation::A1Notation, row::Row},
};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to obtain credentials")]
    Credentials,
    #[error("Failed to fetch range {range}")]
    Service { range: String },
}

#[async_trait::async_trait]
pub trait SheetValues: Send + Sync {
    /// `Ok(None)` when the service reports no values for the range.
    async fn values_get(
        &self,
        token: &Token,
        sheet_id: &str,
        range: &A1Notation,
    ) -> error_stack::Result<Option<Vec<Row>>, FetchError>;
}
