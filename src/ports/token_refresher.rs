use thiserror::Error;

use crate::domain::auth::token::Token;

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Token has no refresh token")]
    MissingRefreshToken,
    #[error("Failed to read client secret")]
    ClientSecret,
    #[error("Token refresh request failed")]
    Request,
    #[error("Token endpoint rejected the refresh ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Malformed token endpoint response")]
    MalformedResponse,
}

#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, token: &Token) -> error_stack::Result<Token, RefreshError>;
}
