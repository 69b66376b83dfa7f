use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use error_stack::{report, ResultExt};
use google_sheets4::oauth2;
use tracing::instrument;

use crate::{
    domain::auth::token::Token,
    ports::token_refresher::{RefreshError, TokenRefresher},
};

/// Exchanges a refresh token at the `token_uri` named in the client secret file.
#[derive(Debug, Clone)]
pub struct OAuthTokenRefresher {
    credentials_path: PathBuf,
    http: reqwest::Client,
}

#[derive(serde::Deserialize, Debug)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

impl RefreshResponse {
    fn into_token(self, previous: &Token, now: DateTime<Utc>) -> Token {
        Token {
            access_token: self.access_token,
            // Google usually omits the refresh token on refresh; keep the old one
            refresh_token: self.refresh_token.or_else(|| previous.refresh_token.clone()),
            expires_at: self
                .expires_in
                .map(|expires_in| now + Duration::seconds(expires_in)),
            token_type: self.token_type.or_else(|| previous.token_type.clone()),
        }
    }
}

impl OAuthTokenRefresher {
    pub fn new<P: Into<PathBuf>>(credentials_path: P) -> Self {
        Self::with_client(credentials_path, reqwest::Client::new())
    }

    pub fn with_client<P: Into<PathBuf>>(credentials_path: P, http: reqwest::Client) -> Self {
        OAuthTokenRefresher {
            credentials_path: credentials_path.into(),
            http,
        }
    }
}

#[async_trait::async_trait]
impl TokenRefresher for OAuthTokenRefresher {
    #[instrument(skip(self, token))]
    async fn refresh(&self, token: &Token) -> error_stack::Result<Token, RefreshError> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .filter(|refresh_token| !refresh_token.is_empty())
            .ok_or(report!(RefreshError::MissingRefreshToken))?;

        let secret = oauth2::read_application_secret(&self.credentials_path)
            .await
            .change_context(RefreshError::ClientSecret)
            .attach_printable_lazy(|| {
                format!("Could not read {}", self.credentials_path.display())
            })?;

        let response = self
            .http
            .post(&secret.token_uri)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .change_context(RefreshError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(report!(RefreshError::Rejected {
                status: status.as_u16(),
                body,
            }));
        }

        let payload: RefreshResponse = response
            .json()
            .await
            .change_context(RefreshError::MalformedResponse)?;

        tracing::debug!("Refreshed auth token");
        Ok(payload.into_token(token, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sheets::test_server::OneShotServer;
    use std::path::Path;

    fn write_client_secret(dir: &Path, token_uri: &str) -> PathBuf {
        let path = dir.join("credentials.json");
        let secret = serde_json::json!({
            "installed": {
                "client_id": "client-123.apps.googleusercontent.com",
                "client_secret": "s3cret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": token_uri,
                "redirect_uris": ["http://localhost"]
            }
        });
        std::fs::write(&path, secret.to_string()).unwrap();
        path
    }

    async fn refresh_against(
        server: &OneShotServer,
        dir: &Path,
    ) -> error_stack::Result<Token, RefreshError> {
        let credentials_path = write_client_secret(dir, &format!("{}token", server.base_url));
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        let refresher = OAuthTokenRefresher::with_client(credentials_path, http);

        refresher
            .refresh(
                &Token::new("stale")
                    .with_refresh_token("rt-456")
                    .with_token_type("Bearer"),
            )
            .await
    }

    fn now() -> DateTime<Utc> {
        "2024-05-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_refresh_response_keeps_previous_refresh_token() {
        let previous = Token::new("old")
            .with_refresh_token("1//refresh")
            .with_token_type("Bearer");
        let response: RefreshResponse = serde_json::from_str(
            r#"{ "access_token": "new", "expires_in": 3599, "scope": "x", "token_type": "Bearer" }"#,
        )
        .unwrap();

        let token = response.into_token(&previous, now());

        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(token.expires_at, Some(now() + Duration::seconds(3599)));
        assert_eq!(token.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn test_refresh_response_with_rotated_refresh_token() {
        let previous = Token::new("old").with_refresh_token("1//old");
        let response: RefreshResponse = serde_json::from_str(
            r#"{ "access_token": "new", "refresh_token": "1//rotated" }"#,
        )
        .unwrap();

        let token = response.into_token(&previous, now());

        assert_eq!(token.refresh_token.as_deref(), Some("1//rotated"));
        assert_eq!(token.expires_at, None);
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_fails_early() {
        let refresher = OAuthTokenRefresher::new("/nonexistent/credentials.json");

        let report = refresher.refresh(&Token::new("access")).await.unwrap_err();

        assert!(matches!(
            report.current_context(),
            RefreshError::MissingRefreshToken
        ));
    }

    #[tokio::test]
    async fn test_refresh_without_client_secret_fails() {
        let dir = tempfile::tempdir().unwrap();
        let refresher = OAuthTokenRefresher::new(dir.path().join("credentials.json"));

        let report = refresher
            .refresh(&Token::new("access").with_refresh_token("1//refresh"))
            .await
            .unwrap_err();

        assert!(matches!(report.current_context(), RefreshError::ClientSecret));
    }

    #[tokio::test]
    async fn test_refresh_posts_form_to_token_uri() {
        let dir = tempfile::tempdir().unwrap();
        let server = OneShotServer::respond(
            "200 OK",
            r#"{ "access_token": "fresh", "expires_in": 3599, "token_type": "Bearer" }"#,
        )
        .await;

        let token = refresh_against(&server, dir.path()).await.unwrap();
        let request = server.request().await;

        assert!(request.starts_with("POST /token "), "request: {request}");
        assert!(request
            .to_ascii_lowercase()
            .contains("content-type: application/x-www-form-urlencoded"));
        let body = request.split("\r\n\r\n").nth(1).unwrap();
        let mut fields: Vec<&str> = body.split('&').collect();
        fields.sort();
        assert_eq!(
            fields,
            vec![
                "client_id=client-123.apps.googleusercontent.com",
                "client_secret=s3cret",
                "grant_type=refresh_token",
                "refresh_token=rt-456",
            ]
        );

        assert_eq!(token.access_token, "fresh");
        assert_eq!(token.refresh_token.as_deref(), Some("rt-456"));
        assert!(token.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_refresh_rejected_by_token_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let server =
            OneShotServer::respond("400 Bad Request", r#"{ "error": "invalid_grant" }"#).await;

        let report = refresh_against(&server, dir.path()).await.unwrap_err();

        match report.current_context() {
            RefreshError::Rejected { status, body } => {
                assert_eq!(*status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_with_non_json_response_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let server = OneShotServer::respond("200 OK", "<html>oops</html>").await;

        let report = refresh_against(&server, dir.path()).await.unwrap_err();

        assert!(matches!(
            report.current_context(),
            RefreshError::MalformedResponse
        ));
    }
}
