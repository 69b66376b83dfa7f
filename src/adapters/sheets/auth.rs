use std::{
    future::Future,
    io,
    path::{Path, PathBuf},
    pin::Pin,
    process::Stdio,
    sync::{Arc, Mutex},
};

use chrono::{TimeZone, Utc};
use error_stack::{report, Report, ResultExt};
use google_sheets4::oauth2::{
    self,
    authenticator_delegate::InstalledFlowDelegate,
    storage::{TokenInfo, TokenStorage},
    InstalledFlowAuthenticator, InstalledFlowReturnMethod,
};
use tracing::instrument;

use crate::{
    adapters::cache::private_fs,
    config::app_config::AppConfig,
    domain::auth::{scope_set::ScopeSet, token::Token},
    ports::authorizer::{AuthorizeError, Authorizer},
};

use super::http_client::HttpsClient;

pub fn authorization_guidance(credentials_path: &Path) -> String {
    format!(
        "\nPlease download Google client configuration from ENABLE GOOGLE SHEETS API button\n\
         at https://developers.google.com/sheets/api/quickstart/python to \"{}\"\n",
        credentials_path.display()
    )
}

/// Runs the installed-application consent flow with a loopback redirect.
pub struct InstalledFlowAuthorizer {
    conf_dir: PathBuf,
    credentials_path: PathBuf,
    client: HttpsClient,
}

impl std::fmt::Debug for InstalledFlowAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "InstalledFlowAuthorizer {{ credentials_path: {:?} }}",
            self.credentials_path
        )
    }
}

impl InstalledFlowAuthorizer {
    pub fn new(config: &AppConfig, client: HttpsClient) -> Self {
        InstalledFlowAuthorizer {
            conf_dir: config.conf_dir.clone(),
            credentials_path: config.credentials_path(),
            client,
        }
    }

    async fn run_consent_flow(
        &self,
        secret: oauth2::ApplicationSecret,
        scopes: &ScopeSet,
    ) -> error_stack::Result<Token, AuthorizeError> {
        let captured = CapturedToken::default();
        let authenticator = InstalledFlowAuthenticator::with_client(
            secret,
            InstalledFlowReturnMethod::HTTPRedirect,
            self.client.clone(),
        )
        .flow_delegate(Box::new(BrowserFlowDelegate))
        .with_storage(Box::new(captured.clone()))
        .build()
        .await
        .change_context(AuthorizeError::ConsentFlow)?;

        let access_token = authenticator
            .token(&scopes.as_strs())
            .await
            .change_context(AuthorizeError::ConsentFlow)?;

        captured
            .take()
            .and_then(token_from_info)
            .or_else(|| {
                access_token
                    .token()
                    .filter(|token| !token.is_empty())
                    .map(Token::new)
            })
            .ok_or(report!(AuthorizeError::ConsentFlow))
            .attach_printable("Consent flow returned no access token")
    }

    /// Repeats the setup guidance; a stale client configuration also fails here.
    fn consent_flow_failed(&self, report: Report<AuthorizeError>) -> Report<AuthorizeError> {
        eprint!("{}", authorization_guidance(&self.credentials_path));
        report.attach_printable(format!(
            "Client configuration: {}",
            self.credentials_path.display()
        ))
    }
}

#[async_trait::async_trait]
impl Authorizer for InstalledFlowAuthorizer {
    #[instrument(skip(self))]
    async fn authorize(&self, scopes: &ScopeSet) -> error_stack::Result<Token, AuthorizeError> {
        let secret = match oauth2::read_application_secret(&self.credentials_path).await {
            Ok(secret) => secret,
            Err(err) => {
                eprint!("{}", authorization_guidance(&self.credentials_path));
                // help the user keep the directory private while they add the file
                private_fs::ensure_private_dir(&self.conf_dir)
                    .change_context(AuthorizeError::PrepareConfDir)
                    .attach_printable_lazy(|| {
                        format!("Could not prepare {}", self.conf_dir.display())
                    })?;
                return Err(report!(err).change_context(AuthorizeError::MissingClientSecret {
                    path: self.credentials_path.clone(),
                }));
            }
        };

        let token = self
            .run_consent_flow(secret, scopes)
            .await
            .map_err(|report| self.consent_flow_failed(report))?;

        tracing::info!(
            "Authorized scopes {} (refresh token: {})",
            scopes,
            token.is_refreshable()
        );
        Ok(token)
    }
}

/// Storage that never returns a token, forcing a fresh consent flow, and
/// keeps the one the flow produced so its refresh token can be cached.
#[derive(Clone, Default)]
struct CapturedToken(Arc<Mutex<Option<TokenInfo>>>);

impl CapturedToken {
    fn take(&self) -> Option<TokenInfo> {
        self.0.lock().ok().and_then(|mut guard| guard.take())
    }
}

#[async_trait::async_trait]
impl TokenStorage for CapturedToken {
    async fn set(&self, _scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        {
            let mut guard = self
                .0
                .lock()
                .map_err(|_| anyhow::anyhow!("captured token lock poisoned"))?;
            *guard = Some(token);
        }
        Ok(())
    }

    async fn get(&self, _scopes: &[&str]) -> Option<TokenInfo> {
        None
    }
}

fn token_from_info(info: TokenInfo) -> Option<Token> {
    let access_token = info.access_token.filter(|token| !token.is_empty())?;
    let mut token = Token::new(access_token).with_token_type("Bearer");

    if let Some(refresh_token) = info.refresh_token {
        token = token.with_refresh_token(refresh_token);
    }

    if let Some(expires_at) = info
        .expires_at
        .and_then(|expires_at| Utc.timestamp_opt(expires_at.unix_timestamp(), 0).single())
    {
        token = token.with_expiry(expires_at);
    }

    Some(token)
}

struct BrowserFlowDelegate;

impl InstalledFlowDelegate for BrowserFlowDelegate {
    fn present_user_url<'a>(
        &'a self,
        url: &'a str,
        need_code: bool,
    ) -> Pin<Box<dyn Future<Output = Result<String, String>> + Send + 'a>> {
        Box::pin(present_user_url(url, need_code))
    }
}

async fn present_user_url(url: &str, need_code: bool) -> Result<String, String> {
    eprintln!(
        "Opening your browser to authorize access. If it does not open, visit:\n\n{}\n",
        url
    );
    if let Err(err) = open_in_browser(url) {
        tracing::warn!("Could not open a browser: {}", err);
    }

    if !need_code {
        return Ok(String::new());
    }

    eprint!("Enter the authorization code: ");
    let mut code = String::new();
    io::stdin()
        .read_line(&mut code)
        .map_err(|err| format!("Failed to read authorization code: {}", err))?;
    Ok(code.trim().to_string())
}

fn open_in_browser(url: &str) -> io::Result<()> {
    let (program, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(windows) {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    };

    tokio::process::Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}
