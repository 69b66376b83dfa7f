use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use config::{Config, Environment, File, Map};
use error_stack::{report, ResultExt};
use thiserror::Error;

use crate::domain::auth::scope_set::{ScopeSet, SPREADSHEETS_SCOPE};

pub const ENV_PREFIX: &str = "SHEET_READER";
pub const CONFIG_FILE_ENV: &str = "SHEET_READER_CONFIG";
pub const DEFAULT_CONF_DIR_NAME: &str = ".google";
pub const CLIENT_SECRET_FILE: &str = "credentials.json";
pub const TOKEN_CACHE_FILE: &str = "auth-token.json";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("HOME is not set and no configuration directory was given")]
    HomeNotSet,
    #[error("Failed to build configuration")]
    Build,
}

#[derive(serde::Deserialize, Debug)]
struct RawConfig {
    conf_dir: Option<PathBuf>,
    log_level: String,
    scopes: ScopeSet,
}

/// Process-wide settings, built once in `main` and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub conf_dir: PathBuf,
    pub log_level: String,
    pub scopes: ScopeSet,
}

impl AppConfig {
    pub fn for_conf_dir<P: Into<PathBuf>>(conf_dir: P) -> Self {
        AppConfig {
            conf_dir: conf_dir.into(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            scopes: ScopeSet::spreadsheets(),
        }
    }

    /// Reads `HOME`, an optional file named by `SHEET_READER_CONFIG`, and
    /// `SHEET_READER_*` overrides from the process environment.
    pub fn load() -> error_stack::Result<Self, ConfigError> {
        let config_file = std::env::var_os(CONFIG_FILE_ENV).map(PathBuf::from);
        Self::load_from(
            std::env::var_os("HOME"),
            config_file.as_deref(),
            None,
        )
    }

    /// `env` replaces the process environment when given.
    pub fn load_from(
        home: Option<OsString>,
        config_file: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> error_stack::Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("log_level", DEFAULT_LOG_LEVEL)
            .change_context(ConfigError::Build)?
            .set_default("scopes", vec![SPREADSHEETS_SCOPE.to_string()])
            .change_context(ConfigError::Build)?;

        if let Some(home) = home {
            let conf_dir = PathBuf::from(home).join(DEFAULT_CONF_DIR_NAME);
            builder = builder
                .set_default("conf_dir", conf_dir.to_string_lossy().into_owned())
                .change_context(ConfigError::Build)?;
        }

        if let Some(config_file) = config_file {
            builder = builder.add_source(File::from(config_file));
        }

        let raw: RawConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(" ")
                    .with_list_parse_key("scopes")
                    .source(env),
            )
            .build()
            .change_context(ConfigError::Build)?
            .try_deserialize()
            .change_context(ConfigError::Build)?;

        Ok(AppConfig {
            conf_dir: raw.conf_dir.ok_or(report!(ConfigError::HomeNotSet))?,
            log_level: raw.log_level,
            scopes: raw.scopes,
        })
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.conf_dir.join(CLIENT_SECRET_FILE)
    }

    pub fn token_cache_path(&self) -> PathBuf {
        self.conf_dir.join(TOKEN_CACHE_FILE)
    }

    /// Falls back to `WARN` for unknown level names.
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::WARN)
    }
}
