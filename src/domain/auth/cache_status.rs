use chrono::{DateTime, Utc};
use std::fmt::Formatter;

use super::{credential_bundle::CredentialBundle, scope_set::ScopeSet, token::Token};

/// Why a cache lookup produced nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum MissReason {
    #[strum(to_string = "no cached token file")]
    Missing,
    #[strum(to_string = "cached token file could not be read")]
    Unreadable,
    #[strum(to_string = "cached token file is corrupt")]
    Corrupt,
    #[strum(to_string = "cached token file has an unsupported format version")]
    UnsupportedVersion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Found(CredentialBundle),
    Absent(MissReason),
}

/// What the credential cache holds, relative to the scopes being requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    Usable(Token),
    CacheMiss(MissReason),
    ScopeMismatch {
        missing: Vec<String>,
    },
    TokenInvalid,
    TokenExpiredRefreshable {
        token: Token,
        scopes: ScopeSet,
    },
}

impl CacheStatus {
    pub fn classify(lookup: CacheLookup, requested: &ScopeSet, now: DateTime<Utc>) -> Self {
        let bundle = match lookup {
            CacheLookup::Found(bundle) => bundle,
            CacheLookup::Absent(reason) => return CacheStatus::CacheMiss(reason),
        };

        let missing = requested.missing_from(&bundle.scopes);
        if !missing.is_empty() {
            return CacheStatus::ScopeMismatch { missing };
        }

        if bundle.token.is_valid(now) {
            return CacheStatus::Usable(bundle.token);
        }

        if bundle.token.is_expired(now) && bundle.token.is_refreshable() {
            return CacheStatus::TokenExpiredRefreshable {
                token: bundle.token,
                scopes: bundle.scopes,
            };
        }

        CacheStatus::TokenInvalid
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheStatus::Usable(_) => write!(f, "Cached auth token is usable"),
            CacheStatus::CacheMiss(reason) => write!(f, "No usable auth token: {}", reason),
            CacheStatus::ScopeMismatch { missing } => write!(
                f,
                "Stored auth token has different scopes: {}",
                missing.join("; ")
            ),
            CacheStatus::TokenInvalid => write!(f, "Invalid stored auth token"),
            CacheStatus::TokenExpiredRefreshable { .. } => {
                write!(f, "Stored auth token expired and can be refreshed")
            }
        }
    }
}
