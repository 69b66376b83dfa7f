use std::{
    fs, io,
    path::{Path, PathBuf},
};

use error_stack::ResultExt;
use tracing::instrument;

use crate::{
    domain::auth::{
        cache_status::{CacheLookup, MissReason},
        credential_bundle::{CredentialBundle, BUNDLE_VERSION},
    },
    ports::credential_store::{CacheError, CredentialStore},
};

use super::private_fs;

/// Credential bundle stored as JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

#[derive(serde::Deserialize)]
struct VersionProbe {
    version: u32,
}

impl TokenCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        TokenCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for TokenCache {
    #[instrument]
    fn load(&self) -> CacheLookup {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return CacheLookup::Absent(MissReason::Missing)
            }
            Err(err) => {
                tracing::debug!("Failed to read {}: {}", self.path.display(), err);
                return CacheLookup::Absent(MissReason::Unreadable);
            }
        };

        // Check the version first so a newer layout is not reported as corrupt
        match serde_json::from_str::<VersionProbe>(&contents) {
            Ok(probe) if probe.version != BUNDLE_VERSION => {
                tracing::debug!(
                    "{} has version {}, expected {}",
                    self.path.display(),
                    probe.version,
                    BUNDLE_VERSION
                );
                return CacheLookup::Absent(MissReason::UnsupportedVersion);
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!("Failed to parse {}: {}", self.path.display(), err);
                return CacheLookup::Absent(MissReason::Corrupt);
            }
        }

        match serde_json::from_str::<CredentialBundle>(&contents) {
            Ok(bundle) => CacheLookup::Found(bundle),
            Err(err) => {
                tracing::debug!("Failed to parse {}: {}", self.path.display(), err);
                CacheLookup::Absent(MissReason::Corrupt)
            }
        }
    }

    #[instrument(skip(bundle))]
    fn save(&self, bundle: &CredentialBundle) -> error_stack::Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            private_fs::ensure_private_dir(parent)
                .change_context(CacheError::Write)
                .attach_printable_lazy(|| format!("Could not prepare {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(bundle).change_context(CacheError::Write)?;

        private_fs::write_private(&self.path, json.as_bytes())
            .change_context(CacheError::Write)
            .attach_printable_lazy(|| format!("Could not write {}", self.path.display()))?;

        tracing::debug!("Saved credentials to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::{scope_set::ScopeSet, token::Token};

    fn cache_in(dir: &tempfile::TempDir) -> TokenCache {
        TokenCache::new(dir.path().join(".google").join("auth-token.json"))
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            cache_in(&dir).load(),
            CacheLookup::Absent(MissReason::Missing)
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        let bundle = CredentialBundle::new(
            ScopeSet::spreadsheets(),
            Token::new("access")
                .with_refresh_token("refresh")
                .with_expiry("2030-01-01T00:00:00Z".parse().unwrap()),
        );

        cache.save(&bundle).unwrap();

        assert_eq!(cache.load(), CacheLookup::Found(bundle));
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        fs::write(cache.path(), b"\x80\x04\x95 not json").unwrap();

        // Invalid UTF-8 fails in read_to_string
        assert_eq!(cache.load(), CacheLookup::Absent(MissReason::Unreadable));

        fs::write(cache.path(), "{ \"version\": 1, \"scopes\": ").unwrap();
        assert_eq!(cache.load(), CacheLookup::Absent(MissReason::Corrupt));

        fs::write(cache.path(), r#"{ "version": 1, "scopes": [] }"#).unwrap();
        assert_eq!(cache.load(), CacheLookup::Absent(MissReason::Corrupt));
    }

    #[test]
    fn test_other_version_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        fs::write(
            cache.path(),
            r#"{ "version": 2, "grants": { "anything": true } }"#,
        )
        .unwrap();

        assert_eq!(
            cache.load(),
            CacheLookup::Absent(MissReason::UnsupportedVersion)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(&dir);
        cache
            .save(&CredentialBundle::new(ScopeSet::spreadsheets(), Token::new("a")))
            .unwrap();

        let file_mode = fs::metadata(cache.path()).unwrap().permissions().mode();
        let dir_mode = fs::metadata(cache.path().parent().unwrap())
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(file_mode & 0o777, 0o600);
        assert_eq!(dir_mode & 0o777, 0o700);
    }
}
