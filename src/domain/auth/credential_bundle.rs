use serde::{Deserialize, Serialize};

use super::{scope_set::ScopeSet, token::Token};

pub const BUNDLE_VERSION: u32 = 1;

/// The on-disk pairing of a granted scope set with its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialBundle {
    pub version: u32,
    pub scopes: ScopeSet,
    pub token: Token,
}

impl CredentialBundle {
    pub fn new(scopes: ScopeSet, token: Token) -> Self {
        CredentialBundle {
            version: BUNDLE_VERSION,
            scopes,
            token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_json_layout() {
        let bundle = CredentialBundle::new(
            ScopeSet::new(["b", "a"]),
            Token::new("access").with_refresh_token("refresh"),
        );

        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "version": 1,
                "scopes": ["a", "b"],
                "token": {
                    "access_token": "access",
                    "refresh_token": "refresh"
                }
            })
        );
    }

    #[test]
    fn test_bundle_parses_expiry() {
        let bundle: CredentialBundle = serde_json::from_str(
            r#"{
                "version": 1,
                "scopes": ["https://www.googleapis.com/auth/spreadsheets"],
                "token": {
                    "access_token": "access",
                    "expires_at": "2024-05-01T12:00:00Z",
                    "token_type": "Bearer"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(bundle.scopes, ScopeSet::spreadsheets());
        assert_eq!(
            bundle.token.expires_at,
            Some("2024-05-01T12:00:00Z".parse().unwrap())
        );
        assert_eq!(bundle.token.token_type.as_deref(), Some("Bearer"));
    }
}
