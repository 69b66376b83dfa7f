use serde::{Deserialize, Serialize};
use std::fmt::Formatter;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Permission strings requested from the identity provider.
///
/// Always kept sorted and free of duplicates, so two sets holding the same
/// scopes compare (and serialize) identically regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ScopeSet(Vec<String>);

impl ScopeSet {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scopes: Vec<String> = scopes.into_iter().map(Into::into).collect();
        scopes.sort();
        scopes.dedup();
        ScopeSet(scopes)
    }

    pub fn spreadsheets() -> Self {
        ScopeSet::new([SPREADSHEETS_SCOPE])
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.binary_search_by(|s| s.as_str().cmp(scope)).is_ok()
    }

    /// Scopes of `self` that `stored` does not grant, in sorted order.
    pub fn missing_from(&self, stored: &ScopeSet) -> Vec<String> {
        self.0
            .iter()
            .filter(|scope| !stored.contains(scope))
            .cloned()
            .collect()
    }

    pub fn as_strs(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }
}

impl Default for ScopeSet {
    fn default() -> Self {
        ScopeSet::spreadsheets()
    }
}

impl From<Vec<String>> for ScopeSet {
    fn from(scopes: Vec<String>) -> Self {
        ScopeSet::new(scopes)
    }
}

impl From<ScopeSet> for Vec<String> {
    fn from(scopes: ScopeSet) -> Self {
        scopes.0
    }
}

impl std::fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("; "))
    }
}
