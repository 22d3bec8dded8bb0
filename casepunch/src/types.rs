use serde::{Deserialize, Serialize};
use std::fmt;

/// Login pair forwarded verbatim to the remote site. Never persisted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credentials {
    pub user_id: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            password: password.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Ordered case identifiers as they appear in the remote case table.
/// Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseList(Vec<String>);

impl CaseList {
    pub fn new(keys: Vec<String>) -> Self {
        Self(keys)
    }

    /// Parse a comma-joined case list, trimming segments and dropping empty ones.
    pub fn from_joined(joined: &str) -> Self {
        Self(
            joined
                .split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// The comma-joined form the remote site expects as `table_case_id_list`.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for CaseList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl<'a> IntoIterator for &'a CaseList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
