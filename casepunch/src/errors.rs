use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`PunchError`], surfaced to drivers that want
/// to tell an environmental problem apart from a malformed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Network error, timeout or non-success HTTP status.
    Transport,
    /// An expected element or table was missing from a page.
    Parse,
    /// The record itself is malformed (missing or non-numeric key).
    Data,
    /// Invalid local configuration.
    Config,
}

#[derive(Error, Debug)]
pub enum PunchError {
    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Element not found: {0}")]
    MissingElement(String),

    #[error("No cases found in the case list table")]
    NoCases,

    #[error("Invalid case key {value:?}: {reason}")]
    InvalidKey { value: String, reason: String },

    #[error("Failed to serialize fields: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PunchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PunchError::Request { .. } | PunchError::Status { .. } => ErrorKind::Transport,
            PunchError::MissingElement(_) | PunchError::NoCases => ErrorKind::Parse,
            PunchError::InvalidKey { .. } | PunchError::Serialize(_) => ErrorKind::Data,
            PunchError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, PunchError::Request { source, .. } if source.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        let status = PunchError::Status {
            endpoint: "case_list".to_string(),
            status: 502,
        };
        assert_eq!(status.kind(), ErrorKind::Transport);
        assert_eq!(PunchError::NoCases.kind(), ErrorKind::Parse);
        assert_eq!(
            PunchError::MissingElement("table#caselist1".into()).kind(),
            ErrorKind::Parse
        );
        let key = PunchError::InvalidKey {
            value: "abc".into(),
            reason: "invalid digit found in string".into(),
        };
        assert_eq!(key.kind(), ErrorKind::Data);
        assert!(!key.is_timeout());
    }

    #[test]
    fn status_message_names_the_endpoint() {
        let err = PunchError::Status {
            endpoint: "sql_for_case".to_string(),
            status: 500,
        };
        assert_eq!(err.to_string(), "sql_for_case returned HTTP 500");
    }
}
