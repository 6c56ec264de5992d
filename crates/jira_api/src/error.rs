//! Error model shared by the Jira and Tempo client operations.

use std::io;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JiraError>;

/// Failure conditions surfaced by Jira or Tempo requests: non-success HTTP statuses, rejected credentials, timeouts, transport problems, payload decoding and invalid client configuration.
#[derive(Debug, Error)]
pub enum JiraError {
    #[error("http {status}: {message}")]
    Http {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl JiraError {
    /// Builds an HTTP error, keeping the first Jira error message as `code` when the body carries one.
    pub fn http(status: StatusCode, code: Option<String>, message: impl Into<String>) -> Self {
        JiraError::Http {
            status,
            code,
            message: message.into(),
        }
    }

    /// True for 404 responses, which callers usually treat as "nothing there".
    pub fn is_not_found(&self) -> bool {
        matches!(self, JiraError::Http { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

impl From<reqwest::Error> for JiraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JiraError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            JiraError::Http {
                status,
                code: None,
                message: err.to_string(),
            }
        } else if err.is_connect() {
            JiraError::Network(err.to_string())
        } else if err.is_decode() {
            JiraError::Serialization(err.to_string())
        } else {
            JiraError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for JiraError {
    fn from(err: serde_json::Error) -> Self {
        JiraError::Serialization(err.to_string())
    }
}
