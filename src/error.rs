//! Error type for store mutations, collaborators and configuration.

use jira_api::JiraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("parent task {0} is not loaded")]
    ParentNotFound(String),
    #[error("worklog {0} is not loaded")]
    WorklogNotFound(String),
    #[error("worklog {0} is already staged or migrated")]
    AlreadyStaged(String),
    #[error("worklog {0} is already stored remotely and can only be reordered within its parent")]
    HistoricalReparent(String),
    #[error("remote tracker error: {0}")]
    Remote(#[from] JiraError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
