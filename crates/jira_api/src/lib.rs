//! Typed Jira REST and Tempo Cloud client crate used by the worklog bridge.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limiter;
pub mod tempo;

pub use client::{JiraClient, DEFAULT_SEARCH_LIMIT};
pub use config::{AuthMethod, JiraConfig, TempoConfig};
pub use error::{JiraError, Result};
pub use models::{
    AttributeValue, IssuePickerIssue, JiraIssue, JiraUser, JiraWorklog, TempoWorklog,
    TempoWorklogCreate, WorkAttribute, WorklogAuthor, WorklogCreateRequest,
};
pub use rate_limiter::RateLimiter;
pub use tempo::TempoClient;
