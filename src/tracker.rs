//! Collaborator seams between the staging engine and the remote trackers.
//!
//! Implementations may fail; callers downgrade failures to "no data" and keep
//! going, so a broken connection never corrupts local staging state.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::bridge::{AttributeDef, ParentTask, ResolvedIssue, WorklogEntry, WorklogWrite};
use crate::error::Result;

/// Tracker the time was originally logged in. Read only.
#[async_trait]
pub trait SourceTracker: Send + Sync {
    async fn fetch_worklogs(&self, date: NaiveDate) -> Result<Vec<WorklogEntry>>;
}

/// Tracker the time is migrated to, natively or through Tempo.
#[async_trait]
pub trait DestinationTracker: Send + Sync {
    /// Writes go through Tempo and need resolved ids, an author and attributes.
    fn uses_time_tracking_addon(&self) -> bool;

    async fn fetch_parents(&self, date: NaiveDate) -> Result<Vec<ParentTask>>;

    async fn search_issues(&self, query: &str) -> Result<Vec<ParentTask>>;

    async fn current_account_id(&self) -> Result<Option<String>>;

    async fn resolve_issue(&self, key_or_id: &str) -> Result<Option<ResolvedIssue>>;

    async fn fetch_required_attribute_definitions(&self) -> Result<Vec<AttributeDef>>;

    async fn create_worklog(&self, write: &WorklogWrite) -> Result<bool>;

    async fn delete_worklog(&self, worklog_id: &str, parent_key_or_id: &str) -> Result<bool>;
}
