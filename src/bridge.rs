//! Worklog and parent-task DTOs shared by the staging store, the collaborators
//! and whatever front end renders them.
//!
//! Field names serialize in camelCase so the payloads can be handed to a web
//! view unchanged.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time_format::{format_time, DisplayMode};

static PROVENANCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[([A-Za-z][A-Za-z0-9_]*-\d+)\]").expect("invalid provenance regex")
});

const STAGED_ID_PREFIX: &str = "staged-";

/// A unit of logged time, either in the source list or under a destination parent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorklogEntry {
    pub id: String,
    pub issue_key: String,
    #[serde(default)]
    pub issue_summary: String,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub time_spent_seconds: u64,
    #[serde(default)]
    pub time_spent_formatted: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub author: String,
    /// Calendar day `YYYY-MM-DD`.
    #[serde(default)]
    pub started: String,
    /// Source id this staged copy was cloned from.
    #[serde(default)]
    pub original_worklog_id: Option<String>,
    /// Staged in this session, not yet confirmed remotely.
    #[serde(default)]
    pub is_new: bool,
    /// Source-side only: already represented on the destination.
    #[serde(default)]
    pub is_moved: bool,
}

impl WorklogEntry {
    pub fn new(id: impl Into<String>, issue_key: impl Into<String>, seconds: u64) -> Self {
        Self {
            id: id.into(),
            issue_key: issue_key.into(),
            issue_summary: String::new(),
            issue_type: String::new(),
            labels: Vec::new(),
            time_spent_seconds: seconds,
            time_spent_formatted: format_time(seconds, DisplayMode::Hm),
            comment: String::new(),
            author: String::new(),
            started: String::new(),
            original_worklog_id: None,
            is_new: false,
            is_moved: false,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.issue_summary = summary.into();
        self
    }

    pub fn with_issue_type(mut self, issue_type: impl Into<String>) -> Self {
        self.issue_type = issue_type.into();
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_started(mut self, started: impl Into<String>) -> Self {
        self.started = started.into();
        self
    }

    /// Re-derives the display string from the canonical seconds.
    pub fn refresh_formatted(&mut self, mode: DisplayMode) {
        self.time_spent_formatted = format_time(self.time_spent_seconds, mode);
    }

    /// Issue key from a leading `[KEY-123]` comment marker.
    ///
    /// This marker is the only link a remote record keeps back to the
    /// source worklog it was migrated from.
    pub fn provenance_key(&self) -> Option<&str> {
        PROVENANCE_REGEX
            .captures(&self.comment)
            .and_then(|capture| capture.get(1))
            .map(|key| key.as_str())
    }

    /// Clone placed under a destination parent: fresh id, staged, pointing back at `self`.
    pub fn staged_copy(&self, mode: DisplayMode) -> WorklogEntry {
        let mut staged = self.clone();
        staged.id = format!("{}{}", STAGED_ID_PREFIX, Uuid::new_v4().simple());
        staged.original_worklog_id = Some(self.id.clone());
        staged.is_new = true;
        staged.is_moved = false;
        staged.refresh_formatted(mode);
        staged
    }

    /// Text written to the destination: `[<issue key>] <comment or summary>`.
    pub fn migration_description(&self) -> String {
        if self.provenance_key() == Some(self.issue_key.as_str()) {
            return self.comment.trim().to_string();
        }
        let body = if self.comment.trim().is_empty() {
            self.issue_summary.trim()
        } else {
            self.comment.trim()
        };
        format!("[{}] {}", self.issue_key, body).trim_end().to_string()
    }
}

/// A destination issue used as a time-logging bucket.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParentTask {
    pub id: String,
    pub issue_key: String,
    #[serde(default)]
    pub issue_summary: String,
    #[serde(default, rename = "type")]
    pub issue_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub children: Vec<WorklogEntry>,
    #[serde(default)]
    pub is_expanded: bool,
    /// Remote time on the issue at the last fetch.
    #[serde(default)]
    pub initial_total_time_seconds: u64,
}

impl ParentTask {
    pub fn new(
        id: impl Into<String>,
        issue_key: impl Into<String>,
        issue_summary: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            issue_key: issue_key.into(),
            issue_summary: issue_summary.into(),
            issue_type: String::new(),
            status: String::new(),
            children: Vec::new(),
            is_expanded: true,
            initial_total_time_seconds: 0,
        }
    }

    pub fn with_children(mut self, children: Vec<WorklogEntry>) -> Self {
        self.initial_total_time_seconds = children
            .iter()
            .filter(|child| !child.is_new)
            .map(|child| child.time_spent_seconds)
            .sum();
        self.children = children;
        self
    }

    /// Empty copy of this parent's metadata, used when the server stops
    /// returning a parent that still has staged work.
    pub fn placeholder(&self, status: &str) -> ParentTask {
        ParentTask {
            id: self.id.clone(),
            issue_key: self.issue_key.clone(),
            issue_summary: self.issue_summary.clone(),
            issue_type: self.issue_type.clone(),
            status: status.to_string(),
            children: Vec::new(),
            is_expanded: self.is_expanded,
            initial_total_time_seconds: 0,
        }
    }

    pub fn has_staged_children(&self) -> bool {
        self.children.iter().any(|child| child.is_new)
    }

    pub fn child_position(&self, worklog_id: &str) -> Option<usize> {
        self.children.iter().position(|child| child.id == worklog_id)
    }

    /// Seconds of children already stored remotely.
    pub fn original_seconds(&self) -> u64 {
        self.children
            .iter()
            .filter(|child| !child.is_new)
            .map(|child| child.time_spent_seconds)
            .sum()
    }

    /// Seconds staged in this session.
    pub fn added_seconds(&self) -> u64 {
        self.children
            .iter()
            .filter(|child| child.is_new)
            .map(|child| child.time_spent_seconds)
            .sum()
    }

    pub fn total_seconds(&self) -> u64 {
        self.children.iter().map(|child| child.time_spent_seconds).sum()
    }
}

/// Count and total time of every staged child across all parents.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PendingSummary {
    pub count: usize,
    pub seconds: u64,
    pub time: String,
}

/// Staged work for one parent, in display order.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParentMigration {
    pub parent_id: String,
    pub parent_key: String,
    pub parent_summary: String,
    pub children: Vec<WorklogEntry>,
    pub total_seconds: u64,
    pub total_time: String,
}

/// A required Tempo work attribute and its allowed values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDef {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A value picked for an attribute on a Tempo worklog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AttributeChoice {
    pub key: String,
    pub value: String,
}

/// Destination issue details needed to write a worklog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIssue {
    pub id: String,
    pub key: String,
    pub summary: String,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub status: String,
}

impl ResolvedIssue {
    /// Tempo addresses issues by numeric id only.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }
}

/// One worklog create request for the destination tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogWrite {
    pub parent_key: String,
    /// Resolved numeric id; Tempo writes need it.
    pub parent_issue_id: Option<u64>,
    /// Tempo writes need the author account.
    pub author_account_id: Option<String>,
    pub time_spent_seconds: u64,
    /// Calendar day `YYYY-MM-DD`.
    pub start_date: String,
    pub description: String,
    pub attributes: Vec<AttributeChoice>,
}
