//! Tempo Cloud v4 payloads.

use serde::{Deserialize, Serialize};

use super::deserialize_id;

#[derive(Debug, Deserialize, Clone)]
pub struct TempoPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub metadata: Option<TempoMetadata>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TempoMetadata {
    pub count: Option<u64>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TempoWorklog {
    #[serde(deserialize_with = "deserialize_id")]
    pub tempo_worklog_id: String,
    #[serde(default)]
    pub issue: Option<TempoIssueRef>,
    #[serde(default)]
    pub time_spent_seconds: u64,
    /// Calendar day `YYYY-MM-DD`.
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TempoIssueRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
}

/// A work attribute definition (`/4/work-attributes`).
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkAttribute {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TempoWorklogCreate {
    pub issue_id: u64,
    pub time_spent_seconds: u64,
    pub start_date: String,
    pub start_time: String,
    pub description: String,
    pub author_account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<AttributeValue>>,
}
