mod issue;
mod tempo;
mod user;
mod worklog;

pub use issue::{
    IssueFields, IssuePickerIssue, IssuePickerResponse, IssuePickerSection, JiraIssue,
    JqlSearchRequest, NamedField, SearchResults,
};
pub use tempo::{
    AttributeValue, TempoIssueRef, TempoMetadata, TempoPage, TempoWorklog, TempoWorklogCreate,
    WorkAttribute,
};
pub use user::JiraUser;
pub use worklog::{JiraWorklog, WorklogAuthor, WorklogCreateRequest, WorklogPage};

use serde::de::Deserializer;
use serde::Deserialize;
use serde_json::Value;

/// Accepts ids delivered either as JSON strings (Jira) or numbers (Tempo).
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
