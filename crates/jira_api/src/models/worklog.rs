//! Native Jira worklog payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::deserialize_id;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JiraWorklog {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub author: Option<WorklogAuthor>,
    /// Timestamp such as `2024-05-14T09:00:00.000+0000`.
    #[serde(default)]
    pub started: String,
    #[serde(default)]
    pub time_spent_seconds: u64,
    /// Plain text on REST v2, Atlassian document format on v3.
    #[serde(default)]
    pub comment: Option<Value>,
}

impl JiraWorklog {
    pub fn started_on(&self, date: &str) -> bool {
        self.started.starts_with(date)
    }

    /// Flattens the comment to plain text regardless of API version.
    pub fn comment_text(&self) -> Option<String> {
        let text = match self.comment.as_ref()? {
            Value::String(text) => text.clone(),
            document @ Value::Object(_) => {
                let mut lines = Vec::new();
                collect_document_text(document, &mut lines);
                lines.join("\n")
            }
            _ => return None,
        };
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

fn collect_document_text(node: &Value, lines: &mut Vec<String>) {
    let Some(children) = node.get("content").and_then(Value::as_array) else {
        return;
    };
    let mut line = String::new();
    for child in children {
        match child.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = child.get("text").and_then(Value::as_str) {
                    line.push_str(text);
                }
            }
            Some("hardBreak") => line.push('\n'),
            _ => collect_document_text(child, lines),
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorklogAuthor {
    pub account_id: Option<String>,
    pub email_address: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WorklogPage {
    #[serde(default)]
    pub worklogs: Vec<JiraWorklog>,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorklogCreateRequest {
    pub time_spent_seconds: u64,
    pub started: String,
    pub comment: String,
}
