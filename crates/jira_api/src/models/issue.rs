//! Issue payloads returned by search, issue lookup and the issue picker.

use serde::{Deserialize, Serialize};

use super::deserialize_id;

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JiraIssue {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

impl JiraIssue {
    pub fn summary(&self) -> Option<&str> {
        self.fields.summary.as_deref().filter(|value| !value.trim().is_empty())
    }

    pub fn issue_type_name(&self) -> Option<&str> {
        self.fields.issuetype.as_ref().and_then(|field| field.name.as_deref())
    }

    pub fn status_name(&self) -> Option<&str> {
        self.fields.status.as_ref().and_then(|field| field.name.as_deref())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    pub summary: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub issuetype: Option<NamedField>,
    #[serde(default)]
    pub status: Option<NamedField>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct NamedField {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchResults {
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JqlSearchRequest<'a> {
    pub jql: &'a str,
    pub fields: &'a [&'a str],
    pub max_results: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IssuePickerResponse {
    #[serde(default)]
    pub sections: Vec<IssuePickerSection>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct IssuePickerSection {
    #[serde(default)]
    pub issues: Vec<IssuePickerIssue>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct IssuePickerIssue {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: String,
    pub key: String,
    /// Summary with `<b>` highlight markup around the matched text.
    pub summary_text: Option<String>,
}

impl IssuePickerResponse {
    pub fn into_issues(self) -> Vec<IssuePickerIssue> {
        self.sections
            .into_iter()
            .flat_map(|section| section.issues)
            .collect()
    }
}
