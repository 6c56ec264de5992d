//! User-authored routing rules that pick a destination parent for a worklog.

use serde::{Deserialize, Serialize};

use crate::bridge::WorklogEntry;

/// Which worklog attribute a rule compares against.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    /// Source issue key.
    Task,
    Label,
    /// Source issue type name.
    Type,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRule {
    pub source_type: RuleSource,
    pub source_value: String,
    pub target_task_key: String,
    #[serde(default)]
    pub target_task_summary: String,
}

impl MigrationRule {
    pub fn new(
        source_type: RuleSource,
        source_value: impl Into<String>,
        target_task_key: impl Into<String>,
    ) -> Self {
        Self {
            source_type,
            source_value: source_value.into(),
            target_task_key: target_task_key.into(),
            target_task_summary: String::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.target_task_summary = summary.into();
        self
    }

    pub fn matches(&self, worklog: &WorklogEntry) -> bool {
        let expected = self.source_value.trim();
        if expected.is_empty() {
            return false;
        }
        match self.source_type {
            RuleSource::Task => worklog.issue_key == expected,
            RuleSource::Label => worklog.labels.iter().any(|label| label == expected),
            RuleSource::Type => worklog.issue_type == expected,
        }
    }
}

/// First rule in list order matching `worklog`.
///
/// Entries already marked moved never match, so a second pass over the same
/// source list stages nothing new. Callers also skip entries already staged
/// under the rule's target.
pub fn match_rule<'a>(worklog: &WorklogEntry, rules: &'a [MigrationRule]) -> Option<&'a MigrationRule> {
    if worklog.is_moved {
        return None;
    }
    rules.iter().find(|rule| rule.matches(worklog))
}
