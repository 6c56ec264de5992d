//! Sequential migration of staged worklogs to the destination tracker.
//!
//! Each staged child becomes one create request. A failed item is counted and
//! logged and the batch carries on; nothing is retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;

use crate::bridge::{AttributeChoice, AttributeDef, ParentMigration, WorklogWrite};
use crate::tracker::DestinationTracker;

const CATEGORY_ATTRIBUTE_NAME: &str = "Category";
const CATEGORY_ATTRIBUTE_KEY: &str = "_Category_";
const DEVELOPMENT_KEYWORDS: &[&str] = &["development", "coding", "dev"];
const COMMUNICATION_KEYWORDS: &[&str] = &["communication", "management"];
const FALLBACK_ATTRIBUTE_VALUE: &str = "Dev";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MigrationPhase {
    Init,
    FetchingAttributes,
    PreparingParent,
    Migrating,
    Completed,
    Cancelled,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationProgress {
    pub current: usize,
    pub total: usize,
    pub percentage: u8,
    pub current_parent: Option<String>,
    pub current_worklog: Option<String>,
    pub phase: MigrationPhase,
}

/// Batch result. `success` only means at least one item was written.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationOutcome {
    pub success: bool,
    pub migrated_count: usize,
    pub failed_count: usize,
    pub total: usize,
    /// Staged child ids that were written.
    pub migrated_worklog_ids: Vec<String>,
    pub cancelled: bool,
}

/// Stops a running batch after the item in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Picks one value per required attribute.
///
/// The category attribute is matched against the parent summary: development
/// work prefers `Coding` then `Development`, communication or management work
/// prefers `Communication & Management` then `Communication`. Anything else
/// takes the first allowed value, or `Dev` when none are listed.
pub fn select_attribute_values(definitions: &[AttributeDef], parent_summary: &str) -> Vec<AttributeChoice> {
    let summary = parent_summary.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|keyword| summary.contains(keyword));

    definitions
        .iter()
        .filter(|definition| definition.required)
        .map(|definition| {
            let is_category =
                definition.name == CATEGORY_ATTRIBUTE_NAME || definition.key == CATEGORY_ATTRIBUTE_KEY;
            let preferred: &[&str] = if !is_category {
                &[]
            } else if mentions(DEVELOPMENT_KEYWORDS) {
                &["Coding", "Development"]
            } else if mentions(COMMUNICATION_KEYWORDS) {
                &["Communication & Management", "Communication"]
            } else {
                &[]
            };
            let value = preferred
                .iter()
                .find_map(|wanted| definition.values.iter().find(|value| value == wanted))
                .or_else(|| definition.values.first())
                .cloned()
                .unwrap_or_else(|| FALLBACK_ATTRIBUTE_VALUE.to_string());
            AttributeChoice {
                key: definition.key.clone(),
                value,
            }
        })
        .collect()
}

fn percentage(current: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((current * 100) / total).min(100) as u8
}

pub struct MigrationExecutor<'a> {
    destination: &'a dyn DestinationTracker,
    cancel: CancelHandle,
}

impl<'a> MigrationExecutor<'a> {
    pub fn new(destination: &'a dyn DestinationTracker) -> Self {
        Self {
            destination,
            cancel: CancelHandle::default(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(&self, batch: &[ParentMigration], date: NaiveDate) -> MigrationOutcome {
        self.run_with_progress(batch, date, |_| {}).await
    }

    /// Writes every staged child in parent order, then child order.
    pub async fn run_with_progress<F>(
        &self,
        batch: &[ParentMigration],
        date: NaiveDate,
        mut on_progress: F,
    ) -> MigrationOutcome
    where
        F: FnMut(&MigrationProgress) + Send,
    {
        let total: usize = batch.iter().map(|parent| parent.children.len()).sum();
        let mut outcome = MigrationOutcome {
            total,
            ..MigrationOutcome::default()
        };
        let mut report = |current: usize, parent: Option<&str>, worklog: Option<&str>, phase| {
            on_progress(&MigrationProgress {
                current,
                total,
                percentage: percentage(current, total),
                current_parent: parent.map(str::to_string),
                current_worklog: worklog.map(str::to_string),
                phase,
            });
        };
        report(0, None, None, MigrationPhase::Init);
        info!("migrating {} worklogs across {} parents", total, batch.len());

        let tempo = self.destination.uses_time_tracking_addon();
        let mut account_id = None;
        let mut attributes = Vec::new();
        if tempo {
            report(0, None, None, MigrationPhase::FetchingAttributes);
            account_id = match self.destination.current_account_id().await {
                Ok(account) => account,
                Err(err) => {
                    warn!("Failed to resolve destination account: {}", err);
                    None
                }
            };
            attributes = match self.destination.fetch_required_attribute_definitions().await {
                Ok(definitions) => definitions,
                Err(err) => {
                    warn!("Failed to load work attributes: {}", err);
                    Vec::new()
                }
            };
        }
        let date = date.format("%Y-%m-%d").to_string();

        let mut current = 0;
        'parents: for parent in batch {
            report(current, Some(parent.parent_key.as_str()), None, MigrationPhase::PreparingParent);

            let mut parent_issue_id = None;
            let mut summary = parent.parent_summary.clone();
            if tempo {
                match self.destination.resolve_issue(&parent.parent_key).await {
                    Ok(Some(issue)) => {
                        parent_issue_id = issue.numeric_id();
                        if !issue.summary.is_empty() {
                            summary = issue.summary;
                        }
                    }
                    Ok(None) => warn!("Destination issue {} was not found", parent.parent_key),
                    Err(err) => warn!("Failed to resolve {}: {}", parent.parent_key, err),
                }
            }
            let choices = select_attribute_values(&attributes, &summary);

            for child in &parent.children {
                if self.cancel.is_cancelled() {
                    outcome.cancelled = true;
                    break 'parents;
                }
                let write = WorklogWrite {
                    parent_key: parent.parent_key.clone(),
                    parent_issue_id,
                    author_account_id: account_id.clone(),
                    time_spent_seconds: child.time_spent_seconds,
                    start_date: date.clone(),
                    description: child.migration_description(),
                    attributes: choices.clone(),
                };
                match self.destination.create_worklog(&write).await {
                    Ok(true) => {
                        outcome.migrated_count += 1;
                        outcome.migrated_worklog_ids.push(child.id.clone());
                    }
                    Ok(false) => {
                        warn!("Destination rejected worklog {} for {}", child.id, parent.parent_key);
                        outcome.failed_count += 1;
                    }
                    Err(err) => {
                        warn!("Failed to migrate worklog {} to {}: {}", child.id, parent.parent_key, err);
                        outcome.failed_count += 1;
                    }
                }
                current += 1;
                report(current, Some(parent.parent_key.as_str()), Some(child.id.as_str()), MigrationPhase::Migrating);
            }
        }

        let phase = if outcome.cancelled {
            MigrationPhase::Cancelled
        } else {
            MigrationPhase::Completed
        };
        report(current, None, None, phase);
        outcome.success = outcome.migrated_count > 0;
        debug!(
            "migration finished: {} migrated, {} failed, cancelled {}",
            outcome.migrated_count, outcome.failed_count, outcome.cancelled
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::WorklogEntry;
    use crate::tracker::fakes::FakeDestination;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
    }

    fn staged(id: &str, key: &str, seconds: u64, comment: &str) -> WorklogEntry {
        let mut entry = WorklogEntry::new(id, key, seconds)
            .with_comment(comment)
            .with_summary("Summary");
        entry.is_new = true;
        entry
    }

    fn batch() -> Vec<ParentMigration> {
        vec![
            ParentMigration {
                parent_id: "p1".into(),
                parent_key: "DST-1".into(),
                parent_summary: "Backend development".into(),
                children: vec![staged("s1", "ABC-1", 1800, "login"), staged("s2", "ABC-2", 600, "")],
                total_seconds: 2400,
                total_time: "40m".into(),
            },
            ParentMigration {
                parent_id: "p2".into(),
                parent_key: "DST-2".into(),
                parent_summary: "Team sync".into(),
                children: vec![staged("s3", "ABC-3", 900, "standup")],
                total_seconds: 900,
                total_time: "15m".into(),
            },
        ]
    }

    fn category(values: &[&str]) -> AttributeDef {
        AttributeDef {
            key: "_Category_".into(),
            name: "Category".into(),
            required: true,
            values: values.iter().map(|value| value.to_string()).collect(),
        }
    }

    #[test]
    fn category_follows_summary_keywords() {
        let definitions = vec![category(&["Meetings", "Development", "Communication"])];
        assert_eq!(select_attribute_values(&definitions, "Dev tooling")[0].value, "Development");
        assert_eq!(
            select_attribute_values(&definitions, "Project Management")[0].value,
            "Communication"
        );
        assert_eq!(select_attribute_values(&definitions, "Support")[0].value, "Meetings");
        assert_eq!(select_attribute_values(&[category(&[])], "Support")[0].value, "Dev");
    }

    #[test]
    fn only_required_attributes_are_filled() {
        let mut optional = category(&["Coding"]);
        optional.required = false;
        optional.key = "_Billable_".into();
        optional.name = "Billable".into();
        let other = AttributeDef {
            key: "_Team_".into(),
            name: "Team".into(),
            required: true,
            values: vec!["Core".into(), "Coding".into()],
        };
        let choices = select_attribute_values(&[optional, other], "coding");
        assert_eq!(
            choices,
            vec![AttributeChoice {
                key: "_Team_".into(),
                value: "Core".into()
            }]
        );
    }

    #[tokio::test]
    async fn native_writes_follow_batch_order_with_prefixed_descriptions() {
        let destination = FakeDestination::default();
        let mut phases = Vec::new();
        let outcome = MigrationExecutor::new(&destination)
            .run_with_progress(&batch(), date(), |progress| phases.push(progress.phase))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.migrated_count, 3);
        assert_eq!(outcome.migrated_worklog_ids, vec!["s1", "s2", "s3"]);
        let created = destination.created();
        let descriptions: Vec<&str> = created.iter().map(|write| write.description.as_str()).collect();
        assert_eq!(descriptions, vec!["[ABC-1] login", "[ABC-2] Summary", "[ABC-3] standup"]);
        assert!(created.iter().all(|write| write.start_date == "2024-05-14"));
        assert!(created.iter().all(|write| write.parent_issue_id.is_none()));
        assert_eq!(phases.first(), Some(&MigrationPhase::Init));
        assert_eq!(phases.last(), Some(&MigrationPhase::Completed));
        assert!(!phases.contains(&MigrationPhase::FetchingAttributes));
    }

    #[tokio::test]
    async fn tempo_writes_carry_account_issue_id_and_category() {
        let destination = FakeDestination {
            tempo: true,
            account_id: Some("acc-1".into()),
            attributes: vec![category(&["Meetings", "Coding", "Communication & Management"])],
            ..FakeDestination::default()
        };
        let outcome = MigrationExecutor::new(&destination).run(&batch(), date()).await;

        assert_eq!(outcome.migrated_count, 3);
        let created = destination.created();
        assert!(created.iter().all(|write| write.author_account_id.as_deref() == Some("acc-1")));
        assert!(created.iter().all(|write| write.parent_issue_id == Some(10_000)));
        assert_eq!(created[0].attributes[0].value, "Coding");
        assert_eq!(created[2].attributes[0].value, "Meetings");
    }

    #[tokio::test]
    async fn failures_are_counted_without_aborting() {
        let destination = FakeDestination {
            reject_descriptions: ["[ABC-1]".to_string()].into_iter().collect(),
            ..FakeDestination::default()
        };
        let mut last = None;
        let outcome = MigrationExecutor::new(&destination)
            .run_with_progress(&batch(), date(), |progress| last = Some(progress.clone()))
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.migrated_count, 2);
        assert_eq!(outcome.failed_count, 1);
        let last = last.unwrap();
        assert_eq!(last.current, 3);
        assert_eq!(last.percentage, 100);
    }

    #[tokio::test]
    async fn nothing_written_is_not_success() {
        let destination = FakeDestination {
            reject_descriptions: ["[ABC".to_string()].into_iter().collect(),
            ..FakeDestination::default()
        };
        let outcome = MigrationExecutor::new(&destination).run(&batch(), date()).await;
        assert!(!outcome.success);
        assert_eq!(outcome.failed_count, 3);

        let empty = MigrationExecutor::new(&destination).run(&[], date()).await;
        assert!(!empty.success);
        assert_eq!(empty.total, 0);
    }

    #[tokio::test]
    async fn cancel_stops_before_the_next_item() {
        let destination = FakeDestination::default();
        let cancel = CancelHandle::default();
        let executor = MigrationExecutor::new(&destination).with_cancel(cancel.clone());
        let trigger = cancel.clone();
        let outcome = executor
            .run_with_progress(&batch(), date(), move |progress| {
                if progress.phase == MigrationPhase::Migrating && progress.current == 1 {
                    trigger.cancel();
                }
            })
            .await;

        assert!(outcome.cancelled);
        assert_eq!(outcome.migrated_count, 1);
        assert_eq!(destination.created().len(), 1);
        cancel.reset();
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn progress_serializes_camel_case() {
        let progress = MigrationProgress {
            current: 1,
            total: 4,
            percentage: percentage(1, 4),
            current_parent: Some("DST-1".into()),
            current_worklog: None,
            phase: MigrationPhase::FetchingAttributes,
        };
        let json = serde_json::to_value(progress).unwrap();
        assert_eq!(json["percentage"], 25);
        assert_eq!(json["currentParent"], "DST-1");
        assert_eq!(json["phase"], "fetchingAttributes");
    }
}
