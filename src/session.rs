//! One working session: a staging store bound to a source and a destination
//! tracker for a single work date.

use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::bridge::ParentTask;
use crate::config::AppConfig;
use crate::error::{BridgeError, Result};
use crate::jira::{JiraDestination, JiraSource};
use crate::migration::{CancelHandle, MigrationExecutor, MigrationOutcome, MigrationProgress};
use crate::reconcile::ReconcileStats;
use crate::redact_log_details;
use crate::rules::MigrationRule;
use crate::staging_store::{RemovalReport, StagingStore};
use crate::time_format::DisplayMode;
use crate::tracker::{DestinationTracker, SourceTracker};

pub struct MigrationSession {
    store: StagingStore,
    source: Arc<dyn SourceTracker>,
    destination: Arc<dyn DestinationTracker>,
    work_date: NaiveDate,
    cancel: CancelHandle,
}

impl MigrationSession {
    pub fn new(
        source: Arc<dyn SourceTracker>,
        destination: Arc<dyn DestinationTracker>,
        work_date: NaiveDate,
        display_mode: DisplayMode,
        rules: Vec<MigrationRule>,
    ) -> Self {
        Self {
            store: StagingStore::new(display_mode, rules),
            source,
            destination,
            work_date,
            cancel: CancelHandle::default(),
        }
    }

    /// Builds Jira-backed collaborators from the active project.
    pub fn connect(config: &AppConfig, work_date: NaiveDate) -> Result<Self> {
        let project = config
            .active_project()
            .ok_or_else(|| BridgeError::Config("no active project".into()))?;
        if !project.is_configured() {
            return Err(BridgeError::Config(format!(
                "project {} is missing connection details",
                project.name
            )));
        }
        let source = JiraSource::from_profile(&project.source)?;
        let destination = JiraDestination::from_profile(&project.destination)?;
        info!(
            "connected project {} (Tempo: {})",
            project.name,
            destination.uses_time_tracking_addon()
        );
        Ok(Self::new(
            Arc::new(source),
            Arc::new(destination),
            work_date,
            config.display_mode,
            config.rules.clone(),
        ))
    }

    pub fn store(&self) -> &StagingStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StagingStore {
        &mut self.store
    }

    pub fn work_date(&self) -> NaiveDate {
        self.work_date
    }

    /// Changes the day; staged work is kept and merged on the next load.
    pub fn set_work_date(&mut self, date: NaiveDate) {
        self.work_date = date;
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub async fn load_source(&mut self) -> ReconcileStats {
        let worklogs = match self.source.fetch_worklogs(self.work_date).await {
            Ok(worklogs) => worklogs,
            Err(err) => {
                warn!("Failed to load source worklogs");
                debug!("Source load details: {}", redact_log_details(&err.to_string()));
                Vec::new()
            }
        };
        self.store.set_source_worklogs(worklogs)
    }

    pub async fn load_destination(&mut self) -> ReconcileStats {
        let parents = match self.destination.fetch_parents(self.work_date).await {
            Ok(parents) => parents,
            Err(err) => {
                warn!("Failed to load destination parents");
                debug!("Destination load details: {}", redact_log_details(&err.to_string()));
                Vec::new()
            }
        };
        self.store.set_destination_parents(parents)
    }

    pub async fn refresh(&mut self) -> ReconcileStats {
        self.load_source().await;
        self.load_destination().await
    }

    pub async fn search_parents(&self, query: &str) -> Vec<ParentTask> {
        self.destination
            .search_issues(query)
            .await
            .unwrap_or_else(|err| {
                warn!("Parent search failed");
                debug!("Parent search details: {}", redact_log_details(&err.to_string()));
                Vec::new()
            })
    }

    pub fn apply_rules(&mut self) -> usize {
        self.store.apply_rules()
    }

    /// Writes every staged child, marks the written ones as confirmed, then
    /// reloads the destination. A failed reload never leaves written work
    /// staged for a second write.
    pub async fn migrate<F>(&mut self, on_progress: F) -> MigrationOutcome
    where
        F: FnMut(&MigrationProgress) + Send,
    {
        let batch = self.store.migration_batch();
        self.cancel.reset();
        let outcome = MigrationExecutor::new(self.destination.as_ref())
            .with_cancel(self.cancel.clone())
            .run_with_progress(&batch, self.work_date, on_progress)
            .await;
        info!(
            "migrated {} of {} worklogs",
            outcome.migrated_count, outcome.total
        );
        if outcome.migrated_count > 0 {
            self.store.confirm_migrated(&outcome.migrated_worklog_ids);
            self.load_destination().await;
        }
        outcome
    }

    pub async fn remove_child(&mut self, parent_id: &str, worklog_id: &str) -> Result<RemovalReport> {
        self.store
            .remove_child_from_parent(parent_id, worklog_id, self.destination.as_ref())
            .await
    }

    pub async fn remove_parent(&mut self, parent_id: &str) -> Result<RemovalReport> {
        self.store
            .remove_parent(parent_id, self.destination.as_ref())
            .await
    }

    pub async fn move_to_source(&mut self, worklog_ids: &[String]) -> RemovalReport {
        self.store
            .move_worklogs_to_source(worklog_ids, self.destination.as_ref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::WorklogEntry;
    use crate::rules::RuleSource;
    use crate::tracker::fakes::{FakeDestination, FakeSource};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
    }

    fn source() -> Arc<FakeSource> {
        Arc::new(FakeSource::with(vec![
            WorklogEntry::new("w1", "ABC-1", 1800).with_comment("login"),
            WorklogEntry::new("w2", "ABC-2", 900).with_labels(["ops"]),
        ]))
    }

    fn session(source: Arc<FakeSource>, destination: Arc<FakeDestination>) -> MigrationSession {
        MigrationSession::new(
            source,
            destination,
            date(),
            DisplayMode::Hm,
            vec![MigrationRule::new(RuleSource::Label, "ops", "DST-2")],
        )
    }

    #[tokio::test]
    async fn migrated_work_reappears_as_history_after_refresh() {
        let destination = Arc::new(FakeDestination::with_parents(vec![
            ParentTask::new("1", "DST-1", "Development"),
            ParentTask::new("2", "DST-2", "Operations"),
        ]));
        let mut session = session(source(), destination.clone());
        session.refresh().await;
        session.store_mut().add_child_to_parent("1", "w1").unwrap();
        assert_eq!(session.apply_rules(), 1);

        let mut updates = 0;
        let outcome = session.migrate(|_| updates += 1).await;

        assert!(outcome.success);
        assert_eq!(outcome.migrated_count, 2);
        assert!(updates >= 4);
        assert_eq!(session.store().pending_migration().count, 0);
        assert!(session.store().source_worklogs().iter().all(|entry| entry.is_moved));
        let history = &session.store().parent("1").unwrap().children;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].comment, "[ABC-1] login");

        session.refresh().await;
        assert!(session.store().source_worklogs().iter().all(|entry| entry.is_moved));
        assert_eq!(session.apply_rules(), 0);
    }

    #[tokio::test]
    async fn removing_history_deletes_remotely_and_frees_the_source() {
        let destination = Arc::new(FakeDestination::with_parents(vec![ParentTask::new(
            "1",
            "DST-1",
            "Development",
        )
        .with_children(vec![
            WorklogEntry::new("t-1", "DST-1", 1800).with_comment("[ABC-1] login")
        ])]));
        let mut session = session(source(), destination.clone());
        session.refresh().await;
        assert!(session.store().source_worklogs()[0].is_moved);

        let report = session.remove_child("1", "t-1").await.unwrap();
        assert_eq!(report.remote_deleted, 1);
        assert!(!session.store().source_worklogs()[0].is_moved);

        session.refresh().await;
        assert!(!session.store().source_worklogs()[0].is_moved);
        assert_eq!(destination.deleted(), vec![("t-1".to_string(), "DST-1".to_string())]);
    }

    #[tokio::test]
    async fn written_work_is_not_rewritten_when_reload_fails() {
        let destination = Arc::new(FakeDestination {
            fail_fetch: true,
            ..FakeDestination::default()
        });
        let mut session = session(source(), destination.clone());
        session.load_source().await;
        session
            .store_mut()
            .add_parent(ParentTask::new("1", "DST-1", "Development"));
        session.store_mut().add_child_to_parent("1", "w1").unwrap();

        let first = session.migrate(|_| {}).await;
        assert_eq!(first.migrated_count, 1);
        assert_eq!(session.store().pending_migration().count, 0);

        let second = session.migrate(|_| {}).await;
        assert_eq!(second.total, 0);
        assert_eq!(destination.created().len(), 1);
    }

    #[tokio::test]
    async fn collaborator_failures_load_as_empty() {
        let failing_source = Arc::new(FakeSource {
            fail: true,
            ..FakeSource::default()
        });
        let destination = Arc::new(FakeDestination {
            fail_fetch: true,
            ..FakeDestination::default()
        });
        let mut session = session(failing_source, destination);

        let stats = session.refresh().await;

        assert_eq!(stats, ReconcileStats::default());
        assert!(session.store().source_worklogs().is_empty());
        assert!(session.store().parents().is_empty());
        assert!(session.search_parents("DST").await.is_empty());
    }

    #[tokio::test]
    async fn search_returns_destination_matches() {
        let destination = Arc::new(FakeDestination {
            search_results: vec![ParentTask::new("9", "DST-9", "Support")],
            ..FakeDestination::default()
        });
        let session = session(source(), destination);
        let found = session.search_parents("Supp").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].issue_key, "DST-9");
    }

    #[test]
    fn connect_requires_a_configured_project() {
        let mut config = AppConfig::default();
        assert!(matches!(
            MigrationSession::connect(&config, date()),
            Err(BridgeError::Config(_))
        ));
        config.add_project("Alpha");
        assert!(MigrationSession::connect(&config, date()).is_err());
    }
}
