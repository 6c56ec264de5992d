//! Worklog reconciliation and staging between two Jira sites.
//!
//! Source worklogs for one day are staged under destination parent issues,
//! reconciled against what the destination already holds, and migrated in
//! one batch, natively or through Tempo.

use log::info;

pub mod bridge;
pub mod config;
pub mod error;
pub mod issue_cache;
pub mod jira;
pub mod migration;
pub mod reconcile;
pub mod rules;
pub mod session;
pub mod staging_store;
pub mod time_format;
pub mod tracker;

pub use bridge::{
    AttributeChoice, AttributeDef, ParentMigration, ParentTask, PendingSummary, ResolvedIssue,
    WorklogEntry, WorklogWrite,
};
pub use config::{AppConfig, ConfigManager, ConnectionProfile, ProjectProfile, ProjectUpdate};
pub use error::{BridgeError, Result};
pub use issue_cache::IssueCache;
pub use jira::{JiraDestination, JiraSource};
pub use migration::{
    CancelHandle, MigrationExecutor, MigrationOutcome, MigrationPhase, MigrationProgress,
};
pub use reconcile::{reconcile, ReconcileStats};
pub use rules::{match_rule, MigrationRule, RuleSource};
pub use session::MigrationSession;
pub use staging_store::{DropAnchor, RemovalReport, StagingStore, StoreSnapshot, WorklogUpdate};
pub use time_format::{format_time, parse_formatted_time, DisplayMode};
pub use tracker::{DestinationTracker, SourceTracker};

/// Installs the process logger. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    info!("Starting worklog bridge {}", env!("CARGO_PKG_VERSION"));
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_text(value: &str, limit: usize) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= limit {
        return trimmed.to_string();
    }
    if limit <= 1 {
        return "…".to_string();
    }
    let mut truncated: String = trimmed.chars().take(limit - 1).collect();
    truncated.push('…');
    truncated
}

/// Shortens remote error text for logs and hides anything that looks like a
/// credential. Remote bodies may echo request headers back.
pub(crate) fn redact_log_details(value: &str) -> String {
    let collapsed = collapse_whitespace(value);
    let category = collapsed
        .split(':')
        .next()
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .unwrap_or("error");
    let lowered = collapsed.to_lowercase();
    let has_sensitive_hint = [
        "token",
        "authorization",
        "bearer",
        "basic ",
        "api_token",
        "password",
        "set-cookie",
    ]
    .iter()
    .any(|hint| lowered.contains(hint));

    if has_sensitive_hint {
        return format!(
            "{}: <redacted-sensitive-details>",
            truncate_text(category, 64)
        );
    }

    truncate_text(&collapsed, 180)
}
