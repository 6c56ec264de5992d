//! Short-lived cache of destination issues and the signed-in account, so a
//! migration batch does not look the same issue up once per worklog.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::bridge::ResolvedIssue;

pub const ISSUE_TTL: Duration = Duration::from_secs(60 * 60);
pub const ACCOUNT_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
struct Timed<T> {
    value: T,
    stored_at: Instant,
}

impl<T: Clone> Timed<T> {
    fn fresh(&self, ttl: Duration) -> Option<T> {
        (self.stored_at.elapsed() < ttl).then(|| self.value.clone())
    }
}

#[derive(Default)]
struct CacheState {
    issues: HashMap<String, Timed<ResolvedIssue>>,
    account_id: Option<Timed<String>>,
}

/// Thread-safe issue cache keyed by both issue id and issue key.
#[derive(Clone)]
pub struct IssueCache {
    state: Arc<Mutex<CacheState>>,
    issue_ttl: Duration,
    account_ttl: Duration,
}

impl Default for IssueCache {
    fn default() -> Self {
        Self::with_ttl(ISSUE_TTL, ACCOUNT_TTL)
    }
}

impl IssueCache {
    pub fn with_ttl(issue_ttl: Duration, account_ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            issue_ttl,
            account_ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn issue(&self, key_or_id: &str) -> Option<ResolvedIssue> {
        self.lock()
            .issues
            .get(key_or_id)
            .and_then(|entry| entry.fresh(self.issue_ttl))
    }

    pub fn store_issue(&self, issue: ResolvedIssue) {
        let entry = Timed {
            value: issue,
            stored_at: Instant::now(),
        };
        let mut state = self.lock();
        state.issues.insert(entry.value.id.clone(), entry.clone());
        state.issues.insert(entry.value.key.clone(), entry);
    }

    pub fn account_id(&self) -> Option<String> {
        self.lock()
            .account_id
            .as_ref()
            .and_then(|entry| entry.fresh(self.account_ttl))
    }

    pub fn store_account_id(&self, account_id: impl Into<String>) {
        self.lock().account_id = Some(Timed {
            value: account_id.into(),
            stored_at: Instant::now(),
        });
    }

    pub fn clear(&self) {
        *self.lock() = CacheState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue() -> ResolvedIssue {
        ResolvedIssue {
            id: "10001".into(),
            key: "DST-1".into(),
            summary: "Development".into(),
            issue_type: "Task".into(),
            status: "Open".into(),
        }
    }

    #[test]
    fn issues_resolve_by_id_or_key() {
        let cache = IssueCache::default();
        cache.store_issue(issue());
        assert_eq!(cache.issue("DST-1"), Some(issue()));
        assert_eq!(cache.issue("10001"), Some(issue()));
        assert_eq!(cache.issue("DST-2"), None);

        let shared = cache.clone();
        shared.clear();
        assert_eq!(cache.issue("DST-1"), None);
    }

    #[test]
    fn expired_entries_are_ignored() {
        let cache = IssueCache::with_ttl(Duration::ZERO, Duration::ZERO);
        cache.store_issue(issue());
        cache.store_account_id("acc-1");
        assert_eq!(cache.issue("DST-1"), None);
        assert_eq!(cache.account_id(), None);

        let cache = IssueCache::default();
        cache.store_account_id("acc-1");
        assert_eq!(cache.account_id().as_deref(), Some("acc-1"));
    }
}
