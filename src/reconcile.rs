//! Recomputes which source worklogs are already represented on the destination.
//!
//! Remote records carry no link back to their origin, so two signals are used:
//! staged children in this session know their `original_worklog_id`, and
//! historical children may start with a `[KEY-1]` marker whose duration can be
//! paired with a source entry on the same issue. Pairing is greedy in source
//! order, so two identical source entries against one historical slot leave
//! exactly one of them available.

use std::collections::{HashMap, HashSet};

use crate::bridge::{ParentTask, WorklogEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Source entries matched by a staged child's original id.
    pub session_matches: usize,
    /// Source entries paired with a historical `[KEY]` slot.
    pub historical_matches: usize,
    pub available: usize,
}

/// Historical slots grouped by issue key, one entry per remote child.
fn historical_pool(parents: &[ParentTask]) -> HashMap<String, Vec<u64>> {
    let mut pool: HashMap<String, Vec<u64>> = HashMap::new();
    for child in parents.iter().flat_map(|parent| parent.children.iter()) {
        if child.is_new {
            continue;
        }
        if let Some(key) = child.provenance_key() {
            pool.entry(key.to_string())
                .or_default()
                .push(child.time_spent_seconds);
        }
    }
    pool
}

/// Sets `is_moved` on every source entry from the current parent list.
pub fn reconcile(source: &mut [WorklogEntry], parents: &[ParentTask]) -> ReconcileStats {
    let pending: HashSet<&str> = parents
        .iter()
        .flat_map(|parent| parent.children.iter())
        .filter(|child| child.is_new)
        .filter_map(|child| child.original_worklog_id.as_deref())
        .collect();
    let mut pool = historical_pool(parents);
    let mut stats = ReconcileStats::default();

    for entry in source.iter_mut() {
        if pending.contains(entry.id.as_str()) {
            entry.is_moved = true;
            stats.session_matches += 1;
            continue;
        }
        let slot = pool.get_mut(&entry.issue_key).and_then(|slots| {
            slots
                .iter()
                .position(|seconds| *seconds == entry.time_spent_seconds)
                .map(|index| slots.swap_remove(index))
        });
        if slot.is_some() {
            entry.is_moved = true;
            stats.historical_matches += 1;
        } else {
            entry.is_moved = false;
            stats.available += 1;
        }
    }

    log::debug!(
        "reconciled {} source worklogs: {} staged, {} historical, {} available",
        source.len(),
        stats.session_matches,
        stats.historical_matches,
        stats.available
    );
    stats
}
