//! In-memory staging model: the source day, the destination parents with their
//! staged children, selection and drag state.
//!
//! Every mutation is synchronous except removals that reach a historical
//! child, which delete the remote record first and then detach locally no
//! matter what the remote answered.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde::Serialize;

use crate::bridge::{ParentMigration, ParentTask, PendingSummary, WorklogEntry};
use crate::error::{BridgeError, Result};
use crate::reconcile::{reconcile, ReconcileStats};
use crate::rules::{match_rule, MigrationRule};
use crate::time_format::{format_time, parse_formatted_time, DisplayMode};
use crate::tracker::DestinationTracker;

/// Status given to parents created by [`StagingStore::apply_rules`].
pub const RULE_PLACEHOLDER_STATUS: &str = "Rule target";
/// Status given to parents the server stopped returning while work is still staged on them.
pub const PENDING_PLACEHOLDER_STATUS: &str = "Pending migration";

/// Where a dropped worklog lands relative to an existing child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAnchor {
    Before(String),
    After(String),
}

impl DropAnchor {
    fn target(&self) -> &str {
        match self {
            DropAnchor::Before(id) | DropAnchor::After(id) => id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    pub dragged_worklog_id: Option<String>,
    pub over_parent_id: Option<String>,
    pub anchor: Option<DropAnchor>,
}

/// Partial edit applied by [`StagingStore::update_worklog`].
#[derive(Debug, Clone, Default)]
pub struct WorklogUpdate {
    pub comment: Option<String>,
    pub time_spent_formatted: Option<String>,
}

/// Outcome of pulling children back to the source list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub detached: usize,
    pub remote_deleted: usize,
    pub remote_failed: usize,
}

/// Serializable view of the store for a renderer.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub source_worklogs: Vec<WorklogEntry>,
    pub parents: Vec<ParentTask>,
    pub selected_worklog_ids: Vec<String>,
    pub display_mode: DisplayMode,
    pub pending: PendingSummary,
}

enum Location {
    Staged { parent: usize, child: usize },
    Source(usize),
    Historical { parent: usize, child: usize },
}

#[derive(Debug, Default)]
pub struct StagingStore {
    source: Vec<WorklogEntry>,
    parents: Vec<ParentTask>,
    selected: BTreeSet<String>,
    drag: DragState,
    display_mode: DisplayMode,
    rules: Vec<MigrationRule>,
}

fn insert_with_anchor(
    children: &mut Vec<WorklogEntry>,
    entry: WorklogEntry,
    anchor: Option<&DropAnchor>,
) -> usize {
    let index = anchor
        .and_then(|anchor| {
            children
                .iter()
                .position(|child| child.id == anchor.target())
                .map(|position| match anchor {
                    DropAnchor::Before(_) => position,
                    DropAnchor::After(_) => position + 1,
                })
        })
        .unwrap_or(children.len());
    children.insert(index, entry);
    index
}

impl StagingStore {
    pub fn new(display_mode: DisplayMode, rules: Vec<MigrationRule>) -> Self {
        Self {
            display_mode,
            rules,
            ..Self::default()
        }
    }

    pub fn source_worklogs(&self) -> &[WorklogEntry] {
        &self.source
    }

    pub fn parents(&self) -> &[ParentTask] {
        &self.parents
    }

    pub fn parent(&self, parent_id: &str) -> Option<&ParentTask> {
        self.parents.iter().find(|parent| parent.id == parent_id)
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn rules(&self) -> &[MigrationRule] {
        &self.rules
    }

    pub fn set_rules(&mut self, rules: Vec<MigrationRule>) {
        self.rules = rules;
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            source_worklogs: self.source.clone(),
            parents: self.parents.clone(),
            selected_worklog_ids: self.selected.iter().cloned().collect(),
            display_mode: self.display_mode,
            pending: self.pending_migration(),
        }
    }

    fn parent_index(&self, parent_id: &str) -> Result<usize> {
        self.parents
            .iter()
            .position(|parent| parent.id == parent_id)
            .ok_or_else(|| BridgeError::ParentNotFound(parent_id.to_string()))
    }

    fn find_child(&self, worklog_id: &str, staged: bool) -> Option<(usize, usize)> {
        self.parents.iter().enumerate().find_map(|(parent, task)| {
            task.children
                .iter()
                .position(|child| child.id == worklog_id && child.is_new == staged)
                .map(|child| (parent, child))
        })
    }

    /// Staged children win over source entries, which win over historical children.
    fn locate(&self, worklog_id: &str) -> Option<Location> {
        if let Some((parent, child)) = self.find_child(worklog_id, true) {
            return Some(Location::Staged { parent, child });
        }
        if let Some(index) = self.source.iter().position(|entry| entry.id == worklog_id) {
            return Some(Location::Source(index));
        }
        self.find_child(worklog_id, false)
            .map(|(parent, child)| Location::Historical { parent, child })
    }

    fn reconcile(&mut self) -> ReconcileStats {
        reconcile(&mut self.source, &self.parents)
    }

    /// Replaces the source list and recomputes every `is_moved` flag.
    pub fn set_source_worklogs(&mut self, worklogs: Vec<WorklogEntry>) -> ReconcileStats {
        let mode = self.display_mode;
        self.source = worklogs
            .into_iter()
            .map(|mut entry| {
                entry.is_moved = false;
                entry.is_new = false;
                entry.refresh_formatted(mode);
                entry
            })
            .collect();
        let source = &self.source;
        self.selected
            .retain(|id| source.iter().any(|entry| &entry.id == id));
        self.reconcile()
    }

    /// Replaces the destination parents, carrying staged children over to the
    /// fresh list in their previous order.
    ///
    /// A staged child is dropped when the refreshed parent now holds a
    /// historical child with the same duration whose `[KEY]` marker names the
    /// staged child's issue, i.e. the write already landed.
    pub fn set_destination_parents(&mut self, parents: Vec<ParentTask>) -> ReconcileStats {
        let mode = self.display_mode;
        let previous = std::mem::take(&mut self.parents);
        self.parents = parents;
        for parent in &mut self.parents {
            for child in &mut parent.children {
                child.refresh_formatted(mode);
            }
            if let Some(old) = previous.iter().find(|old| old.issue_key == parent.issue_key) {
                parent.is_expanded = old.is_expanded;
            }
        }

        let mut carried = 0;
        let mut landed = 0;
        for old in previous.iter().filter(|old| old.has_staged_children()) {
            let target = match self
                .parents
                .iter()
                .position(|parent| parent.issue_key == old.issue_key)
            {
                Some(index) => index,
                None => {
                    let status = if old.status == RULE_PLACEHOLDER_STATUS {
                        RULE_PLACEHOLDER_STATUS
                    } else {
                        PENDING_PLACEHOLDER_STATUS
                    };
                    self.parents.push(old.placeholder(status));
                    self.parents.len() - 1
                }
            };

            // Historical children seen before this refresh cannot be the
            // result of a staged write.
            let mut consumed: Vec<String> = old
                .children
                .iter()
                .filter(|child| !child.is_new)
                .map(|child| child.id.clone())
                .collect();
            for (position, staged) in old.children.iter().enumerate() {
                if !staged.is_new {
                    continue;
                }
                let children = &mut self.parents[target].children;
                let landed_match = children.iter().find(|child| {
                    !child.is_new
                        && !consumed.contains(&child.id)
                        && child.time_spent_seconds == staged.time_spent_seconds
                        && child.provenance_key() == Some(staged.issue_key.as_str())
                });
                if let Some(historical) = landed_match {
                    consumed.push(historical.id.clone());
                    landed += 1;
                    continue;
                }

                let present = |sibling: &&WorklogEntry| children.iter().any(|child| child.id == sibling.id);
                let anchor = old.children[..position]
                    .iter()
                    .rev()
                    .find(present)
                    .map(|sibling| DropAnchor::After(sibling.id.clone()))
                    .or_else(|| {
                        old.children[position + 1..]
                            .iter()
                            .find(present)
                            .map(|sibling| DropAnchor::Before(sibling.id.clone()))
                    });
                let mut entry = staged.clone();
                entry.refresh_formatted(mode);
                insert_with_anchor(children, entry, anchor.as_ref());
                carried += 1;
            }
        }
        if carried > 0 || landed > 0 {
            debug!(
                "carried {} staged worklogs across refresh, {} already landed",
                carried, landed
            );
        }

        let hovered_gone = self
            .drag
            .over_parent_id
            .as_deref()
            .is_some_and(|over| !self.parents.iter().any(|parent| parent.id == over));
        if hovered_gone {
            self.drag.over_parent_id = None;
            self.drag.anchor = None;
        }
        self.reconcile()
    }

    /// Adds a destination parent picked from search results.
    ///
    /// Returns false when a parent with the same key is already loaded; that
    /// parent is expanded instead.
    pub fn add_parent(&mut self, mut parent: ParentTask) -> bool {
        if let Some(existing) = self
            .parents
            .iter_mut()
            .find(|existing| existing.issue_key == parent.issue_key)
        {
            existing.is_expanded = true;
            return false;
        }
        parent.is_expanded = true;
        for child in &mut parent.children {
            child.refresh_formatted(self.display_mode);
        }
        self.parents.push(parent);
        true
    }

    pub fn toggle_parent_expanded(&mut self, parent_id: &str) -> Result<bool> {
        let index = self.parent_index(parent_id)?;
        let parent = &mut self.parents[index];
        parent.is_expanded = !parent.is_expanded;
        Ok(parent.is_expanded)
    }

    /// Places a worklog under `parent_id`.
    ///
    /// A fresh source entry is cloned into a staged child and the source copy
    /// stays listed but marked moved. A staged child is reordered or
    /// reparented without changing its id. A historical child may only be
    /// reordered within its own parent. Returns the id of the child in the
    /// target parent.
    pub fn move_worklog_to_parent(
        &mut self,
        worklog_id: &str,
        parent_id: &str,
        anchor: Option<DropAnchor>,
    ) -> Result<String> {
        let target = self.parent_index(parent_id)?;
        let location = self
            .locate(worklog_id)
            .ok_or_else(|| BridgeError::WorklogNotFound(worklog_id.to_string()))?;

        match location {
            Location::Source(index) => {
                if self.source[index].is_moved {
                    return Err(BridgeError::AlreadyStaged(worklog_id.to_string()));
                }
                let staged = self.source[index].staged_copy(self.display_mode);
                let staged_id = staged.id.clone();
                let parent = &mut self.parents[target];
                insert_with_anchor(&mut parent.children, staged, anchor.as_ref());
                parent.is_expanded = true;
                self.source[index].is_moved = true;
                self.selected.remove(worklog_id);
                debug!("staged worklog {} under {}", worklog_id, parent.issue_key);
                Ok(staged_id)
            }
            Location::Staged { parent, child } => {
                self.reposition(parent, child, target, anchor.as_ref());
                Ok(worklog_id.to_string())
            }
            Location::Historical { parent, child } => {
                if parent != target {
                    return Err(BridgeError::HistoricalReparent(worklog_id.to_string()));
                }
                self.reposition(parent, child, target, anchor.as_ref());
                Ok(worklog_id.to_string())
            }
        }
    }

    fn reposition(&mut self, from: usize, child: usize, to: usize, anchor: Option<&DropAnchor>) {
        let moving_id = &self.parents[from].children[child].id;
        if anchor.is_some_and(|anchor| anchor.target() == moving_id) {
            return;
        }
        let entry = self.parents[from].children.remove(child);
        insert_with_anchor(&mut self.parents[to].children, entry, anchor);
    }

    /// Appends a source worklog to a parent.
    pub fn add_child_to_parent(&mut self, parent_id: &str, worklog_id: &str) -> Result<String> {
        self.move_worklog_to_parent(worklog_id, parent_id, None)
    }

    /// Stages every selected, still available source worklog under one parent
    /// in source order, then clears the selection.
    pub fn add_selected_to_parent(
        &mut self,
        parent_id: &str,
        anchor: Option<DropAnchor>,
    ) -> Result<Vec<String>> {
        self.parent_index(parent_id)?;
        let ids: Vec<String> = self
            .source
            .iter()
            .filter(|entry| self.selected.contains(&entry.id) && !entry.is_moved)
            .map(|entry| entry.id.clone())
            .collect();

        let mut anchor = anchor;
        let mut staged_ids = Vec::with_capacity(ids.len());
        for id in ids {
            let staged_id = self.move_worklog_to_parent(&id, parent_id, anchor.clone())?;
            if matches!(anchor, Some(DropAnchor::After(_))) {
                anchor = Some(DropAnchor::After(staged_id.clone()));
            }
            staged_ids.push(staged_id);
        }
        self.selected.clear();
        info!("staged {} selected worklogs", staged_ids.len());
        Ok(staged_ids)
    }

    pub fn begin_drag(&mut self, worklog_id: &str) {
        self.drag = DragState {
            dragged_worklog_id: Some(worklog_id.to_string()),
            ..DragState::default()
        };
    }

    pub fn drag_over(&mut self, parent_id: &str, anchor: Option<DropAnchor>) {
        self.drag.over_parent_id = Some(parent_id.to_string());
        self.drag.anchor = anchor;
    }

    pub fn cancel_drag(&mut self) {
        self.drag = DragState::default();
    }

    /// Completes the current drag. Nothing happens without a hovered parent.
    pub fn drop_dragged(&mut self) -> Result<Option<String>> {
        let drag = std::mem::take(&mut self.drag);
        match (drag.dragged_worklog_id, drag.over_parent_id) {
            (Some(worklog_id), Some(parent_id)) => self
                .move_worklog_to_parent(&worklog_id, &parent_id, drag.anchor)
                .map(Some),
            _ => Ok(None),
        }
    }

    /// Stages every available source worklog matched by a rule. Missing
    /// target parents are created as placeholders. Returns how many were staged.
    pub fn apply_rules(&mut self) -> usize {
        let mut staged = 0;
        for index in 0..self.source.len() {
            let Some(rule) = match_rule(&self.source[index], &self.rules) else {
                continue;
            };
            let target_key = rule.target_task_key.clone();
            let target_summary = rule.target_task_summary.clone();

            let target = match self
                .parents
                .iter()
                .position(|parent| parent.issue_key == target_key)
            {
                Some(position) => position,
                None => {
                    let mut placeholder = ParentTask::new(
                        format!("rule-{}", target_key),
                        target_key.clone(),
                        target_summary,
                    );
                    placeholder.status = RULE_PLACEHOLDER_STATUS.to_string();
                    self.parents.push(placeholder);
                    self.parents.len() - 1
                }
            };

            let source_id = self.source[index].id.clone();
            let already_there = self.parents[target]
                .children
                .iter()
                .any(|child| child.original_worklog_id.as_deref() == Some(source_id.as_str()));
            if !already_there {
                let copy = self.source[index].staged_copy(self.display_mode);
                let parent = &mut self.parents[target];
                parent.children.push(copy);
                parent.is_expanded = true;
                staged += 1;
            }
            self.source[index].is_moved = true;
            self.selected.remove(&source_id);
        }
        if staged > 0 {
            info!("rules staged {} worklogs", staged);
        }
        staged
    }

    /// Detaches every staged child without remote calls and drops placeholder
    /// parents left empty. Returns how many children were detached.
    pub fn clear_all_staged(&mut self) -> usize {
        let mut cleared = 0;
        for parent in &mut self.parents {
            let before = parent.children.len();
            parent.children.retain(|child| !child.is_new);
            cleared += before - parent.children.len();
        }
        self.parents.retain(|parent| {
            let placeholder = parent.status == RULE_PLACEHOLDER_STATUS
                || parent.status == PENDING_PLACEHOLDER_STATUS;
            !(placeholder && parent.children.is_empty())
        });
        self.reconcile();
        cleared
    }

    /// Turns written staged children into historical ones, carrying the
    /// description that was sent so the marker still reconciles. Returns how
    /// many children were confirmed.
    pub fn confirm_migrated(&mut self, worklog_ids: &[String]) -> usize {
        let mut confirmed = 0;
        for child in self
            .parents
            .iter_mut()
            .flat_map(|parent| parent.children.iter_mut())
            .filter(|child| child.is_new && worklog_ids.contains(&child.id))
        {
            child.comment = child.migration_description();
            child.is_new = false;
            confirmed += 1;
        }
        if confirmed > 0 {
            self.reconcile();
        }
        confirmed
    }

    /// Pulls children back to the source list.
    ///
    /// Historical children are deleted remotely first, one at a time; a failed
    /// delete is logged and the child is detached anyway. Ids that no longer
    /// resolve to a child are skipped.
    pub async fn move_worklogs_to_source(
        &mut self,
        worklog_ids: &[String],
        destination: &dyn DestinationTracker,
    ) -> RemovalReport {
        let mut report = RemovalReport::default();
        for worklog_id in worklog_ids {
            let Some((parent, child)) = self.child_position(worklog_id) else {
                debug!("worklog {} is not under any parent, skipping", worklog_id);
                continue;
            };

            let entry = &self.parents[parent].children[child];
            if !entry.is_new {
                let parent_key = self.parents[parent].issue_key.clone();
                match destination.delete_worklog(worklog_id, &parent_key).await {
                    Ok(true) => report.remote_deleted += 1,
                    Ok(false) => {
                        warn!("destination refused to delete worklog {}", worklog_id);
                        report.remote_failed += 1;
                    }
                    Err(err) => {
                        warn!("Failed to delete worklog {} remotely: {}", worklog_id, err);
                        report.remote_failed += 1;
                    }
                }
            }

            let Some((parent, child)) = self.child_position(worklog_id) else {
                continue;
            };
            let removed = self.parents[parent].children.remove(child);
            report.detached += 1;
            self.release_source(&removed);
        }
        report
    }

    fn child_position(&self, worklog_id: &str) -> Option<(usize, usize)> {
        self.find_child(worklog_id, true)
            .or_else(|| self.find_child(worklog_id, false))
    }

    /// Clears `is_moved` on the source entry a detached child stood for.
    fn release_source(&mut self, removed: &WorklogEntry) {
        if let Some(original) = removed.original_worklog_id.as_deref() {
            if let Some(entry) = self.source.iter_mut().find(|entry| entry.id == original) {
                entry.is_moved = false;
                return;
            }
        }

        let Some(key) = removed.provenance_key() else {
            return;
        };
        let still_staged: Vec<&str> = self
            .parents
            .iter()
            .flat_map(|parent| parent.children.iter())
            .filter(|child| child.is_new)
            .filter_map(|child| child.original_worklog_id.as_deref())
            .collect();
        let candidate = |entry: &WorklogEntry| {
            entry.is_moved && entry.issue_key == key && !still_staged.contains(&entry.id.as_str())
        };
        let index = self
            .source
            .iter()
            .position(|entry| candidate(entry) && entry.time_spent_seconds == removed.time_spent_seconds)
            .or_else(|| self.source.iter().position(|entry| candidate(entry)));
        if let Some(index) = index {
            self.source[index].is_moved = false;
        }
    }

    pub async fn remove_child_from_parent(
        &mut self,
        parent_id: &str,
        worklog_id: &str,
        destination: &dyn DestinationTracker,
    ) -> Result<RemovalReport> {
        let index = self.parent_index(parent_id)?;
        if self.parents[index].child_position(worklog_id).is_none() {
            return Err(BridgeError::WorklogNotFound(worklog_id.to_string()));
        }
        Ok(self
            .move_worklogs_to_source(&[worklog_id.to_string()], destination)
            .await)
    }

    /// Moves every child back to source, then drops the parent.
    pub async fn remove_parent(
        &mut self,
        parent_id: &str,
        destination: &dyn DestinationTracker,
    ) -> Result<RemovalReport> {
        let index = self.parent_index(parent_id)?;
        let ids: Vec<String> = self.parents[index]
            .children
            .iter()
            .map(|child| child.id.clone())
            .collect();
        let report = self.move_worklogs_to_source(&ids, destination).await;
        if let Some(index) = self.parents.iter().position(|parent| parent.id == parent_id) {
            let removed = self.parents.remove(index);
            info!("removed parent {}", removed.issue_key);
        }
        if self.drag.over_parent_id.as_deref() == Some(parent_id) {
            self.drag.over_parent_id = None;
            self.drag.anchor = None;
        }
        Ok(report)
    }

    /// Edits a worklog wherever it lives. A new duration is parsed and then
    /// re-rendered in the active display mode.
    pub fn update_worklog(&mut self, worklog_id: &str, update: WorklogUpdate) -> Result<()> {
        let mode = self.display_mode;
        let entry = match self.locate(worklog_id) {
            Some(Location::Source(index)) => &mut self.source[index],
            Some(Location::Staged { parent, child }) | Some(Location::Historical { parent, child }) => {
                &mut self.parents[parent].children[child]
            }
            None => return Err(BridgeError::WorklogNotFound(worklog_id.to_string())),
        };
        if let Some(comment) = update.comment {
            entry.comment = comment;
        }
        if let Some(formatted) = update.time_spent_formatted {
            entry.time_spent_seconds = parse_formatted_time(&formatted);
            entry.refresh_formatted(mode);
        }
        Ok(())
    }

    /// Switches the display mode and re-derives every formatted duration.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
        let children = self
            .parents
            .iter_mut()
            .flat_map(|parent| parent.children.iter_mut());
        for entry in self.source.iter_mut().chain(children) {
            entry.refresh_formatted(mode);
        }
    }

    pub fn is_selected(&self, worklog_id: &str) -> bool {
        self.selected.contains(worklog_id)
    }

    /// Toggles selection of an available source worklog. Moved or unknown
    /// entries are never selected.
    pub fn toggle_selection(&mut self, worklog_id: &str) -> Result<bool> {
        let entry = self
            .source
            .iter()
            .find(|entry| entry.id == worklog_id)
            .ok_or_else(|| BridgeError::WorklogNotFound(worklog_id.to_string()))?;
        if entry.is_moved {
            return Ok(false);
        }
        if !self.selected.remove(worklog_id) {
            self.selected.insert(worklog_id.to_string());
            return Ok(true);
        }
        Ok(false)
    }

    pub fn select_all_available(&mut self) -> usize {
        self.selected = self
            .source
            .iter()
            .filter(|entry| !entry.is_moved)
            .map(|entry| entry.id.clone())
            .collect();
        self.selected.len()
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn selected_worklogs(&self) -> Vec<&WorklogEntry> {
        self.source
            .iter()
            .filter(|entry| self.selected.contains(&entry.id))
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn selected_total_time(&self) -> String {
        let seconds = self
            .selected_worklogs()
            .iter()
            .map(|entry| entry.time_spent_seconds)
            .sum();
        format_time(seconds, self.display_mode)
    }

    fn format_for_parent(&self, parent_id: &str, seconds: impl Fn(&ParentTask) -> u64) -> Result<String> {
        let index = self.parent_index(parent_id)?;
        Ok(format_time(seconds(&self.parents[index]), self.display_mode))
    }

    /// Remote time on the parent at the last fetch.
    pub fn initial_time(&self, parent_id: &str) -> Result<String> {
        self.format_for_parent(parent_id, |parent| parent.initial_total_time_seconds)
    }

    pub fn original_time(&self, parent_id: &str) -> Result<String> {
        self.format_for_parent(parent_id, ParentTask::original_seconds)
    }

    pub fn added_time(&self, parent_id: &str) -> Result<String> {
        self.format_for_parent(parent_id, ParentTask::added_seconds)
    }

    /// Same as [`Self::added_time`]; the child list header shows staged time only.
    pub fn total_children_time(&self, parent_id: &str) -> Result<String> {
        self.added_time(parent_id)
    }

    pub fn total_time(&self, parent_id: &str) -> Result<String> {
        self.format_for_parent(parent_id, ParentTask::total_seconds)
    }

    pub fn pending_migration(&self) -> PendingSummary {
        let (count, seconds) = self
            .parents
            .iter()
            .flat_map(|parent| parent.children.iter())
            .filter(|child| child.is_new)
            .fold((0, 0), |(count, seconds), child| {
                (count + 1, seconds + child.time_spent_seconds)
            });
        PendingSummary {
            count,
            seconds,
            time: format_time(seconds, self.display_mode),
        }
    }

    /// Staged work grouped per parent in display order.
    pub fn migration_batch(&self) -> Vec<ParentMigration> {
        self.parents
            .iter()
            .filter(|parent| parent.has_staged_children())
            .map(|parent| {
                let children: Vec<WorklogEntry> = parent
                    .children
                    .iter()
                    .filter(|child| child.is_new)
                    .cloned()
                    .collect();
                let total_seconds = children.iter().map(|child| child.time_spent_seconds).sum();
                ParentMigration {
                    parent_id: parent.id.clone(),
                    parent_key: parent.issue_key.clone(),
                    parent_summary: parent.issue_summary.clone(),
                    children,
                    total_seconds,
                    total_time: format_time(total_seconds, self.display_mode),
                }
            })
            .collect()
    }
}
