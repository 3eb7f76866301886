//! Task records and the derived per-lane index.
//!
//! # Responsibility
//! - Own the `tasks` map and the `tasksByStatus` index.
//! - Keep both collections in sync across add/update/delete/move/reorder
//!   and lane evacuation.
//!
//! # Invariants
//! - A task's id is listed once, in the sequence of the lane named by its
//!   `status`, and in no other sequence.
//! - Operations on unknown ids change nothing.

use super::StoreError;
use crate::model::swim_lane::LaneId;
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// A broken derived-index invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexViolation {
    /// Task is not listed under its own status.
    Unlisted { task_id: TaskId, status: LaneId },
    /// Task is listed under a lane other than its status.
    WrongLane { task_id: TaskId, lane_id: LaneId },
    /// Task is listed more than once.
    Duplicated { task_id: TaskId },
    /// Index lists an id with no task record.
    Dangling { task_id: TaskId, lane_id: LaneId },
}

impl Display for IndexViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlisted { task_id, status } => {
                write!(f, "task {task_id} is missing from lane `{status}`")
            }
            Self::WrongLane { task_id, lane_id } => {
                write!(f, "task {task_id} is listed under foreign lane `{lane_id}`")
            }
            Self::Duplicated { task_id } => write!(f, "task {task_id} is listed more than once"),
            Self::Dangling { task_id, lane_id } => {
                write!(f, "lane `{lane_id}` lists unknown task {task_id}")
            }
        }
    }
}

impl Error for IndexViolation {}

/// Outcome of `TaskStore::reconcile`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Records dropped because they failed validation or were stored under
    /// a key other than their own id.
    pub dropped: Vec<TaskId>,
    /// Tasks whose status named an unknown lane and were moved.
    pub reassigned: Vec<TaskId>,
    /// Whether the index had to be rebuilt.
    pub index_rebuilt: bool,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty() && self.reassigned.is_empty() && !self.index_rebuilt
    }
}

/// Task map plus the per-lane ordered index.
///
/// Serialized as `{ "tasks": {...}, "tasksByStatus": {...} }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStore {
    #[serde(default)]
    tasks: BTreeMap<TaskId, Task>,
    #[serde(default)]
    tasks_by_status: BTreeMap<LaneId, Vec<TaskId>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// The whole index, keyed by lane id.
    pub fn tasks_by_status(&self) -> &BTreeMap<LaneId, Vec<TaskId>> {
        &self.tasks_by_status
    }

    /// Ordered task ids of one lane; empty for unknown lanes.
    pub fn lane_ids(&self, lane_id: &str) -> &[TaskId] {
        self.tasks_by_status
            .get(lane_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ordered task records of one lane.
    pub fn lane_tasks(&self, lane_id: &str) -> Vec<&Task> {
        self.lane_ids(lane_id)
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .collect()
    }

    /// Makes sure `lane_id` has an index entry.
    pub fn ensure_lane(&mut self, lane_id: &str) {
        if !self.tasks_by_status.contains_key(lane_id) {
            self.tasks_by_status.insert(lane_id.to_string(), Vec::new());
        }
    }

    /// Inserts a task built from `draft` and appends it to its lane.
    ///
    /// The draft is expected to be normalized already.
    pub fn add(&mut self, draft: TaskDraft) -> Task {
        let task = Task::from_draft(Uuid::new_v4(), draft, Utc::now());
        self.tasks_by_status
            .entry(task.status.clone())
            .or_default()
            .push(task.id);
        self.tasks.insert(task.id, task.clone());
        task
    }

    /// Merges `patch` into a task and refreshes `updated_at`.
    ///
    /// A status change moves the task to the end of the new lane in the same
    /// step. Returns `None` for unknown ids.
    pub fn update(&mut self, id: TaskId, mut patch: TaskPatch) -> Option<Task> {
        let status = patch.status.take();
        let task = self.tasks.get_mut(&id)?;
        patch.apply_fields(task);
        task.touch(Utc::now());

        let previous = match status {
            Some(status) if status != task.status => {
                Some(std::mem::replace(&mut task.status, status))
            }
            _ => None,
        };
        let updated = task.clone();

        if let Some(previous) = previous {
            self.relink(id, &previous, &updated.status);
        }
        Some(updated)
    }

    /// Removes a task and its index entry. Returns the removed record.
    pub fn remove(&mut self, id: TaskId) -> Option<Task> {
        let task = self.tasks.remove(&id)?;
        if let Some(ids) = self.tasks_by_status.get_mut(&task.status) {
            ids.retain(|current| *current != id);
        }
        Some(task)
    }

    /// Moves a task to the end of `lane_id`.
    ///
    /// Returns `false` when the task is unknown or already in that lane.
    pub fn move_to(&mut self, id: TaskId, lane_id: &str) -> bool {
        let Some(task) = self.tasks.get_mut(&id) else {
            return false;
        };
        if task.status == lane_id {
            return false;
        }

        let previous = std::mem::replace(&mut task.status, lane_id.to_string());
        task.touch(Utc::now());
        self.relink(id, &previous, lane_id);
        true
    }

    /// Replaces one lane's order with `order`.
    ///
    /// # Errors
    /// - `StoreError::DuplicateInOrder` when an id repeats.
    /// - `StoreError::OrderMismatch` when `order` is not a permutation of the
    ///   lane's current ids.
    pub fn reorder(&mut self, lane_id: &str, order: Vec<TaskId>) -> Result<(), StoreError> {
        let current = self.lane_ids(lane_id);
        let mut seen = HashSet::with_capacity(order.len());
        for task_id in &order {
            if !seen.insert(*task_id) {
                return Err(StoreError::DuplicateInOrder {
                    lane_id: lane_id.to_string(),
                    task_id: *task_id,
                });
            }
        }

        let same_members =
            order.len() == current.len() && current.iter().all(|id| seen.contains(id));
        if !same_members {
            return Err(StoreError::OrderMismatch {
                lane_id: lane_id.to_string(),
                expected_len: current.len(),
                actual_len: order.len(),
            });
        }

        self.tasks_by_status.insert(lane_id.to_string(), order);
        Ok(())
    }

    /// Empties a lane that is being deleted.
    ///
    /// With a `target`, every contained task is reassigned there (status and
    /// timestamp) and appended to the target's sequence. Without one, the
    /// tasks are dropped. The lane's index entry is removed either way.
    /// Returns the affected task ids in their former lane order. Evacuating
    /// a lane into itself changes nothing.
    pub fn evacuate_lane(&mut self, lane_id: &str, target: Option<&str>) -> Vec<TaskId> {
        if target == Some(lane_id) {
            return Vec::new();
        }
        let mut affected = self.tasks_by_status.remove(lane_id).unwrap_or_default();
        let mut stray: Vec<&Task> = self
            .tasks
            .values()
            .filter(|task| task.status == lane_id && !affected.contains(&task.id))
            .collect();
        stray.sort_by_key(|task| (task.created_at, task.id));
        let stray: Vec<TaskId> = stray.into_iter().map(|task| task.id).collect();
        affected.extend(stray);
        affected.retain(|id| self.tasks.contains_key(id));

        match target {
            Some(target) => {
                let now = Utc::now();
                for id in &affected {
                    if let Some(task) = self.tasks.get_mut(id) {
                        task.status = target.to_string();
                        task.touch(now);
                    }
                }
                let entry = self.tasks_by_status.entry(target.to_string()).or_default();
                for id in &affected {
                    if !entry.contains(id) {
                        entry.push(*id);
                    }
                }
            }
            None => {
                for id in &affected {
                    self.tasks.remove(id);
                }
            }
        }
        affected
    }

    /// Checks the derived-index invariant, reporting the first violation.
    pub fn verify_index(&self) -> Result<(), IndexViolation> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for (lane_id, ids) in &self.tasks_by_status {
            for task_id in ids {
                let Some(task) = self.tasks.get(task_id) else {
                    return Err(IndexViolation::Dangling {
                        task_id: *task_id,
                        lane_id: lane_id.clone(),
                    });
                };
                if task.status != *lane_id {
                    return Err(IndexViolation::WrongLane {
                        task_id: *task_id,
                        lane_id: lane_id.clone(),
                    });
                }
                if !seen.insert(*task_id) {
                    return Err(IndexViolation::Duplicated { task_id: *task_id });
                }
            }
        }

        if let Some(task) = self.tasks.values().find(|task| !seen.contains(&task.id)) {
            return Err(IndexViolation::Unlisted {
                task_id: task.id,
                status: task.status.clone(),
            });
        }
        Ok(())
    }

    /// Repairs state loaded from storage against the known lane ids.
    ///
    /// Invalid records are dropped first. Tasks pointing at unknown lanes
    /// move to the first known lane, when there is one. The index is rebuilt
    /// when it disagrees with the records, keeping the persisted order for
    /// entries that were already correct.
    pub fn reconcile(&mut self, lane_ids: &[LaneId]) -> ReconcileReport {
        let dropped: Vec<TaskId> = self
            .tasks
            .iter()
            .filter(|(key, task)| **key != task.id || task.validate().is_err())
            .map(|(key, _)| *key)
            .collect();
        for key in &dropped {
            self.tasks.remove(key);
        }
        let mut report = ReconcileReport {
            dropped,
            ..ReconcileReport::default()
        };

        let known: HashSet<&str> = lane_ids.iter().map(String::as_str).collect();
        if let Some(fallback) = lane_ids.first() {
            let now = Utc::now();
            for task in self.tasks.values_mut() {
                if !known.contains(task.status.as_str()) {
                    task.status = fallback.clone();
                    task.touch(now);
                    report.reassigned.push(task.id);
                }
            }
        }

        let stale_entries = self
            .tasks_by_status
            .keys()
            .any(|lane_id| !known.contains(lane_id.as_str()));
        if stale_entries || self.verify_index().is_err() {
            self.rebuild_index(lane_ids);
            report.index_rebuilt = true;
        }
        for lane_id in lane_ids {
            self.ensure_lane(lane_id);
        }
        report
    }

    fn rebuild_index(&mut self, lane_ids: &[LaneId]) {
        let mut rebuilt: BTreeMap<LaneId, Vec<TaskId>> = lane_ids
            .iter()
            .map(|lane_id| (lane_id.clone(), Vec::new()))
            .collect();
        let mut placed = HashSet::with_capacity(self.tasks.len());

        for lane_id in lane_ids {
            let Some(ids) = self.tasks_by_status.get(lane_id) else {
                continue;
            };
            for task_id in ids {
                let belongs = self
                    .tasks
                    .get(task_id)
                    .is_some_and(|task| task.status == *lane_id);
                if belongs && placed.insert(*task_id) {
                    rebuilt.entry(lane_id.clone()).or_default().push(*task_id);
                }
            }
        }

        let mut unplaced: Vec<&Task> = self
            .tasks
            .values()
            .filter(|task| !placed.contains(&task.id))
            .collect();
        unplaced.sort_by_key(|task| (task.created_at, task.id));
        for task in unplaced {
            rebuilt.entry(task.status.clone()).or_default().push(task.id);
        }

        self.tasks_by_status = rebuilt;
    }

    fn relink(&mut self, id: TaskId, from: &str, to: &str) {
        if let Some(ids) = self.tasks_by_status.get_mut(from) {
            ids.retain(|current| *current != id);
        }
        let target = self.tasks_by_status.entry(to.to_string()).or_default();
        if !target.contains(&id) {
            target.push(id);
        }
    }
}
