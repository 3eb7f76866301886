//! Board use-case service.
//!
//! # Responsibility
//! - Own the task store and lane store for one board.
//! - Validate input before it reaches the stores.
//! - Persist the affected storage entry after every state change.
//!
//! # Invariants
//! - Every task status names an existing lane.
//! - Every lane has an index entry in the task store.
//! - The last remaining lane cannot be deleted.
//! - A failed write does not roll back the in-memory change.

use crate::config::BoardConfig;
use crate::model::swim_lane::{LaneId, LanePatch, LaneValidationError, SwimLane};
use crate::model::task::{Task, TaskDraft, TaskId, TaskPatch, TaskValidationError};
use crate::query::TaskQuery;
use crate::storage::{KeyValueStore, StorageError};
use crate::store::{StoreError, SwimLaneStore, TaskStore};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BoardResult<T> = Result<T, BoardError>;

/// Errors from board operations.
#[derive(Debug)]
pub enum BoardError {
    /// Task input failed form validation.
    InvalidTask(TaskValidationError),
    /// Lane input failed form validation.
    InvalidLane(LaneValidationError),
    /// Referenced lane does not exist.
    UnknownLane(LaneId),
    /// Refused to delete the only remaining lane.
    LastLane(LaneId),
    /// Store rejected the mutation.
    Store(StoreError),
    /// Reading or writing storage failed.
    Storage(StorageError),
    /// State could not be encoded for storage.
    Encode(serde_json::Error),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::InvalidLane(err) => write!(f, "{err}"),
            Self::UnknownLane(id) => write!(f, "swim lane not found: {id}"),
            Self::LastLane(id) => write!(f, "cannot delete the last swim lane: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode board state: {err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::InvalidLane(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::UnknownLane(_) | Self::LastLane(_) => None,
        }
    }
}

impl From<TaskValidationError> for BoardError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<LaneValidationError> for BoardError {
    fn from(value: LaneValidationError) -> Self {
        Self::InvalidLane(value)
    }
}

impl From<StoreError> for BoardError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<StorageError> for BoardError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Which storage entries a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dirty {
    Tasks,
    Lanes,
    Both,
}

/// Single owner of one board's state.
///
/// All mutation goes through `&mut self`, so there is one writer.
pub struct BoardService<S: KeyValueStore> {
    storage: S,
    config: BoardConfig,
    tasks: TaskStore,
    lanes: SwimLaneStore,
}

impl<S: KeyValueStore> BoardService<S> {
    /// Rehydrates a board from storage.
    ///
    /// Unreadable entries are logged and replaced by defaults: no tasks, and
    /// the configured seed lanes when no lanes are stored. Invalid or
    /// repeated lanes are dropped before tasks are reconciled against the
    /// remaining ones. State repaired during load is written back.
    ///
    /// # Errors
    /// - Storage read/write failures and invalid seed lanes.
    pub fn load(storage: S, config: BoardConfig) -> BoardResult<Self> {
        let mut lanes: SwimLaneStore =
            read_entry(&storage, &config.lanes_key, "lanes")?.unwrap_or_default();
        let mut tasks: TaskStore =
            read_entry(&storage, &config.tasks_key, "tasks")?.unwrap_or_default();

        let mut dirty = None;
        let dropped_lanes = lanes.reconcile();
        if !dropped_lanes.is_empty() {
            warn!(
                "event=board_reconcile module=board status=repaired entry=lanes dropped={}",
                dropped_lanes.len()
            );
            dirty = Some(Dirty::Lanes);
        }
        if lanes.is_empty() {
            let seeds = config
                .default_lanes
                .iter()
                .map(|seed| seed.to_lane())
                .collect::<Result<Vec<_>, _>>()?;
            lanes = SwimLaneStore::from_lanes(seeds);
            if !lanes.is_empty() {
                info!(
                    "event=board_seed module=board status=ok lanes={}",
                    lanes.len()
                );
                dirty = Some(Dirty::Lanes);
            }
        }

        let before = tasks.clone();
        let report = tasks.reconcile(&lanes.ids());
        if !report.is_clean() {
            warn!(
                "event=board_reconcile module=board status=repaired entry=tasks dropped={} reassigned={} index_rebuilt={}",
                report.dropped.len(),
                report.reassigned.len(),
                report.index_rebuilt
            );
        }
        if tasks != before {
            dirty = Some(match dirty {
                Some(_) => Dirty::Both,
                None => Dirty::Tasks,
            });
        }

        let service = Self {
            storage,
            config,
            tasks,
            lanes,
        };
        info!(
            "event=board_load module=board status=ok tasks={} lanes={}",
            service.tasks.len(),
            service.lanes.len()
        );
        if let Some(dirty) = dirty {
            service.persist(dirty)?;
        }
        Ok(service)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn task_store(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn lanes(&self) -> &[SwimLane] {
        self.lanes.lanes()
    }

    pub fn lane(&self, id: &str) -> Option<&SwimLane> {
        self.lanes.lane(id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.task(id)
    }

    /// Tasks of one lane in display order.
    pub fn lane_tasks(&self, lane_id: &str) -> Vec<&Task> {
        self.tasks.lane_tasks(lane_id)
    }

    /// All tasks in board order: lane by lane, top to bottom.
    pub fn board_tasks(&self) -> Vec<&Task> {
        self.lanes
            .lanes()
            .iter()
            .flat_map(|lane| self.tasks.lane_tasks(&lane.id))
            .collect()
    }

    /// Filters and sorts tasks for the list view.
    pub fn query_tasks(&self, query: &TaskQuery) -> Vec<&Task> {
        query.apply(self.board_tasks())
    }

    /// Validates `draft` and appends a new task to its lane.
    pub fn add_task(&mut self, draft: TaskDraft) -> BoardResult<Task> {
        let draft = draft.normalize()?;
        self.ensure_lane_exists(&draft.status)?;

        let task = self.tasks.add(draft);
        info!(
            "event=task_add module=board status=ok task_id={} lane_id={}",
            task.id, task.status
        );
        self.persist(Dirty::Tasks)?;
        Ok(task)
    }

    /// Merges `patch` into a task. A status change moves the task to the end
    /// of its new lane in the same step.
    ///
    /// Returns `Ok(None)` for unknown ids.
    pub fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> BoardResult<Option<Task>> {
        let patch = patch.normalize()?;
        if let Some(status) = patch.status.as_deref() {
            self.ensure_lane_exists(status)?;
        }

        let Some(task) = self.tasks.update(id, patch) else {
            info!("event=task_update module=board status=noop task_id={id}");
            return Ok(None);
        };
        info!(
            "event=task_update module=board status=ok task_id={id} lane_id={}",
            task.status
        );
        self.persist(Dirty::Tasks)?;
        Ok(Some(task))
    }

    /// Deletes a task. Returns `Ok(None)` for unknown ids.
    pub fn delete_task(&mut self, id: TaskId) -> BoardResult<Option<Task>> {
        let Some(task) = self.tasks.remove(id) else {
            info!("event=task_delete module=board status=noop task_id={id}");
            return Ok(None);
        };
        info!(
            "event=task_delete module=board status=ok task_id={id} lane_id={}",
            task.status
        );
        self.persist(Dirty::Tasks)?;
        Ok(Some(task))
    }

    /// Moves a task to the end of `lane_id`.
    ///
    /// Returns `Ok(false)` when the task is unknown or already there.
    pub fn move_task(&mut self, id: TaskId, lane_id: &str) -> BoardResult<bool> {
        self.ensure_lane_exists(lane_id)?;
        if !self.tasks.move_to(id, lane_id) {
            info!("event=task_move module=board status=noop task_id={id} lane_id={lane_id}");
            return Ok(false);
        }
        info!("event=task_move module=board status=ok task_id={id} lane_id={lane_id}");
        self.persist(Dirty::Tasks)?;
        Ok(true)
    }

    /// Replaces the order of one lane. `order` must list exactly the lane's
    /// current tasks.
    pub fn reorder_tasks(&mut self, lane_id: &str, order: Vec<TaskId>) -> BoardResult<()> {
        self.ensure_lane_exists(lane_id)?;
        if let Err(err) = self.tasks.reorder(lane_id, order) {
            warn!(
                "event=task_reorder module=board status=rejected lane_id={lane_id} error={err}"
            );
            return Err(err.into());
        }
        info!(
            "event=task_reorder module=board status=ok lane_id={lane_id} tasks={}",
            self.tasks.lane_ids(lane_id).len()
        );
        self.persist(Dirty::Tasks)
    }

    /// Appends a lane with a generated id and random palette color.
    pub fn add_lane(&mut self, name: &str) -> BoardResult<SwimLane> {
        let lane = SwimLane::new(name)?;
        self.lanes.insert(lane.clone());
        self.tasks.ensure_lane(&lane.id);
        info!(
            "event=lane_add module=board status=ok lane_id={} color={}",
            lane.id, lane.color
        );
        self.persist(Dirty::Both)?;
        Ok(lane)
    }

    /// Merges `patch` into a lane. Returns `Ok(None)` for unknown ids.
    pub fn update_lane(&mut self, id: &str, patch: LanePatch) -> BoardResult<Option<SwimLane>> {
        let patch = patch.normalize()?;
        let Some(lane) = self.lanes.update(id, patch) else {
            info!("event=lane_update module=board status=noop lane_id={id}");
            return Ok(None);
        };
        info!("event=lane_update module=board status=ok lane_id={id}");
        self.persist(Dirty::Lanes)?;
        Ok(Some(lane))
    }

    /// Deletes a lane, moving its tasks to the first remaining lane.
    ///
    /// Returns `Ok(None)` for unknown ids.
    ///
    /// # Errors
    /// - `BoardError::LastLane` when `id` is the only lane.
    pub fn delete_lane(&mut self, id: &str) -> BoardResult<Option<SwimLane>> {
        if !self.lanes.contains(id) {
            info!("event=lane_delete module=board status=noop lane_id={id}");
            return Ok(None);
        }
        if self.lanes.len() == 1 {
            warn!("event=lane_delete module=board status=rejected lane_id={id} reason=last_lane");
            return Err(BoardError::LastLane(id.to_string()));
        }

        let Some(lane) = self.lanes.remove(id) else {
            return Ok(None);
        };
        let target = self.lanes.first().map(|lane| lane.id.clone());
        let moved = self.tasks.evacuate_lane(id, target.as_deref());
        info!(
            "event=lane_delete module=board status=ok lane_id={id} moved_tasks={} target_lane_id={}",
            moved.len(),
            target.as_deref().unwrap_or("-")
        );
        self.persist(Dirty::Both)?;
        Ok(Some(lane))
    }

    /// Re-sorts lanes to `order`; unknown ids are ignored.
    pub fn reorder_lanes<T: AsRef<str>>(&mut self, order: &[T]) -> BoardResult<()> {
        self.lanes.reorder(order);
        info!(
            "event=lane_reorder module=board status=ok lanes={}",
            self.lanes.len()
        );
        self.persist(Dirty::Lanes)
    }

    fn ensure_lane_exists(&self, lane_id: &str) -> BoardResult<()> {
        if self.lanes.contains(lane_id) {
            Ok(())
        } else {
            Err(BoardError::UnknownLane(lane_id.to_string()))
        }
    }

    fn persist(&self, dirty: Dirty) -> BoardResult<()> {
        if matches!(dirty, Dirty::Tasks | Dirty::Both) {
            write_entry(&self.storage, &self.config.tasks_key, &self.tasks)?;
        }
        if matches!(dirty, Dirty::Lanes | Dirty::Both) {
            write_entry(&self.storage, &self.config.lanes_key, &self.lanes)?;
        }
        Ok(())
    }
}

fn read_entry<S, T>(storage: &S, key: &str, entry: &'static str) -> BoardResult<Option<T>>
where
    S: KeyValueStore,
    T: DeserializeOwned,
{
    let Some(raw) = storage.get_item(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            error!(
                "event=board_load module=board status=error entry={entry} error_code=parse_failed error={err}"
            );
            Ok(None)
        }
    }
}

fn write_entry<S, T>(storage: &S, key: &str, value: &T) -> BoardResult<()>
where
    S: KeyValueStore,
    T: serde::Serialize,
{
    let encoded = serde_json::to_string(value).map_err(BoardError::Encode)?;
    storage.set_item(key, &encoded).map_err(|err| {
        error!("event=board_persist module=board status=error key={key} error={err}");
        BoardError::from(err)
    })
}
