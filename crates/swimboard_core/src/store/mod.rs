//! In-memory board state stores.
//!
//! # Responsibility
//! - `TaskStore`: task records plus the per-lane ordered index.
//! - `SwimLaneStore`: the ordered lane list.
//!
//! # Invariants
//! - Every task id appears in exactly one lane sequence, the one named by
//!   its `status`.
//! - Stores never touch storage; persistence is the board's job.

use crate::model::swim_lane::LaneId;
use crate::model::task::TaskId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod lane_store;
pub mod task_store;

pub use lane_store::SwimLaneStore;
pub use task_store::{IndexViolation, ReconcileReport, TaskStore};

/// Rejected store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Reorder input lists the same task twice.
    DuplicateInOrder { lane_id: LaneId, task_id: TaskId },
    /// Reorder input is not a permutation of the lane's current tasks.
    OrderMismatch {
        lane_id: LaneId,
        expected_len: usize,
        actual_len: usize,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateInOrder { lane_id, task_id } => write!(
                f,
                "reorder of lane `{lane_id}` lists task {task_id} more than once"
            ),
            Self::OrderMismatch {
                lane_id,
                expected_len,
                actual_len,
            } => write!(
                f,
                "reorder of lane `{lane_id}` must list exactly its {expected_len} tasks, got {actual_len} ids"
            ),
        }
    }
}

impl Error for StoreError {}
