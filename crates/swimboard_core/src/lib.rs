//! Core state for SwimBoard, a Kanban board of tasks grouped into swim lanes.
//! This crate is the single source of truth for board invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod service;
pub mod storage;
pub mod store;

pub use config::{BoardConfig, ConfigError, CoreConfig, LaneSeed, LoggingConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::swim_lane::{LaneColor, LaneId, LanePatch, LaneValidationError, SwimLane};
pub use model::task::{Priority, Task, TaskDraft, TaskId, TaskPatch, TaskValidationError};
pub use query::{TaskQuery, TaskSortKey};
pub use service::board_service::{BoardError, BoardResult, BoardService};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use store::{IndexViolation, ReconcileReport, StoreError, SwimLaneStore, TaskStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
