//! Core configuration.
//!
//! # Responsibility
//! - Name the storage keys board state is persisted under.
//! - Describe the lanes seeded into a board with no saved lanes.
//! - Carry logging bootstrap settings for embedding callers.
//!
//! Every field has a default, so a partial JSON document is valid config.

use crate::logging::{default_log_level, init_logging};
use crate::model::swim_lane::{LaneColor, LaneValidationError, SwimLane};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_TASKS_KEY: &str = "tasks";
pub const DEFAULT_LANES_KEY: &str = "swimLanes";

/// Config loading failures.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

/// One lane created when a board starts without saved lanes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneSeed {
    pub id: String,
    pub name: String,
    pub color: LaneColor,
}

impl LaneSeed {
    pub fn new(id: &str, name: &str, color: LaneColor) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color,
        }
    }

    pub fn to_lane(&self) -> Result<SwimLane, LaneValidationError> {
        SwimLane::with_id(self.id.as_str(), self.name.as_str(), self.color)
    }
}

/// Board persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Storage key of the tasks entry.
    pub tasks_key: String,
    /// Storage key of the swim lanes entry.
    pub lanes_key: String,
    /// Lanes seeded when no lanes are persisted.
    pub default_lanes: Vec<LaneSeed>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            tasks_key: DEFAULT_TASKS_KEY.to_string(),
            lanes_key: DEFAULT_LANES_KEY.to_string(),
            default_lanes: vec![
                LaneSeed::new("todo", "To Do", LaneColor::Gray),
                LaneSeed::new("in_progress", "In Progress", LaneColor::Blue),
                LaneSeed::new("done", "Done", LaneColor::Green),
            ],
        }
    }
}

/// Logging bootstrap settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute log directory. `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Starts file logging when a directory is configured.
    ///
    /// Returns `Ok(false)` when no directory is set.
    pub fn init(&self) -> Result<bool, String> {
        let Some(log_dir) = self.log_dir.as_deref() else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log_dir is not valid UTF-8: `{}`", log_dir.display()))?;
        init_logging(&self.level, log_dir)?;
        Ok(true)
    }
}

/// Top-level config document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub board: BoardConfig,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
