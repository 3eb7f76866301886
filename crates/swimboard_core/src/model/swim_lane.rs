//! Swim lane domain model.
//!
//! # Responsibility
//! - Define lane records (id, display name, color tag).
//! - Pick lane colors from the fixed palette.
//!
//! # Invariants
//! - Lane ids are non-empty and never change after creation.
//! - Lane names are trimmed and non-empty.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Lane identifier. Also the value stored in `Task::status`.
pub type LaneId = String;

pub const MAX_LANE_NAME_CHARS: usize = 50;

/// Fixed lane color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneColor {
    Gray,
    Red,
    Orange,
    Yellow,
    Green,
    Teal,
    Blue,
    Cyan,
    Purple,
    Pink,
}

impl LaneColor {
    pub const PALETTE: [LaneColor; 10] = [
        Self::Gray,
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Teal,
        Self::Blue,
        Self::Cyan,
        Self::Purple,
        Self::Pink,
    ];

    /// Picks a palette color at random.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::PALETTE
            .choose(&mut rng)
            .copied()
            .unwrap_or(Self::Gray)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Teal => "teal",
            Self::Blue => "blue",
            Self::Cyan => "cyan",
            Self::Purple => "purple",
            Self::Pink => "pink",
        }
    }
}

impl Display for LaneColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for lane input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaneValidationError {
    BlankId,
    BlankName,
    NameTooLong { max_chars: usize, actual_chars: usize },
}

impl Display for LaneValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "swim lane id must not be blank"),
            Self::BlankName => write!(f, "swim lane name is required"),
            Self::NameTooLong {
                max_chars,
                actual_chars,
            } => write!(
                f,
                "swim lane name must be at most {max_chars} characters, got {actual_chars}"
            ),
        }
    }
}

impl Error for LaneValidationError {}

/// One board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwimLane {
    pub id: LaneId,
    pub name: String,
    pub color: LaneColor,
}

impl SwimLane {
    /// Creates a lane with a generated id and a random palette color.
    pub fn new(name: impl Into<String>) -> Result<Self, LaneValidationError> {
        Self::with_id(Uuid::new_v4().to_string(), name, LaneColor::random())
    }

    /// Creates a lane with a caller-provided id, e.g. for seeded defaults.
    pub fn with_id(
        id: impl Into<LaneId>,
        name: impl Into<String>,
        color: LaneColor,
    ) -> Result<Self, LaneValidationError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(LaneValidationError::BlankId);
        }
        Ok(Self {
            id,
            name: normalize_lane_name(&name.into())?,
            color,
        })
    }

    /// Checks a lane read back from storage.
    pub fn validate(&self) -> Result<(), LaneValidationError> {
        if self.id.trim().is_empty() {
            return Err(LaneValidationError::BlankId);
        }
        normalize_lane_name(&self.name).map(|_| ())
    }
}

/// Partial update for a lane. Ids are immutable and not patchable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LanePatch {
    pub name: Option<String>,
    pub color: Option<LaneColor>,
}

impl LanePatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            color: None,
        }
    }

    pub fn normalize(self) -> Result<Self, LaneValidationError> {
        Ok(Self {
            name: self
                .name
                .as_deref()
                .map(normalize_lane_name)
                .transpose()?,
            color: self.color,
        })
    }

    pub(crate) fn apply(self, lane: &mut SwimLane) {
        if let Some(name) = self.name {
            lane.name = name;
        }
        if let Some(color) = self.color {
            lane.color = color;
        }
    }
}

pub fn normalize_lane_name(value: &str) -> Result<String, LaneValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LaneValidationError::BlankName);
    }
    let actual_chars = trimmed.chars().count();
    if actual_chars > MAX_LANE_NAME_CHARS {
        return Err(LaneValidationError::NameTooLong {
            max_chars: MAX_LANE_NAME_CHARS,
            actual_chars,
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lane_gets_palette_color_and_unique_id() {
        let first = SwimLane::new("Backlog").unwrap();
        let second = SwimLane::new("Backlog").unwrap();

        assert_ne!(first.id, second.id);
        assert!(LaneColor::PALETTE.contains(&first.color));
        assert_eq!(first.name, "Backlog");
    }

    #[test]
    fn with_id_rejects_blank_values() {
        assert_eq!(
            SwimLane::with_id("  ", "Todo", LaneColor::Blue).unwrap_err(),
            LaneValidationError::BlankId
        );
        assert_eq!(
            SwimLane::with_id("todo", " ", LaneColor::Blue).unwrap_err(),
            LaneValidationError::BlankName
        );
    }

    #[test]
    fn validate_rejects_stored_blank_fields() {
        let mut lane = SwimLane::with_id("todo", "To Do", LaneColor::Gray).unwrap();
        assert!(lane.validate().is_ok());

        lane.name = "  ".to_string();
        assert_eq!(lane.validate(), Err(LaneValidationError::BlankName));

        lane.id = " ".to_string();
        assert_eq!(lane.validate(), Err(LaneValidationError::BlankId));
    }

    #[test]
    fn lane_serializes_color_as_lowercase_tag() {
        let lane = SwimLane::with_id("done", "Done", LaneColor::Green).unwrap();
        let json = serde_json::to_value(&lane).unwrap();
        assert_eq!(json["id"], "done");
        assert_eq!(json["color"], "green");
    }

    #[test]
    fn patch_rename_is_trimmed_and_validated() {
        let patch = LanePatch::rename("  Review ").normalize().unwrap();
        assert_eq!(patch.name.as_deref(), Some("Review"));

        let long = "n".repeat(MAX_LANE_NAME_CHARS + 1);
        assert!(matches!(
            LanePatch::rename(long).normalize(),
            Err(LaneValidationError::NameTooLong { .. })
        ));
    }
}
