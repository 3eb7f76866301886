//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its creation/patch inputs.
//! - Validate user-entered fields before they reach the task store.
//!
//! # Invariants
//! - `id` is never nil and never changes after creation.
//! - `title` is trimmed and non-empty.
//! - `priority` is always within 1..=3 (1 is highest).
//! - `updated_at` is never earlier than `created_at`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use super::swim_lane::LaneId;

/// Stable task identifier.
pub type TaskId = Uuid;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 5000;
pub const MAX_SHORT_FIELD_CHARS: usize = 100;

/// Task urgency. Serialized as its ordinal (`1` = highest).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    High = 1,
    #[default]
    Medium = 2,
    Low = 3,
}

impl TryFrom<u8> for Priority {
    type Error = TaskValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::High),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Low),
            other => Err(TaskValidationError::PriorityOutOfRange(other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value as u8
    }
}

/// Validation failures for task input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    BlankTitle,
    BlankStatus,
    PriorityOutOfRange(u8),
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::BlankTitle => write!(f, "task title is required"),
            Self::BlankStatus => write!(f, "task status must reference a swim lane"),
            Self::PriorityOutOfRange(value) => {
                write!(f, "task priority must be between 1 and 3, got {value}")
            }
            Self::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "task {field} must be at most {max_chars} characters, got {actual_chars}"
            ),
        }
    }
}

impl Error for TaskValidationError {}

/// Canonical task record, as persisted in the tasks entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub label: String,
    /// Id of the lane currently holding this task.
    pub status: LaneId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a task from validated draft input.
    ///
    /// Used by the task store after id generation; `now` seeds both
    /// timestamps.
    pub(crate) fn from_draft(id: TaskId, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            label: draft.label,
            status: draft.status,
            assignee: draft.assignee,
            creator: draft.creator,
            desired_date: draft.desired_date,
            delivery_date: draft.delivery_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks record-level invariants on a persisted or in-memory task.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if self.status.trim().is_empty() {
            return Err(TaskValidationError::BlankStatus);
        }
        Ok(())
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

/// Input for creating a task: every field except id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub label: String,
    pub status: LaneId,
    pub assignee: Option<String>,
    pub creator: Option<String>,
    pub desired_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// Creates a draft with default priority and empty optional fields.
    pub fn new(title: impl Into<String>, status: impl Into<LaneId>) -> Self {
        Self {
            title: title.into(),
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Trims text fields and enforces form rules.
    ///
    /// Blank optional text collapses to `None`.
    pub fn normalize(self) -> Result<Self, TaskValidationError> {
        let title = normalize_title(&self.title)?;
        let status = self.status.trim().to_string();
        if status.is_empty() {
            return Err(TaskValidationError::BlankStatus);
        }
        Ok(Self {
            title,
            description: normalize_text("description", &self.description, MAX_DESCRIPTION_CHARS)?,
            priority: self.priority,
            label: normalize_text("label", &self.label, MAX_SHORT_FIELD_CHARS)?,
            status,
            assignee: normalize_optional("assignee", self.assignee)?,
            creator: normalize_optional("creator", self.creator)?,
            desired_date: self.desired_date,
            delivery_date: self.delivery_date,
        })
    }
}

/// Partial update for an existing task.
///
/// `None` leaves a field unchanged. For clearable fields the inner option
/// distinguishes "set" (`Some(Some(v))`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub label: Option<String>,
    pub status: Option<LaneId>,
    pub assignee: Option<Option<String>>,
    pub creator: Option<Option<String>>,
    pub desired_date: Option<Option<NaiveDate>>,
    pub delivery_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn status(status: impl Into<LaneId>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// Returns whether applying this patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Trims text fields and enforces the same rules as `TaskDraft`.
    pub fn normalize(self) -> Result<Self, TaskValidationError> {
        let title = self.title.as_deref().map(normalize_title).transpose()?;
        let status = match self.status {
            Some(value) => {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() {
                    return Err(TaskValidationError::BlankStatus);
                }
                Some(trimmed)
            }
            None => None,
        };
        Ok(Self {
            title,
            description: self
                .description
                .as_deref()
                .map(|value| normalize_text("description", value, MAX_DESCRIPTION_CHARS))
                .transpose()?,
            priority: self.priority,
            label: self
                .label
                .as_deref()
                .map(|value| normalize_text("label", value, MAX_SHORT_FIELD_CHARS))
                .transpose()?,
            status,
            assignee: self
                .assignee
                .map(|value| normalize_optional("assignee", value))
                .transpose()?,
            creator: self
                .creator
                .map(|value| normalize_optional("creator", value))
                .transpose()?,
            desired_date: self.desired_date,
            delivery_date: self.delivery_date,
        })
    }

    /// Merges every field except `status` into `task`.
    ///
    /// Status changes go through the task store so the lane index moves in
    /// the same step.
    pub(crate) fn apply_fields(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(label) = self.label {
            task.label = label;
        }
        if let Some(assignee) = self.assignee {
            task.assignee = assignee;
        }
        if let Some(creator) = self.creator {
            task.creator = creator;
        }
        if let Some(desired_date) = self.desired_date {
            task.desired_date = desired_date;
        }
        if let Some(delivery_date) = self.delivery_date {
            task.delivery_date = delivery_date;
        }
    }
}

fn normalize_title(value: &str) -> Result<String, TaskValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::BlankTitle);
    }
    normalize_text("title", trimmed, MAX_TITLE_CHARS)
}

fn normalize_text(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<String, TaskValidationError> {
    let trimmed = value.trim();
    let actual_chars = trimmed.chars().count();
    if actual_chars > max_chars {
        return Err(TaskValidationError::FieldTooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, TaskValidationError> {
    match value {
        Some(value) => {
            let normalized = normalize_text(field, &value, MAX_SHORT_FIELD_CHARS)?;
            Ok((!normalized.is_empty()).then_some(normalized))
        }
        None => Ok(None),
    }
}
