//! List-view filtering and sorting over tasks.
//!
//! # Invariants
//! - Filters are conjunctive; an unset filter matches everything.
//! - Sorted output is deterministic: ties break by task id.

use crate::model::task::{Priority, Task};
use std::cmp::Ordering;

/// Sort column for the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortKey {
    Priority,
    Created,
    Updated,
    DesiredDate,
    Title,
}

/// Filter and sort options for `BoardService::query_tasks`.
///
/// With `sort: None` tasks come back in board order: lane order first, then
/// position within the lane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: Option<String>,
    pub priority: Option<Priority>,
    /// Exact label match, case-insensitive.
    pub label: Option<String>,
    pub assignee: Option<String>,
    /// Substring of title or description, case-insensitive.
    pub text: Option<String>,
    pub sort: Option<TaskSortKey>,
    pub descending: bool,
}

impl TaskQuery {
    pub fn in_lane(lane_id: impl Into<String>) -> Self {
        Self {
            status: Some(lane_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = &self.status {
            if task.status != *status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(label) = &self.label {
            if !same_text(&task.label, label.trim()) {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee {
            let matched = task
                .assignee
                .as_deref()
                .is_some_and(|current| same_text(current, assignee.trim()));
            if !matched {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.trim().to_lowercase();
            if !needle.is_empty()
                && !task.title.to_lowercase().contains(&needle)
                && !task.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    /// Filters `tasks` (given in board order) and applies the sort, if any.
    pub fn apply<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
        let mut matched: Vec<&Task> = tasks.into_iter().filter(|task| self.matches(task)).collect();
        if let Some(key) = self.sort {
            matched.sort_by(|left, right| {
                let ordering = compare_by(key, left, right);
                let ordering = if self.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                ordering.then_with(|| left.id.cmp(&right.id))
            });
        }
        matched
    }
}

fn compare_by(key: TaskSortKey, left: &Task, right: &Task) -> Ordering {
    match key {
        TaskSortKey::Priority => left.priority.cmp(&right.priority),
        TaskSortKey::Created => left.created_at.cmp(&right.created_at),
        TaskSortKey::Updated => left.updated_at.cmp(&right.updated_at),
        // Undated tasks sort last in ascending order.
        TaskSortKey::DesiredDate => match (left.desired_date, right.desired_date) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        TaskSortKey::Title => left.title.to_lowercase().cmp(&right.title.to_lowercase()),
    }
}

/// Case-insensitive equality with full Unicode case folding, matching the
/// `text` filter.
fn same_text(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskDraft;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn task(title: &str, status: &str, priority: Priority) -> Task {
        Task::from_draft(
            Uuid::new_v4(),
            TaskDraft::new(title, status).with_priority(priority),
            Utc::now(),
        )
    }

    #[test]
    fn filters_are_conjunctive() {
        let mut a = task("Fix login bug", "todo", Priority::High);
        a.label = "Backend".to_string();
        let b = task("Write docs", "todo", Priority::Low);
        let c = task("Fix CSS", "done", Priority::High);
        let tasks = [a.clone(), b, c];

        let query = TaskQuery {
            status: Some("todo".to_string()),
            text: Some("fix".to_string()),
            label: Some("backend".to_string()),
            ..TaskQuery::default()
        };
        let hits = query.apply(&tasks);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, a.id);
    }

    #[test]
    fn unsorted_query_keeps_input_order() {
        let tasks = [
            task("b", "todo", Priority::Low),
            task("a", "todo", Priority::High),
        ];
        let hits = TaskQuery::in_lane("todo").apply(&tasks);
        assert_eq!(hits[0].title, "b");
        assert_eq!(hits[1].title, "a");
    }

    #[test]
    fn sorts_by_priority_and_desired_date() {
        let mut low = task("low", "todo", Priority::Low);
        let mut high = task("high", "todo", Priority::High);
        let undated = task("undated", "todo", Priority::Medium);
        low.desired_date = NaiveDate::from_ymd_opt(2026, 1, 1);
        high.desired_date = NaiveDate::from_ymd_opt(2026, 6, 1);
        let tasks = [low, high, undated];

        let by_priority = TaskQuery {
            sort: Some(TaskSortKey::Priority),
            ..TaskQuery::default()
        };
        let titles: Vec<_> = by_priority
            .apply(&tasks)
            .into_iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["high", "undated", "low"]);

        let by_date = TaskQuery {
            sort: Some(TaskSortKey::DesiredDate),
            ..TaskQuery::default()
        };
        let titles: Vec<_> = by_date
            .apply(&tasks)
            .into_iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["low", "high", "undated"]);
    }

    #[test]
    fn assignee_filter_skips_unassigned() {
        let mut mine = task("mine", "todo", Priority::Medium);
        mine.assignee = Some("Ana".to_string());
        let nobody = task("nobody", "todo", Priority::Medium);
        let tasks = [mine, nobody];

        let query = TaskQuery {
            assignee: Some("ana".to_string()),
            ..TaskQuery::default()
        };
        let hits = query.apply(&tasks);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "mine");
    }

    #[test]
    fn label_and_assignee_filters_fold_non_ascii_case() {
        let mut task_one = task("Überarbeiten", "todo", Priority::Medium);
        task_one.label = "Überprüfung".to_string();
        task_one.assignee = Some("Émile".to_string());
        let tasks = [task_one];

        let by_label = TaskQuery {
            label: Some("überprüfung".to_string()),
            ..TaskQuery::default()
        };
        assert_eq!(by_label.apply(&tasks).len(), 1);

        let by_assignee = TaskQuery {
            assignee: Some(" ÉMILE ".to_string()),
            ..TaskQuery::default()
        };
        assert_eq!(by_assignee.apply(&tasks).len(), 1);

        let by_text = TaskQuery {
            text: Some("ÜBER".to_string()),
            ..TaskQuery::default()
        };
        assert_eq!(by_text.apply(&tasks).len(), 1);
    }
}
