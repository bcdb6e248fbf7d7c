//! Search → status filter → stable sort.

use crate::model::task::Task;
use crate::model::ParseLabelError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Status filter applied after search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
    /// High priority only, regardless of completion.
    High,
}

impl StatusFilter {
    fn admits(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
            Self::High => task.is_high_priority(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::High => "high",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "high" => Ok(Self::High),
            other => Err(ParseLabelError::new("filter", other)),
        }
    }
}

/// Sort key for the derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Newest `created_at` first.
    #[default]
    Date,
    /// High, medium, low.
    Priority,
    /// Earliest due date first; undated tasks last.
    DueDate,
}

impl SortBy {
    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Date => b.created_at.cmp(&a.created_at),
            Self::Priority => b.priority.weight().cmp(&a.priority.weight()),
            Self::DueDate => match (a.due_date, b.due_date) {
                (Some(left), Some(right)) => left.cmp(&right),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Priority => "priority",
            Self::DueDate => "dueDate",
        }
    }
}

impl FromStr for SortBy {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "date" => Ok(Self::Date),
            "priority" => Ok(Self::Priority),
            "dueDate" | "due_date" | "due-date" => Ok(Self::DueDate),
            other => Err(ParseLabelError::new("sort key", other)),
        }
    }
}

/// The three view parameters besides the collection itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: StatusFilter,
    pub search_term: String,
    pub sort_by: SortBy,
}

/// Aggregate counts over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatistics {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub high_priority: usize,
}

/// Derives the visible sequence from `tasks`.
///
/// Search is a case-insensitive substring match on `text`; an empty term
/// matches everything. The sort is stable, so ties keep collection order.
pub fn apply(tasks: &[Task], query: &ViewQuery) -> Vec<Task> {
    let needle = query.search_term.to_lowercase();
    let mut visible = tasks
        .iter()
        .filter(|task| needle.is_empty() || task.text.to_lowercase().contains(&needle))
        .filter(|task| query.filter.admits(task))
        .cloned()
        .collect::<Vec<_>>();

    visible.sort_by(|a, b| query.sort_by.compare(a, b));
    visible
}

/// Counts over the full, unfiltered collection.
pub fn statistics(tasks: &[Task]) -> TaskStatistics {
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskStatistics {
        total: tasks.len(),
        active: tasks.len() - completed,
        completed,
        high_priority: tasks.iter().filter(|task| task.is_high_priority()).count(),
    }
}
