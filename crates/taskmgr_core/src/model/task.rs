//! Task record and draft input.
//!
//! # Invariants
//! - `id` and `created_at` never change after construction.
//! - `updated_at >= created_at`; [`Task::touch`] clamps to keep it so.
//! - Records persisted by older builds may lack `priority`/`dueDate` or
//!   carry unusable values there; they decode as `medium` / absent.

use super::id::{next_id, TaskId};
use super::validation::{validate, TaskCandidate, ValidationError};
use super::ParseLabelError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Task urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort weight: high=3, medium=2, low=1.
    pub fn weight(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ParseLabelError::new("priority", other)),
        }
    }
}

/// Minimal unvalidated input used to create a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default, deserialize_with = "priority_or_default")]
    pub priority: Priority,
    #[serde(default, deserialize_with = "optional_due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a full task from a draft with a fresh id and `now` timestamps.
    ///
    /// The result is not validated; callers run [`Task::validate`] before
    /// accepting it into a collection.
    pub fn from_draft(draft: TaskDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: next_id(),
            text: draft.text,
            priority: draft.priority.unwrap_or_default(),
            due_date: draft.due_date,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Runs the validator over this record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(&TaskCandidate {
            text: Some(self.text.as_str()),
            priority: Some(self.priority.as_str()),
        })
        .into_result()
    }

    /// Stamps a new `updated_at`, never earlier than `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    pub fn is_high_priority(&self) -> bool {
        self.priority == Priority::High
    }
}

// Empty, null or unknown labels fall back to `medium`.
fn priority_or_default<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|label| label.parse().ok())
        .unwrap_or_default())
}

// Blank ("" from an untouched date input) or unparseable values read as absent.
fn optional_due_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|value| parse_due_date(value).ok()))
}

/// Parses a due date from `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|value| value.date_naive()))
        .map_err(|_| format!("invalid due date `{trimmed}`; expected YYYY-MM-DD"))
}
