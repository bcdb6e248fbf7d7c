//! Versioned export/import payloads.
//!
//! The export format is a self-describing JSON object:
//! `{ "version": "1.0", "exportDate": ..., "taskCount": N, "tasks": [...] }`.
//! Import accepts the same shape as free text.

use super::{StoreError, StoreResult};
use crate::model::task::Task;
use crate::model::validation::{validate, TaskCandidate};
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EXPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub task_count: usize,
    pub tasks: Vec<Task>,
}

impl ExportPayload {
    /// Pretty-printed JSON, as written to an export file.
    pub fn to_json_pretty(&self) -> StoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|source| StoreError::Serialization {
            key: "export",
            source,
        })
    }
}

/// Tasks that survived import validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub tasks: Vec<Task>,
    pub discarded: usize,
}

impl ImportReport {
    pub fn kept(&self) -> usize {
        self.tasks.len()
    }

    pub fn received(&self) -> usize {
        self.tasks.len() + self.discarded
    }
}

/// Builds an export snapshot of `tasks` stamped with `now`.
pub fn export_payload(tasks: &[Task], now: DateTime<Utc>) -> ExportPayload {
    ExportPayload {
        version: EXPORT_VERSION.to_string(),
        export_date: now,
        task_count: tasks.len(),
        tasks: tasks.to_vec(),
    }
}

/// File name for an export made on `date`: `tasks_YYYY-MM-DD.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("tasks_{}.json", date.format("%Y-%m-%d"))
}

/// Parses import text and keeps only records that pass validation.
///
/// Records must also carry the full task shape (`id`, timestamps); those
/// that do not are counted as discarded alongside validation failures.
///
/// # Errors
/// - [`StoreError::ImportFormat`] when the text is not JSON or `tasks` is
///   missing / not an array.
pub fn import_payload(json_text: &str) -> StoreResult<ImportReport> {
    let document: Value = serde_json::from_str(json_text)
        .map_err(|err| StoreError::ImportFormat(format!("not valid JSON: {err}")))?;

    let Some(records) = document.get("tasks").and_then(Value::as_array) else {
        return Err(StoreError::ImportFormat(
            "`tasks` is missing or not an array".to_string(),
        ));
    };

    let mut report = ImportReport::default();
    for record in records {
        match decode_record(record) {
            Some(task) => report.tasks.push(task),
            None => report.discarded += 1,
        }
    }

    if report.discarded > 0 {
        warn!(
            "event=tasks_import module=store status=partial kept={} discarded={}",
            report.kept(),
            report.discarded
        );
    } else {
        info!(
            "event=tasks_import module=store status=ok kept={}",
            report.kept()
        );
    }
    Ok(report)
}

fn decode_record(record: &Value) -> Option<Task> {
    if !validate(&TaskCandidate::from_json(record)).is_valid() {
        return None;
    }
    Task::deserialize(record).ok()
}
