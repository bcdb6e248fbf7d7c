//! Persistence store for the task collection and user settings.
//!
//! # Responsibility
//! - Serialize tasks/settings into a durable key-value backend.
//! - Build and parse the versioned export/import payload.
//!
//! # Invariants
//! - Load paths never fail: missing or unreadable entries degrade to an empty
//!   collection / default settings, with the cause handed back to the caller.
//! - Degradation is as local as possible: one bad task record or one bad
//!   settings value never discards its readable neighbours.
//! - Stored keys are stable across versions.

use crate::db::DbError;
use thiserror::Error;

pub mod kv;
pub mod task_store;
pub mod transfer;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure in the key-value backend itself.
#[derive(Debug, Error)]
pub enum KvError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("storage quota exceeded for `{key}`: {size} bytes exceeds limit of {limit} bytes")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence-layer error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage failure for `{key}`: {source}")]
    Storage {
        key: &'static str,
        #[source]
        source: KvError,
    },
    #[error("corrupt data under `{key}`: {source}")]
    Serialization {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("skipped {skipped} unreadable records under `{key}`")]
    SkippedRecords { key: &'static str, skipped: usize },
    #[error("ignored invalid values under `{key}`: {}", .fields.join(", "))]
    InvalidFields {
        key: &'static str,
        fields: Vec<String>,
    },
    #[error("invalid import payload: {0}")]
    ImportFormat(String),
}

/// A value produced by a load path that is not allowed to fail.
///
/// `error` carries the reason `value` fell back to its default, if any.
#[derive(Debug)]
#[must_use]
pub struct Recovered<T> {
    pub value: T,
    pub error: Option<StoreError>,
}

impl<T> Recovered<T> {
    pub fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    pub fn fallback(value: T, error: StoreError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    pub fn into_parts(self) -> (T, Option<StoreError>) {
        (self.value, self.error)
    }
}
