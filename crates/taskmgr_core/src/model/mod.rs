//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and user settings shared by every layer.
//! - Own the validation rules a task must pass before it enters the collection.
//!
//! # Invariants
//! - Every task is identified by an opaque, immutable `TaskId`.
//! - A task accepted into the collection always passes [`validation::validate`].

use thiserror::Error;

pub mod id;
pub mod settings;
pub mod task;
pub mod validation;

/// Returned when a user-facing label does not name a known enum value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
