//! Derived views over the task collection.
//!
//! # Responsibility
//! - Produce the searched, filtered and sorted view the presentation layer
//!   renders.
//! - Compute collection-wide statistics.
//!
//! # Invariants
//! - Pipeline functions only read their input; they never mutate tasks.

mod pipeline;

pub use pipeline::{apply, statistics, SortBy, StatusFilter, TaskStatistics, ViewQuery};
