//! In-memory task repository.
//!
//! # Responsibility
//! - Own the authoritative, insertion-ordered task collection.
//! - Validate before mutating and persist after every mutation.
//!
//! # Invariants
//! - Ids are unique within the collection.
//! - Rejected input leaves both memory and storage untouched.
//! - A storage failure never rolls back the in-memory mutation; memory stays
//!   authoritative for the session.

pub mod task_repo;
