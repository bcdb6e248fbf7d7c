//! Core use-case services.
//!
//! # Responsibility
//! - Turn user intents into repository mutations followed by a view refresh.
//! - Translate every failure into a user-visible notification.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod debounce;
pub mod presenter;
pub mod search_input;
pub mod task_manager;
