//! UI-facing bindings for the task manager core.

pub mod api;
