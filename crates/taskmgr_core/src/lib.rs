//! Core domain logic for the task manager.
//! This crate is the single source of truth for task invariants; UI hosts
//! only render what it hands them.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::id::{next_id, TaskId};
pub use model::settings::{Settings, Theme};
pub use model::task::{parse_due_date, Priority, Task, TaskDraft};
pub use model::validation::{validate, TaskCandidate, ValidationError, ValidationReport};
pub use model::ParseLabelError;
pub use query::{apply, statistics, SortBy, StatusFilter, TaskStatistics, ViewQuery};
pub use repo::task_repo::{RepoResult, Saved, TaskRepository};
pub use service::debounce::SearchDebouncer;
pub use service::presenter::{Presenter, RecordingPresenter, Severity};
pub use service::search_input::SearchInput;
pub use service::task_manager::{ExportFile, TaskManager};
pub use store::kv::{KeyValueStore, SqliteKvStore};
pub use store::task_store::TaskStore;
pub use store::transfer::{export_payload, import_payload, ExportPayload, ImportReport};
pub use store::{KvError, Recovered, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
