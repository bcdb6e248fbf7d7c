//! Task manager use-case service.
//!
//! # Responsibility
//! - Dispatch user intents into the repository and refresh the derived view.
//! - Hold the current view parameters (filter, search term, sort key) and
//!   the user settings.
//!
//! # Invariants
//! - Every mutation that reaches the repository ends in exactly one refresh.
//! - Rejected input produces a notification and no refresh.
//! - No failure escapes as a panic or error; each becomes a notification.

use crate::clock::{Clock, SystemClock};
use crate::model::settings::{Settings, Theme};
use crate::model::task::{Task, TaskDraft};
use crate::query::{apply, statistics, SortBy, StatusFilter, TaskStatistics, ViewQuery};
use crate::repo::task_repo::{Saved, TaskRepository};
use crate::service::presenter::{Presenter, Severity};
use crate::store::kv::KeyValueStore;
use crate::store::task_store::TaskStore;
use crate::store::transfer::{export_file_name, export_payload, import_payload};
use crate::store::StoreError;
use log::{error, info, warn};

pub const MSG_TASK_ADDED: &str = "Task added successfully";
pub const MSG_TASK_UPDATED: &str = "Task updated";
pub const MSG_TASK_DELETED: &str = "Task deleted";
pub const MSG_COMPLETED_CLEARED: &str = "Completed tasks cleared";
pub const MSG_SAVE_FAILED: &str = "Failed to save tasks to local storage";
pub const MSG_LOAD_FAILED: &str = "Failed to load tasks from local storage";
pub const MSG_NOTHING_TO_EXPORT: &str = "No tasks to export";
pub const MSG_EXPORTED: &str = "Tasks exported successfully";
pub const MSG_EXPORT_FAILED: &str = "Failed to export tasks";
pub const MSG_IMPORT_EMPTY: &str = "Please enter JSON data to import";
pub const MSG_IMPORT_INVALID: &str = "Failed to import tasks: Invalid format";

/// An export ready for delivery by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

/// Intent dispatcher tying the repository, query pipeline and presenter.
pub struct TaskManager<S: KeyValueStore, P: Presenter> {
    repo: TaskRepository<S>,
    presenter: P,
    query: ViewQuery,
    settings: Settings,
}

impl<S: KeyValueStore, P: Presenter> TaskManager<S, P> {
    /// Loads tasks and settings, then renders the initial view.
    pub fn start(store: TaskStore<S>, presenter: P) -> Self {
        Self::start_with_clock(store, presenter, Box::new(SystemClock))
    }

    pub fn start_with_clock(store: TaskStore<S>, presenter: P, clock: Box<dyn Clock>) -> Self {
        let (settings, settings_error) = store.load_settings().into_parts();
        if let Some(err) = settings_error {
            warn!("event=settings_load module=service status=fallback error={err}");
        }

        let (repo, load_error) = TaskRepository::load_with_clock(store, clock).into_parts();
        let mut manager = Self {
            repo,
            presenter,
            query: ViewQuery {
                sort_by: settings.sort_by,
                ..ViewQuery::default()
            },
            settings,
        };

        if let Some(err) = load_error {
            error!("event=tasks_load module=service status=fallback error={err}");
            manager.presenter.notify(MSG_LOAD_FAILED, Severity::Error);
        }
        info!(
            "event=manager_start module=service status=ok tasks={} sort_by={}",
            manager.repo.len(),
            manager.query.sort_by.as_str()
        );
        manager.refresh();
        manager
    }

    /// Creates a task; returns it when accepted.
    pub fn add_task(&mut self, draft: TaskDraft) -> Option<Task> {
        match self.repo.add(draft) {
            Ok(saved) => {
                let task = self.settle(saved);
                self.presenter.notify(MSG_TASK_ADDED, Severity::Success);
                Some(task)
            }
            Err(err) => {
                self.presenter.notify(err.first_message(), Severity::Error);
                None
            }
        }
    }

    /// Replaces a task's text. Blank input is ignored.
    pub fn update_task(&mut self, id: &str, new_text: &str) -> Option<Task> {
        let trimmed = new_text.trim();
        if trimmed.is_empty() {
            return None;
        }

        match self.repo.update(id, trimmed) {
            Ok(saved) => {
                let updated = self.settle_if_found(saved)?;
                self.presenter.notify(MSG_TASK_UPDATED, Severity::Success);
                Some(updated)
            }
            Err(err) => {
                self.presenter.notify(err.first_message(), Severity::Error);
                None
            }
        }
    }

    pub fn toggle_task(&mut self, id: &str) -> Option<Task> {
        let saved = self.repo.toggle_completion(id);
        self.settle_if_found(saved)
    }

    /// Removes a task; refreshes even when `id` was unknown.
    pub fn delete_task(&mut self, id: &str) -> bool {
        let saved = self.repo.delete(id);
        let removed = self.settle(saved);
        self.presenter.notify(MSG_TASK_DELETED, Severity::Info);
        removed
    }

    pub fn clear_completed(&mut self) -> usize {
        let saved = self.repo.clear_completed();
        let removed = self.settle(saved);
        self.presenter.notify(MSG_COMPLETED_CLEARED, Severity::Info);
        removed
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.query.filter = filter;
        self.refresh();
    }

    /// Applies a search term (trimmed, case-folded).
    pub fn set_search_term(&mut self, term: &str) {
        self.query.search_term = term.trim().to_lowercase();
        self.refresh();
    }

    /// Changes the sort key and remembers it in settings.
    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.query.sort_by = sort_by;
        self.settings.sort_by = sort_by;
        self.save_settings();
        self.refresh();
    }

    /// Flips light/dark and persists the choice.
    pub fn toggle_theme(&mut self) -> Theme {
        self.settings.theme = self.settings.theme.toggled();
        self.save_settings();
        self.settings.theme
    }

    /// Builds an export of the whole collection.
    pub fn export_tasks(&mut self) -> Option<ExportFile> {
        if self.repo.is_empty() {
            self.presenter.notify(MSG_NOTHING_TO_EXPORT, Severity::Warning);
            return None;
        }

        let now = self.repo.clock().now();
        let payload = export_payload(self.repo.tasks(), now);
        match payload.to_json_pretty() {
            Ok(contents) => {
                info!(
                    "event=tasks_export module=service status=ok count={}",
                    payload.task_count
                );
                self.presenter.notify(MSG_EXPORTED, Severity::Success);
                Some(ExportFile {
                    file_name: export_file_name(now.date_naive()),
                    contents,
                })
            }
            Err(err) => {
                error!("event=tasks_export module=service status=error error={err}");
                self.presenter.notify(MSG_EXPORT_FAILED, Severity::Error);
                None
            }
        }
    }

    /// Imports tasks from export-format text; returns how many were added.
    ///
    /// Valid records are merged with first-write-wins semantics on `id`.
    pub fn import_text(&mut self, text: &str) -> usize {
        if text.trim().is_empty() {
            self.presenter.notify(MSG_IMPORT_EMPTY, Severity::Error);
            return 0;
        }

        let report = match import_payload(text) {
            Ok(report) => report,
            Err(err) => {
                warn!("event=tasks_import module=service status=error error={err}");
                self.presenter.notify(MSG_IMPORT_INVALID, Severity::Error);
                return 0;
            }
        };

        if report.discarded > 0 {
            self.presenter.notify(
                &format!(
                    "Imported {} valid tasks ({} invalid tasks skipped)",
                    report.kept(),
                    report.discarded
                ),
                Severity::Warning,
            );
        } else {
            self.presenter.notify(
                &format!("Successfully imported {} tasks", report.kept()),
                Severity::Success,
            );
        }

        if report.tasks.is_empty() {
            return 0;
        }
        let saved = self.repo.import_merge(report.tasks);
        self.settle(saved)
    }

    /// Recomputes the derived view and pushes it to the presenter.
    pub fn refresh(&mut self) {
        let tasks = self.repo.tasks();
        let visible = apply(tasks, &self.query);
        let stats = statistics(tasks);
        self.presenter.render(&visible);
        self.presenter.render_statistics(stats);
    }

    pub fn visible_tasks(&self) -> Vec<Task> {
        apply(self.repo.tasks(), &self.query)
    }

    pub fn statistics(&self) -> TaskStatistics {
        statistics(self.repo.tasks())
    }

    pub fn get_task(&self, id: &str) -> Option<Task> {
        self.repo.get(id)
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.repo.list()
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn repository(&self) -> &TaskRepository<S> {
        &self.repo
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_presenter(self) -> P {
        self.presenter
    }

    /// Reports a storage failure, refreshes, and hands back the value.
    fn settle<T>(&mut self, saved: Saved<T>) -> T {
        let (value, err) = saved.into_parts();
        if let Some(err) = err {
            self.report_save_failure(&err);
        }
        self.refresh();
        value
    }

    /// Like [`Self::settle`], but a `None` (unknown id) skips the refresh.
    fn settle_if_found<T>(&mut self, saved: Saved<Option<T>>) -> Option<T> {
        if saved.value.is_none() {
            return None;
        }
        self.settle(saved)
    }

    fn save_settings(&mut self) {
        if let Err(err) = self.repo.store().save_settings(&self.settings) {
            warn!("event=settings_save module=service status=error error={err}");
        }
    }

    fn report_save_failure(&mut self, err: &StoreError) {
        error!("event=tasks_save module=service status=error error={err}");
        self.presenter.notify(MSG_SAVE_FAILED, Severity::Error);
    }
}
