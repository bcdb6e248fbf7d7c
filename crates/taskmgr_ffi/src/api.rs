//! FFI use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to the UI host via FRB.
//! - Flatten core types into plain envelopes (strings, integers, booleans).
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every call opens the configured database, runs one intent, and returns
//!   the notifications that intent produced.
//! - Calls are serialized in-process so concurrent load-modify-store
//!   sequences cannot drop each other's writes.

use log::error;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError, RwLock};
use std::time::Instant;
use taskmgr_core::db::open_db;
use taskmgr_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_due_date,
    CoreConfig, ParseLabelError, Priority, RecordingPresenter, SearchInput, Severity, SortBy,
    SqliteKvStore, StatusFilter, Task, TaskDraft, TaskManager, TaskStatistics, TaskStore,
};

type SessionManager = TaskManager<SqliteKvStore<Connection>, RecordingPresenter>;

static ENV_CONFIG: OnceLock<CoreConfig> = OnceLock::new();
static DB_PATH_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);
static SESSION_LOCK: Mutex<()> = Mutex::new(());
static SEARCH_INPUT: OnceLock<Mutex<SearchInput>> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One notification raised while handling a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeItem {
    pub message: String,
    /// `info|success|warning|error`.
    pub severity: String,
}

/// Flattened task for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub text: String,
    /// `low|medium|high`.
    pub priority: String,
    /// `YYYY-MM-DD` when set.
    pub due_date: Option<String>,
    pub completed: bool,
    /// RFC 3339.
    pub created_at: String,
    /// RFC 3339.
    pub updated_at: String,
}

/// Collection-wide counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsItem {
    pub total: u32,
    pub active: u32,
    pub completed: u32,
    pub high_priority: u32,
}

/// Response envelope for mutating calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the intent took effect.
    pub ok: bool,
    /// The affected task, when there is one.
    pub task: Option<TaskItem>,
    /// Count for bulk intents (clear, import).
    pub affected: u32,
    pub notices: Vec<NoticeItem>,
}

impl TaskActionResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            affected: 0,
            notices: vec![NoticeItem {
                message: message.into(),
                severity: Severity::Error.as_str().to_string(),
            }],
        }
    }
}

/// Response envelope for the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub items: Vec<TaskItem>,
    pub stats: StatsItem,
    /// Effective sort key (`date|priority|dueDate`).
    pub sort_by: String,
    /// Current theme (`light|dark`).
    pub theme: String,
    pub notices: Vec<NoticeItem>,
}

/// Response envelope for exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskExportResponse {
    pub file_name: Option<String>,
    pub contents: Option<String>,
    pub notices: Vec<NoticeItem>,
}

/// Adds a task.
///
/// `priority` defaults to `medium`; `due_date` accepts `YYYY-MM-DD`; blank
/// optional inputs count as absent.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(
    text: String,
    priority: Option<String>,
    due_date: Option<String>,
) -> TaskActionResponse {
    let mut draft = TaskDraft::new(text.trim());
    if let Some(raw) = non_blank(priority) {
        match raw.parse::<Priority>() {
            Ok(value) => draft.priority = Some(value),
            Err(err) => return TaskActionResponse::failure(err.to_string()),
        }
    }
    if let Some(raw) = non_blank(due_date) {
        match parse_due_date(&raw) {
            Ok(value) => draft.due_date = Some(value),
            Err(err) => return TaskActionResponse::failure(err),
        }
    }

    with_session(|manager| {
        let task = manager.add_task(draft);
        action_response(manager, task, 0)
    })
}

/// Replaces a task's text.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(id: String, text: String) -> TaskActionResponse {
    with_session(|manager| {
        let task = manager.update_task(&id, &text);
        action_response(manager, task, 0)
    })
}

/// Flips a task's completion state.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: String) -> TaskActionResponse {
    with_session(|manager| {
        let task = manager.toggle_task(&id);
        action_response(manager, task, 0)
    })
}

/// Deletes a task; succeeds even when `id` is unknown.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> TaskActionResponse {
    with_session(|manager| {
        let removed = manager.delete_task(&id);
        TaskActionResponse {
            ok: true,
            task: None,
            affected: u32::from(removed),
            notices: drain_notices(manager),
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_clear_completed() -> TaskActionResponse {
    with_session(|manager| {
        let removed = manager.clear_completed();
        TaskActionResponse {
            ok: true,
            task: None,
            affected: to_u32(removed),
            notices: drain_notices(manager),
        }
    })
}

/// Lists tasks through the query pipeline.
///
/// `sort_by = None` uses the saved preference; a given key is saved.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(filter: String, search: String, sort_by: Option<String>) -> TaskListResponse {
    let filter = match parse_filter(&filter) {
        Ok(value) => value,
        Err(message) => return list_failure(message),
    };
    let sort_by = match non_blank(sort_by).map(|raw| raw.parse::<SortBy>()) {
        None => None,
        Some(Ok(value)) => Some(value),
        Some(Err(err)) => return list_failure(err.to_string()),
    };

    let outcome = run_session(|manager| {
        if let Some(sort_by) = sort_by {
            manager.set_sort_by(sort_by);
        }
        manager.set_filter(filter);
        manager.set_search_term(&search);
        list_response(manager)
    });

    outcome.unwrap_or_else(list_failure)
}

/// Records the current search box contents.
///
/// Returns milliseconds until the term applies; the host calls
/// [`search_poll`] once that interval has passed. Each keystroke restarts
/// the interval (`TASKMGR_SEARCH_DEBOUNCE_MS`, default 300).
#[flutter_rust_bridge::frb(sync)]
pub fn search_keystroke(raw: String) -> u32 {
    let now = Instant::now();
    let mut input = search_input().lock().unwrap_or_else(PoisonError::into_inner);
    input.keystroke(&raw, now);
    input
        .deadline()
        .map(|due_at| to_u32(due_at.saturating_duration_since(now).as_millis()))
        .unwrap_or(0)
}

/// Applies the pending search term once its quiet interval has elapsed.
///
/// Returns the refreshed list when the term fired, `None` while it is still
/// pending or when nothing was typed since the last application.
#[flutter_rust_bridge::frb(sync)]
pub fn search_poll(filter: String) -> Option<TaskListResponse> {
    let filter = match parse_filter(&filter) {
        Ok(value) => value,
        Err(message) => return Some(list_failure(message)),
    };
    let now = Instant::now();
    let mut input = search_input().lock().unwrap_or_else(PoisonError::into_inner);
    if input.deadline().map_or(true, |due_at| now < due_at) {
        return None;
    }

    let outcome = run_session(|manager| {
        manager.set_filter(filter);
        if input.tick(manager, now) {
            Some(list_response(manager))
        } else {
            None
        }
    });
    match outcome {
        Ok(response) => response,
        Err(message) => Some(list_failure(message)),
    }
}

/// Points every later call at the SQLite file `path`.
///
/// Hosts call this at startup with their app-data directory; until then the
/// path comes from `TASKMGR_DB_PATH` or the temp-dir default. Returns empty
/// string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "db path cannot be empty".to_string();
    }
    let mut slot = DB_PATH_OVERRIDE
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = Some(PathBuf::from(trimmed));
    String::new()
}

/// Builds an export file for the UI host to save.
#[flutter_rust_bridge::frb(sync)]
pub fn task_export() -> TaskExportResponse {
    let outcome = run_session(|manager| {
        let file = manager.export_tasks();
        TaskExportResponse {
            file_name: file.as_ref().map(|file| file.file_name.clone()),
            contents: file.map(|file| file.contents),
            notices: drain_notices(manager),
        }
    });

    outcome.unwrap_or_else(|message| TaskExportResponse {
        file_name: None,
        contents: None,
        notices: vec![error_notice(message)],
    })
}

/// Imports tasks from export-format JSON text.
#[flutter_rust_bridge::frb(sync)]
pub fn task_import(json_text: String) -> TaskActionResponse {
    with_session(|manager| {
        let appended = manager.import_text(&json_text);
        TaskActionResponse {
            ok: appended > 0,
            task: None,
            affected: to_u32(appended),
            notices: drain_notices(manager),
        }
    })
}

/// Flips light/dark theme and returns the new value.
#[flutter_rust_bridge::frb(sync)]
pub fn settings_toggle_theme() -> String {
    run_session(|manager| manager.toggle_theme().as_str().to_string())
        .unwrap_or_else(|message| {
            error!("event=ffi_call module=ffi status=error call=settings_toggle_theme error={message}");
            String::new()
        })
}

fn with_session(f: impl FnOnce(&mut SessionManager) -> TaskActionResponse) -> TaskActionResponse {
    run_session(f).unwrap_or_else(TaskActionResponse::failure)
}

/// Runs one intent against a freshly loaded manager while holding the
/// process-wide session lock.
fn run_session<T>(f: impl FnOnce(&mut SessionManager) -> T) -> Result<T, String> {
    let _guard = SESSION_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("task DB open failed: {err}"))?;
    let mut manager = TaskManager::start(
        TaskStore::new(SqliteKvStore::new(conn)),
        RecordingPresenter::default(),
    );
    Ok(f(&mut manager))
}

fn resolve_db_path() -> PathBuf {
    let configured = DB_PATH_OVERRIDE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    configured.unwrap_or_else(|| env_config().db_path.clone())
}

fn env_config() -> &'static CoreConfig {
    ENV_CONFIG.get_or_init(|| match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("event=ffi_config module=ffi status=fallback error={err}");
            CoreConfig::default()
        }
    })
}

fn search_input() -> &'static Mutex<SearchInput> {
    SEARCH_INPUT.get_or_init(|| Mutex::new(SearchInput::new(env_config().search_debounce)))
}

fn parse_filter(raw: &str) -> Result<StatusFilter, String> {
    match raw.trim() {
        "" => Ok(StatusFilter::All),
        label => label
            .parse::<StatusFilter>()
            .map_err(|err: ParseLabelError| err.to_string()),
    }
}

fn list_response(manager: &SessionManager) -> TaskListResponse {
    let presenter = manager.presenter();
    TaskListResponse {
        items: presenter.visible.iter().map(to_task_item).collect(),
        stats: to_stats_item(presenter.statistics),
        sort_by: manager.query().sort_by.as_str().to_string(),
        theme: manager.settings().theme.as_str().to_string(),
        notices: to_notices(&presenter.notifications),
    }
}

fn action_response(
    manager: &mut SessionManager,
    task: Option<Task>,
    affected: u32,
) -> TaskActionResponse {
    TaskActionResponse {
        ok: task.is_some(),
        task: task.as_ref().map(to_task_item),
        affected,
        notices: drain_notices(manager),
    }
}

fn list_failure(message: String) -> TaskListResponse {
    TaskListResponse {
        items: Vec::new(),
        stats: StatsItem::default(),
        sort_by: SortBy::default().as_str().to_string(),
        theme: String::new(),
        notices: vec![error_notice(message)],
    }
}

fn drain_notices(manager: &mut SessionManager) -> Vec<NoticeItem> {
    to_notices(&manager.presenter_mut().take_notifications())
}

fn to_notices(notifications: &[(String, Severity)]) -> Vec<NoticeItem> {
    notifications
        .iter()
        .map(|(message, severity)| NoticeItem {
            message: message.clone(),
            severity: severity.as_str().to_string(),
        })
        .collect()
}

fn error_notice(message: String) -> NoticeItem {
    NoticeItem {
        message,
        severity: Severity::Error.as_str().to_string(),
    }
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.clone(),
        text: task.text.clone(),
        priority: task.priority.as_str().to_string(),
        due_date: task
            .due_date
            .map(|date| date.format("%Y-%m-%d").to_string()),
        completed: task.completed,
        created_at: task.created_at.to_rfc3339(),
        updated_at: task.updated_at.to_rfc3339(),
    }
}

fn to_stats_item(stats: TaskStatistics) -> StatsItem {
    StatsItem {
        total: to_u32(stats.total),
        active: to_u32(stats.active),
        completed: to_u32(stats.completed),
        high_priority: to_u32(stats.high_priority),
    }
}

fn to_u32<T: TryInto<u32>>(value: T) -> u32 {
    value.try_into().unwrap_or(u32::MAX)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{
        configure_db_path, core_version, init_logging, search_keystroke, search_poll,
        settings_toggle_theme, task_add, task_clear_completed, task_delete, task_export,
        task_import, task_list, task_toggle, task_update,
    };
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    static TEST_DB_LOCK: Mutex<()> = Mutex::new(());

    /// A throwaway database that the API points at for one test.
    ///
    /// Tests touching storage run one at a time; the directory is removed
    /// when the guard drops.
    struct TestDb {
        _dir: TempDir,
        _guard: MutexGuard<'static, ()>,
    }

    fn test_db() -> TestDb {
        let guard = TEST_DB_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("tasks.sqlite3");
        let error = configure_db_path(path.to_string_lossy().into_owned());
        assert!(error.is_empty(), "{error}");
        TestDb {
            _dir: dir,
            _guard: guard,
        }
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn task_add_returns_item_and_success_notice() {
        let _db = test_db();
        let token = unique_token("add");
        let response = task_add(
            format!("buy milk {token}"),
            Some("high".to_string()),
            Some("2026-03-01".to_string()),
        );
        assert!(response.ok, "{:?}", response.notices);
        let task = response.task.expect("added task");
        assert_eq!(task.priority, "high");
        assert_eq!(task.due_date.as_deref(), Some("2026-03-01"));
        assert!(!task.completed);
        assert!(response
            .notices
            .iter()
            .any(|notice| notice.message == "Task added successfully" && notice.severity == "success"));

        let listed = task_list("all".to_string(), token, None);
        assert!(listed.items.iter().any(|item| item.id == task.id));
    }

    #[test]
    fn task_add_rejects_blank_text() {
        let _db = test_db();
        let response = task_add("   ".to_string(), None, None);
        assert!(!response.ok);
        assert!(response.task.is_none());
        assert_eq!(response.notices[0].message, "Task text is required");
        assert_eq!(response.notices[0].severity, "error");
    }

    #[test]
    fn task_add_rejects_unknown_priority_label() {
        let _db = test_db();
        let response = task_add("valid text".to_string(), Some("urgent".to_string()), None);
        assert!(!response.ok);
        assert_eq!(response.notices.len(), 1);
        assert_eq!(response.notices[0].severity, "error");
    }

    #[test]
    fn task_update_replaces_text() {
        let _db = test_db();
        let token = unique_token("update");
        let added = task_add(format!("draft {token}"), None, None);
        let id = added.task.expect("added task").id;

        let updated = task_update(id.clone(), format!("  final {token}  "));
        assert!(updated.ok, "{:?}", updated.notices);
        assert_eq!(updated.task.expect("updated task").text, format!("final {token}"));

        let missing = task_update("no-such-id".to_string(), "text".to_string());
        assert!(!missing.ok);
        assert!(missing.notices.is_empty());
    }

    #[test]
    fn task_toggle_then_clear_completed_removes_task() {
        let _db = test_db();
        let token = unique_token("clear");
        let added = task_add(format!("finish {token}"), None, None);
        let id = added.task.expect("added task").id;

        let toggled = task_toggle(id.clone());
        assert!(toggled.task.expect("toggled task").completed);

        let cleared = task_clear_completed();
        assert!(cleared.ok);
        assert!(cleared.affected >= 1);
        let listed = task_list("all".to_string(), token, None);
        assert!(listed.items.iter().all(|item| item.id != id));
    }

    #[test]
    fn task_delete_succeeds_for_unknown_id() {
        let _db = test_db();
        let response = task_delete("no-such-id".to_string());
        assert!(response.ok);
        assert_eq!(response.affected, 0);
        assert_eq!(response.notices[0].message, "Task deleted");
    }

    #[test]
    fn task_list_rejects_unknown_filter() {
        let _db = test_db();
        let response = task_list("someday".to_string(), String::new(), None);
        assert!(response.items.is_empty());
        assert_eq!(response.notices[0].severity, "error");
    }

    #[test]
    fn task_list_echoes_requested_sort() {
        let _db = test_db();
        let response = task_list("all".to_string(), String::new(), Some("priority".to_string()));
        assert_eq!(response.sort_by, "priority");
        assert!(response.notices.is_empty());
    }

    #[test]
    fn task_import_merges_and_export_contains_imported_task() {
        let _db = test_db();
        let token = unique_token("import");
        let payload = format!(
            r#"{{"version":"1.0","tasks":[
                {{"id":"{token}","text":"imported {token}","priority":"low","completed":false,
                  "createdAt":"2025-01-01T00:00:00Z","updatedAt":"2025-01-01T00:00:00Z"}},
                {{"id":"{token}-bad","text":"","priority":"low"}}
            ]}}"#
        );
        let imported = task_import(payload);
        assert!(imported.ok, "{:?}", imported.notices);
        assert_eq!(imported.affected, 1);
        assert_eq!(
            imported.notices[0].message,
            "Imported 1 valid tasks (1 invalid tasks skipped)"
        );

        let exported = task_export();
        let contents = exported.contents.expect("export contents");
        assert!(contents.contains(&token));
        assert!(exported
            .file_name
            .expect("export file name")
            .starts_with("tasks_"));
    }

    #[test]
    fn task_import_rejects_malformed_text() {
        let _db = test_db();
        let response = task_import("not json".to_string());
        assert!(!response.ok);
        assert_eq!(
            response.notices[0].message,
            "Failed to import tasks: Invalid format"
        );
    }

    #[test]
    fn settings_toggle_theme_alternates() {
        let _db = test_db();
        let first = settings_toggle_theme();
        let second = settings_toggle_theme();
        assert!(["light", "dark"].contains(&first.as_str()));
        assert_ne!(first, second);
    }

    #[test]
    fn configure_db_path_rejects_blank_path() {
        assert!(!configure_db_path("  ".to_string()).is_empty());
    }

    #[test]
    fn search_applies_latest_term_after_quiet_interval() {
        let _db = test_db();
        task_add("Buy milk".to_string(), None, None);
        task_add("Read book".to_string(), None, None);

        assert!(search_poll("all".to_string()).is_none());

        search_keystroke("bo".to_string());
        let wait_ms = search_keystroke("boo".to_string());
        assert!(wait_ms > 0);
        assert!(search_poll("all".to_string()).is_none());

        std::thread::sleep(Duration::from_millis(u64::from(wait_ms) + 50));
        let response = search_poll("all".to_string()).expect("term should fire");
        let texts = response
            .items
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, ["Read book"]);
        assert!(search_poll("all".to_string()).is_none());
    }

    #[test]
    fn search_poll_rejects_unknown_filter() {
        let response = search_poll("someday".to_string()).expect("error envelope");
        assert_eq!(response.notices[0].severity, "error");
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_nanos())
            .unwrap_or_default();
        format!("{prefix}-{}-{nanos}", std::process::id())
    }
}
