//! Runtime configuration resolved from the environment.
//!
//! | Variable                      | Default                          |
//! |-------------------------------|----------------------------------|
//! | `TASKMGR_DB_PATH`             | `<temp dir>/taskmgr.sqlite3`     |
//! | `TASKMGR_LOG_LEVEL`           | [`default_log_level`]            |
//! | `TASKMGR_LOG_DIR`             | unset (logging stays off)        |
//! | `TASKMGR_SEARCH_DEBOUNCE_MS`  | 300                              |
//!
//! Blank values count as unset.

use crate::logging::{default_log_level, normalize_level};
use crate::service::debounce::DEFAULT_SEARCH_DEBOUNCE;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "TASKMGR_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TASKMGR_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKMGR_LOG_DIR";
pub const ENV_SEARCH_DEBOUNCE_MS: &str = "TASKMGR_SEARCH_DEBOUNCE_MS";

const DEFAULT_DB_FILE_NAME: &str = "taskmgr.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
    pub search_debounce: Duration,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
        }
    }
}

impl CoreConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    /// Returns a message naming the variable when a value cannot be parsed.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level =
                normalize_level(&level).map_err(|err| format!("{ENV_LOG_LEVEL}: {err}"))?;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        if let Some(raw) = read(ENV_SEARCH_DEBOUNCE_MS) {
            let millis = raw.parse::<u64>().map_err(|err| {
                format!("{ENV_SEARCH_DEBOUNCE_MS}: invalid milliseconds `{raw}`: {err}")
            })?;
            config.search_debounce = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.search_debounce, Duration::from_millis(300));
    }

    #[test]
    fn reads_overrides_and_ignores_blank_values() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/data/tasks.db"),
            (ENV_LOG_LEVEL, "WARNING"),
            (ENV_LOG_DIR, "  "),
            (ENV_SEARCH_DEBOUNCE_MS, "120"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/data/tasks.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
        assert_eq!(config.search_debounce, Duration::from_millis(120));
    }

    #[test]
    fn rejects_unparsable_values() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_SEARCH_DEBOUNCE_MS, "soon")])).unwrap_err();
        assert!(err.contains(ENV_SEARCH_DEBOUNCE_MS));

        let err = CoreConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "loud")])).unwrap_err();
        assert!(err.contains(ENV_LOG_LEVEL));
    }
}
