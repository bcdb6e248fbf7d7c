//! Task and settings persistence over a [`KeyValueStore`].

use super::kv::KeyValueStore;
use super::{Recovered, StoreError, StoreResult};
use crate::model::settings::Settings;
use crate::model::task::Task;
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Key holding the JSON array of tasks.
pub const TASKS_KEY: &str = "taskManager_tasks";
/// Key holding the JSON settings object.
pub const SETTINGS_KEY: &str = "taskManager_settings";

/// Reads and writes the task collection and settings.
pub struct TaskStore<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Writes the whole collection under [`TASKS_KEY`].
    pub fn save_tasks(&self, tasks: &[Task]) -> StoreResult<()> {
        self.save_json(TASKS_KEY, &tasks)?;
        info!(
            "event=tasks_save module=store status=ok count={}",
            tasks.len()
        );
        Ok(())
    }

    /// Loads the collection; absent or unreadable data yields an empty list.
    ///
    /// Records are decoded one by one. Records written before
    /// `priority`/`dueDate` existed, or carrying unusable values there, are
    /// upgraded on every load (`medium` / no due date). Records that still
    /// cannot be read are dropped and reported as
    /// [`StoreError::SkippedRecords`].
    pub fn load_tasks(&self) -> Recovered<Vec<Task>> {
        let (records, error) = self.load_json::<Vec<Value>>(TASKS_KEY).into_parts();
        if let Some(error) = error {
            return Recovered::fallback(Vec::new(), error);
        }

        let received = records.len();
        let tasks = records
            .into_iter()
            .filter_map(|record| serde_json::from_value::<Task>(record).ok())
            .collect::<Vec<_>>();
        let skipped = received - tasks.len();

        if skipped > 0 {
            warn!(
                "event=tasks_load module=store status=partial count={} skipped={skipped}",
                tasks.len()
            );
            return Recovered::fallback(
                tasks,
                StoreError::SkippedRecords {
                    key: TASKS_KEY,
                    skipped,
                },
            );
        }
        info!(
            "event=tasks_load module=store status=ok count={}",
            tasks.len()
        );
        Recovered::ok(tasks)
    }

    /// Removes the stored collection entirely.
    pub fn clear_tasks(&self) -> StoreResult<()> {
        self.kv
            .remove(TASKS_KEY)
            .map_err(|source| StoreError::Storage {
                key: TASKS_KEY,
                source,
            })?;
        info!("event=tasks_clear module=store status=ok");
        Ok(())
    }

    pub fn save_settings(&self, settings: &Settings) -> StoreResult<()> {
        self.save_json(SETTINGS_KEY, settings)
    }

    /// Loads settings, merging each stored key over the defaults.
    ///
    /// A key whose value cannot be read keeps its default and is named in
    /// [`StoreError::InvalidFields`]; the other keys still apply.
    pub fn load_settings(&self) -> Recovered<Settings> {
        let (stored, error) = self.load_json::<Map<String, Value>>(SETTINGS_KEY).into_parts();
        if let Some(error) = error {
            return Recovered::fallback(Settings::default(), error);
        }

        let (settings, rejected) = Settings::merge_stored(&stored);
        if rejected.is_empty() {
            return Recovered::ok(settings);
        }
        warn!(
            "event=settings_load module=store status=partial rejected={}",
            rejected.join(",")
        );
        Recovered::fallback(
            settings,
            StoreError::InvalidFields {
                key: SETTINGS_KEY,
                fields: rejected,
            },
        )
    }

    fn save_json<T: serde::Serialize + ?Sized>(
        &self,
        key: &'static str,
        value: &T,
    ) -> StoreResult<()> {
        let encoded = serde_json::to_string(value)
            .map_err(|source| StoreError::Serialization { key, source })?;
        self.kv.set(key, &encoded).map_err(|source| {
            error!(
                "event=kv_write module=store status=error key={key} bytes={} error={source}",
                encoded.len()
            );
            StoreError::Storage { key, source }
        })
    }

    fn load_json<T: DeserializeOwned + Default>(&self, key: &'static str) -> Recovered<T> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Recovered::ok(T::default()),
            Err(source) => {
                error!("event=kv_read module=store status=error key={key} error={source}");
                return Recovered::fallback(T::default(), StoreError::Storage { key, source });
            }
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => Recovered::ok(value),
            Err(source) => {
                warn!(
                    "event=kv_decode module=store status=error key={key} bytes={} error={source}",
                    raw.len()
                );
                Recovered::fallback(T::default(), StoreError::Serialization { key, source })
            }
        }
    }
}
