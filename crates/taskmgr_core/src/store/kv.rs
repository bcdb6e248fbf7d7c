//! Key-value backend contract and its SQLite implementation.

use super::KvError;
use rusqlite::{params, Connection, OptionalExtension};
use std::borrow::Borrow;

pub type KvResult<T> = Result<T, KvError>;

/// Durable string-to-string map.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> KvResult<()>;
    fn remove(&self, key: &str) -> KvResult<()>;
}

/// SQLite-backed key-value store over the `kv_entries` table.
///
/// Generic over ownership so callers can lend a connection (`&Connection`)
/// or hand one over (`Connection`).
pub struct SqliteKvStore<C: Borrow<Connection>> {
    conn: C,
    quota_bytes: Option<usize>,
}

impl<C: Borrow<Connection>> SqliteKvStore<C> {
    /// Wraps a connection already opened via [`crate::db::open_db`].
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            quota_bytes: None,
        }
    }

    /// Caps the size of any single stored value, like a browser storage quota.
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    pub fn connection(&self) -> &Connection {
        self.conn.borrow()
    }
}

impl<C: Borrow<Connection>> KeyValueStore for SqliteKvStore<C> {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .connection()
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        if let Some(limit) = self.quota_bytes {
            if value.len() > limit {
                return Err(KvError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                    limit,
                });
            }
        }

        self.connection().execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.connection()
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, SqliteKvStore};
    use crate::db::open_db_in_memory;
    use crate::store::KvError;

    #[test]
    fn set_overwrites_and_remove_deletes() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKvStore::new(&conn);

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn quota_rejects_oversized_values_without_writing() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteKvStore::new(&conn).with_quota(4);

        let err = store.set("k", "too long").unwrap_err();
        assert!(matches!(err, KvError::QuotaExceeded { size: 8, limit: 4, .. }));
        assert_eq!(store.get("k").unwrap(), None);
    }
}
