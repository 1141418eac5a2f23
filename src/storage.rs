use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;

use crate::error::StorageError;

pub const ROUND_LOG_KEY: &str = "roundLog";
/// Owned by the presentation layer; the core never reads or writes it.
pub const DARK_MODE_KEY: &str = "darkModePreference";

const KV_DDL: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT NOT NULL PRIMARY KEY,
    value TEXT NOT NULL
);";

/// String key-value storage. Every `put` replaces the whole value.
pub trait KeyValueStore {
    /// # Errors
    ///
    /// Will return `Err` if the backend cannot be read
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Will return `Err` if the backend cannot be written
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Will return `Err` if the backend cannot be written
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// `Ok(None)` when the key is absent, `Err` when it holds something that does not parse.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the backend fails or the value is not valid json for `T`
    fn get_json<T>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
        Self: Sized,
    {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Will return `Err` if the value cannot be serialized or written
    fn put_json<T>(&mut self, key: &str, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
        Self: Sized,
    {
        let payload = serde_json::to_string(value)?;
        self.put(key, &payload)
    }
}

pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens (or creates) the sqlite file and makes sure the kv table exists.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the database cannot be opened or the table cannot be created
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(KV_DDL)?;
        Ok(Self { conn })
    }

    /// # Errors
    ///
    /// Will return `Err` if sqlite cannot allocate the database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(KV_DDL)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[derive(Default, Debug, Clone)]
pub struct MemoryKvStore {
    entries: HashMap<String, String>,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}
