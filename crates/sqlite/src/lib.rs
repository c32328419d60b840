//! SQLite-backed blob storage for rxlog.
//!
//! Provides [`SqliteStore`], a persistent [`BlobStore`] keeping every blob
//! as one row of a `blobs` table.
//!
//! All SQL lives in `sql/*.sql` files, loaded via `include_str!`.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::{path::Path, time::SystemTime};
use store::BlobStore;

const SQL_SCHEMA: &str = include_str!("../sql/schema.sql");
const SQL_SELECT_VALUE: &str = include_str!("../sql/select_value.sql");
const SQL_SELECT_UPDATED_AT: &str = include_str!("../sql/select_updated_at.sql");
const SQL_UPSERT: &str = include_str!("../sql/upsert.sql");
const SQL_DELETE: &str = include_str!("../sql/delete.sql");

/// SQLite-backed blob store.
///
/// Wraps a `rusqlite::Connection` in a `Mutex` for thread safety.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open sqlite database {}", path.display()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory database (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Unix milliseconds of the last write to `key`, `None` if absent.
    pub fn updated_at(&self, key: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock();
        conn.query_row(SQL_SELECT_UPDATED_AT, [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("failed to read timestamp of '{key}'"))
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(SQL_SCHEMA)
            .context("failed to create blobs table")?;
        Ok(())
    }
}

impl BlobStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        conn.query_row(SQL_SELECT_VALUE, [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("failed to read '{key}'"))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(SQL_UPSERT, rusqlite::params![key, value, now_millis()])
            .with_context(|| format!("failed to write '{key}'"))?;
        tracing::debug!(key, bytes = value.len(), "wrote blob");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(SQL_DELETE, [key])
            .with_context(|| format!("failed to remove '{key}'"))?;
        Ok(())
    }
}

/// Current unix time in milliseconds, 0 if the clock is before the epoch.
fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
