//! SQLite-backed store.
//!
//! # Invariants
//! - Plain values live in `kv_entries`, set members in `kv_set_members`;
//!   the two namespaces never collide.
//! - Set members list in insertion order.

use super::{KeyValueStore, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Durable `KeyValueStore` over one SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }

    fn add_to_set(&self, key: &str, member: &str) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO kv_set_members (set_key, member) VALUES (?1, ?2);",
            params![key, member],
        )?;
        Ok(changed > 0)
    }

    fn remove_from_set(&self, key: &str, member: &str) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM kv_set_members WHERE set_key = ?1 AND member = ?2;",
            params![key, member],
        )?;
        Ok(changed > 0)
    }

    fn list_set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT member FROM kv_set_members
             WHERE set_key = ?1
             ORDER BY added_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([key])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(row.get::<_, String>(0)?);
        }
        Ok(members)
    }
}
