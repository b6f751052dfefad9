use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use super::schema;
use crate::error::{Error, Result};

/// A named, key-ordered collection inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Media,
    Checksums,
}

impl Collection {
    fn table(self) -> &'static str {
        match self {
            Collection::Media => "media",
            Collection::Checksums => "checksums",
        }
    }
}

/// Ordered byte-keyed store on a single SQLite file.
///
/// Every access goes through [`Store::view`] or [`Store::update`], each of which
/// wraps exactly one transaction. Keys compare bytewise, so `scan` yields them in
/// lexicographic byte order.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the store, taking an exclusive lock on the file for the
    /// lifetime of the returned value.
    pub fn open(path: &Path) -> Result<Self> {
        let unavailable = |reason: String| Error::StoreUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;
        Self::prepare(&conn, true).map_err(|e| match e {
            Error::Store(inner) => unavailable(inner.to_string()),
            other => other,
        })?;
        Ok(Self { conn })
    }

    /// Open a throwaway in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(&conn, false)?;
        Ok(Self { conn })
    }

    fn prepare(conn: &Connection, on_disk: bool) -> Result<()> {
        if on_disk {
            conn.execute_batch("PRAGMA locking_mode=EXCLUSIVE; PRAGMA journal_mode=WAL;")?;
        }
        schema::initialize(conn)?;
        schema::migrate(conn)?;
        Ok(())
    }

    /// Run `f` inside a read transaction. Nothing it does is committed.
    pub fn view<T>(&mut self, f: impl FnOnce(&Txn<'_>) -> Result<T>) -> Result<T> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Deferred)?;
        let txn = Txn { tx };
        f(&txn)
    }

    /// Run `f` inside a write transaction, committing only if it returns `Ok`.
    pub fn update<T>(&mut self, f: impl FnOnce(&Txn<'_>) -> Result<T>) -> Result<T> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let txn = Txn { tx };
        let value = f(&txn)?;
        txn.tx.commit()?;
        Ok(value)
    }
}

/// Handle to an open transaction.
pub struct Txn<'conn> {
    tx: Transaction<'conn>,
}

impl Txn<'_> {
    pub fn get(&self, collection: Collection, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let value = self
            .tx
            .query_row(
                &format!("SELECT value FROM {} WHERE key = ?1", collection.table()),
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn contains(&self, collection: Collection, key: &[u8]) -> Result<bool> {
        let found: Option<i64> = self
            .tx
            .query_row(
                &format!("SELECT 1 FROM {} WHERE key = ?1", collection.table()),
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Upsert: replaces any prior value at `key`.
    pub fn put(&self, collection: Collection, key: &[u8], value: &[u8]) -> Result<()> {
        self.tx.execute(
            &format!(
                "INSERT INTO {} (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                collection.table()
            ),
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete(&self, collection: Collection, key: &[u8]) -> Result<bool> {
        let removed = self.tx.execute(
            &format!("DELETE FROM {} WHERE key = ?1", collection.table()),
            params![key],
        )?;
        Ok(removed > 0)
    }

    /// Every `(key, value)` pair in ascending key order.
    pub fn scan(&self, collection: Collection) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut stmt = self.tx.prepare(&format!(
            "SELECT key, value FROM {} ORDER BY key",
            collection.table()
        ))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn len(&self, collection: Collection) -> Result<usize> {
        let count: i64 = self.tx.query_row(
            &format!("SELECT COUNT(*) FROM {}", collection.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .tx
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.tx.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
