//! Write arbitration for the shared database.
//!
//! The CLI and the HTTP server may run as separate processes against the same
//! file. Every write takes an exclusive advisory lock next to the database and
//! runs inside an IMMEDIATE transaction that is committed before returning.

use super::init;
use anyhow::{Context, Result};
use fs2::FileExt;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    lock_path: PathBuf,
    busy_timeout: Duration,
}

impl Store {
    /// Open (creating and migrating if needed) the database at `path`.
    pub fn open(path: impl Into<PathBuf>, busy_timeout: Duration) -> Result<Self> {
        let path = path.into();
        init::open(&path, busy_timeout)?;

        Ok(Self {
            lock_path: crate::global::lock_file_for(&path),
            path,
            busy_timeout,
        })
    }

    pub fn from_config(config: &crate::config::StorageConfig) -> Result<Self> {
        Self::open(
            config.database_path()?,
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against a fresh connection.
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = init::connect(&self.path, self.busy_timeout)?;
        f(&conn)
    }

    /// Run `f` in one serialized, durable write transaction.
    ///
    /// Nothing `f` writes is visible to readers until it returns `Ok`; on
    /// `Err` the transaction is rolled back.
    pub fn write<T>(&self, f: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
        let _lock = WriteLock::acquire(&self.lock_path)?;

        let mut conn = init::connect(&self.path, self.busy_timeout)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("Failed to begin write transaction")?;

        let value = f(&tx)?;
        tx.commit().context("Failed to commit write transaction")?;

        Ok(value)
    }

    /// Async wrapper for [`Store::read`] that keeps SQLite off the runtime threads.
    pub async fn read_async<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.read(f))
            .await
            .context("Database task panicked")?
    }

    /// Async wrapper for [`Store::write`].
    pub async fn write_async<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Transaction) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.write(f))
            .await
            .context("Database task panicked")?
    }
}

struct WriteLock {
    file: File,
}

impl WriteLock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))?;
        file.lock_exclusive()
            .with_context(|| "Failed to acquire database write lock")?;
        Ok(Self { file })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(err) = self.file.unlock() {
            debug!("Failed to release database write lock: {err:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("huddle.db"), init::DEFAULT_BUSY_TIMEOUT).unwrap();
        (dir, store)
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let (_dir, store) = store();

        let result: Result<()> = store.write(|tx| {
            tx.execute(
                "INSERT INTO decisions (id, date, topic, text, created_at, updated_at)
                 VALUES (1, '2025-01-01', 't', 'x', 'now', 'now')",
                [],
            )?;
            anyhow::bail!("boom")
        });
        assert!(result.is_err());

        let count: i64 = store
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM decisions", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_lock_file_created_beside_database() {
        let (dir, store) = store();
        store.write(|_| Ok(())).unwrap();
        assert!(dir.path().join("huddle.db.lock").exists());
    }

    #[tokio::test]
    async fn test_async_wrappers() {
        let (_dir, store) = store();
        store
            .write_async(|tx| {
                tx.execute(
                    "INSERT INTO decisions (id, date, topic, text, created_at, updated_at)
                     VALUES (7, '2025-01-01', 't', 'x', 'now', 'now')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let max: i64 = store
            .read_async(|conn| Ok(conn.query_row("SELECT MAX(id) FROM decisions", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(max, 7);
    }
}
