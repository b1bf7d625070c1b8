//! SQLite connection management with pragma configuration.
//!
//! This module handles opening the SQLite database, applying required pragmas
//! for performance and concurrency (WAL mode), and running migrations.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
                       PRAGMA synchronous=NORMAL;
                       PRAGMA temp_store=MEMORY;
                       PRAGMA foreign_keys=ON;";

/// SQLite key-value backend handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct SqliteBackend {
    pub(crate) conn: Connection,
}

impl SqliteBackend {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// runs any pending migrations and deletes entries that expired while the
    /// database was closed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        let backend = Self { conn };
        let purged = backend.purge_expired().await?;
        if purged > 0 {
            tracing::debug!(purged, "removed expired cache entries");
        }

        Ok(backend)
    }

    /// Close the background connection. Later calls fail with a cache error.
    pub async fn close(&self) -> Result<(), Error> {
        self.conn
            .clone()
            .close()
            .await
            .map_err(|e| Error::Cache(format!("failed to close cache database: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = SqliteBackend::open_in_memory().await.unwrap();
        let version = db
            .conn
            .call(|conn| conn.query_row("SELECT sqlite_version()", [], |row| row.get::<_, String>(0)))
            .await
            .unwrap();
        assert!(!version.is_empty());
    }

    #[tokio::test]
    async fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");
        let db = SqliteBackend::open(&path).await.unwrap();
        assert!(path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_reopen_purges_expired_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");

        let db = SqliteBackend::open(&path).await.unwrap();
        db.put_entry("short", "1", Some(std::time::Duration::from_millis(50))).await.unwrap();
        db.put_entry("kept", "2", None).await.unwrap();
        db.close().await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(120)).await;

        let db = SqliteBackend::open(&path).await.unwrap();
        let rows = db
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM kv_entries", [], |row| row.get::<_, i64>(0)))
            .await
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(db.get_entry("kept").await.unwrap().as_deref(), Some("2"));
        db.close().await.unwrap();
    }
}
