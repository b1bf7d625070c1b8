//! Key-value entry operations for the SQLite backend.

use std::time::Duration;

use super::backend::KvBackend;
use super::connection::SqliteBackend;
use crate::Error;
use chrono::{SecondsFormat, Utc};
use tokio_rusqlite::params;

/// Fixed-width timestamps so `expires_at` compares correctly as text.
fn timestamp(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl SqliteBackend {
    /// Get a live entry by key.
    ///
    /// Returns None if the key doesn't exist or has expired.
    pub async fn get_entry(&self, key: &str) -> Result<Option<String>, Error> {
        let key = key.to_string();
        let now = timestamp(Utc::now());
        self.conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT value_json FROM kv_entries
                     WHERE key = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
                )?;

                let result = stmt.query_row(params![key, now], |row| row.get(0));

                match result {
                    Ok(json) => Ok(Some(json)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update an entry.
    ///
    /// Uses UPSERT semantics; a `None` ttl clears any previous expiry.
    pub async fn put_entry(&self, key: &str, value_json: &str, ttl: Option<Duration>) -> Result<(), Error> {
        let key = key.to_string();
        let value_json = value_json.to_string();

        let now = Utc::now();
        let expires_at = match ttl {
            Some(ttl) => {
                let ttl = chrono::Duration::from_std(ttl).map_err(|e| Error::InvalidInput(format!("ttl: {e}")))?;
                Some(timestamp(now + ttl))
            }
            None => None,
        };
        let updated_at = timestamp(now);

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO kv_entries (key, value_json, updated_at, expires_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key) DO UPDATE SET
                        value_json = excluded.value_json,
                        updated_at = excluded.updated_at,
                        expires_at = excluded.expires_at",
                    params![key, value_json, updated_at, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Delete expired entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        let now = timestamp(Utc::now());
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM kv_entries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                    params![now],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait::async_trait]
impl KvBackend for SqliteBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.get_entry(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), Error> {
        self.put_entry(key, &value, ttl).await
    }

    async fn close(&self) -> Result<(), Error> {
        SqliteBackend::close(self).await
    }
}
