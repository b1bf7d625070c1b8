//! JSON-encoding key-value cache client.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::backend::KvBackend;
use super::connection::SqliteBackend;
use super::redis_backend::RedisBackend;
use crate::Error;
use crate::config::{AppConfig, CacheBackend};

/// Process-wide cache handle.
///
/// Built once at startup with [`CacheClient::connect`] and shared by cloning;
/// [`CacheClient::close`] releases the connection at shutdown.
#[derive(Clone, Debug)]
pub struct CacheClient {
    backend: Arc<dyn KvBackend>,
}

impl CacheClient {
    /// Wrap an already-open backend.
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Open the backend selected by `config.cache_backend`.
    pub async fn connect(config: &AppConfig) -> Result<Self, Error> {
        let backend: Arc<dyn KvBackend> = match config.cache_backend {
            CacheBackend::Redis => Arc::new(RedisBackend::connect(&config.redis_url()).await?),
            CacheBackend::Sqlite => Arc::new(SqliteBackend::open(&config.sqlite_path).await?),
        };
        tracing::debug!(backend = ?config.cache_backend, "cache client ready");
        Ok(Self::new(backend))
    }

    /// In-memory SQLite cache for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        Ok(Self::new(Arc::new(SqliteBackend::open_in_memory().await?)))
    }

    /// Store `value` as JSON under `key`, expiring after `ttl` if given.
    pub async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, json, ttl).await
    }

    /// Read and decode the value under `key`; `None` when absent.
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
    {
        match self.backend.get(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn close(&self) -> Result<(), Error> {
        self.backend.close().await
    }
}
