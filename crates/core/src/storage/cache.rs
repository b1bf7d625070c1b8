//! Cache-backed storage: one JSON value under one cache key.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use super::Storage;
use crate::Error;
use crate::cache::CacheClient;

#[derive(Debug, Clone)]
pub struct CacheStorage {
    client: CacheClient,
    key: String,
    ttl: Option<Duration>,
}

impl CacheStorage {
    pub fn new(client: CacheClient, key: impl Into<String>, ttl: Option<Duration>) -> Self {
        Self { client, key: key.into(), ttl }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait::async_trait]
impl Storage for CacheStorage {
    fn technique(&self) -> &'static str {
        super::REDIS
    }

    async fn get_data(&self) -> Result<Value, Error> {
        Ok(self.client.get::<Value>(&self.key).await?.unwrap_or(Value::Null))
    }

    async fn save_data(&self, data: &Value) -> Result<(), Error> {
        self.client.set(&self.key, data, self.ttl).await
    }

    /// Binary blobs are not cached.
    async fn save_image(&self, _bytes: &[u8]) -> Result<PathBuf, Error> {
        Err(Error::Unsupported("cache storage does not store images".into()))
    }
}
