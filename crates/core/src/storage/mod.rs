//! Pluggable persistence for scraped products.
//!
//! Every backend implements the same three-operation [`Storage`] contract:
//!
//! - `get_data` reads what the target currently holds
//! - `save_data` persists a JSON payload
//! - `save_image` writes an image blob and returns where it landed
//!
//! Callers never name a concrete backend. They ask a [`StorageSelector`] for
//! the factory registered under a technique name ("local", "redis", ...) and
//! hand it a [`StorageTarget`].

pub mod cache;
pub mod file;
pub mod selector;

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::Error;

pub use cache::CacheStorage;
pub use file::FileStorage;
pub use selector::{LOCAL, REDIS, StorageFactory, StorageSelector};

/// Where a storage call reads or writes: a file name for file storage, a
/// cache key for cache storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTarget {
    pub name: String,
    pub ttl: Option<Duration>,
}

impl StorageTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ttl: None }
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Capability set shared by all storage backends.
#[async_trait::async_trait]
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Technique name this backend is registered under.
    fn technique(&self) -> &'static str;

    /// Current contents of the target. `Value::Null` means nothing stored.
    async fn get_data(&self) -> Result<Value, Error>;

    async fn save_data(&self, data: &Value) -> Result<(), Error>;

    /// Write an image payload and return its path.
    async fn save_image(&self, bytes: &[u8]) -> Result<PathBuf, Error>;
}

/// Read the target's contents as `T`; `None` when nothing is stored.
pub async fn load<T>(storage: &dyn Storage) -> Result<Option<T>, Error>
where
    T: DeserializeOwned,
{
    let value = storage.get_data().await?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

/// Serialize `data` and save it to the target.
pub async fn store<T>(storage: &dyn Storage, data: &T) -> Result<(), Error>
where
    T: Serialize + Sync + ?Sized,
{
    let value = serde_json::to_value(data)?;
    storage.save_data(&value).await
}
