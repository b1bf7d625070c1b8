//! Technique-name registry for storage backends.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::{CacheStorage, FileStorage, Storage, StorageTarget};
use crate::Error;
use crate::cache::CacheClient;
use crate::locks::KeyLocks;

/// Local filesystem storage.
pub const LOCAL: &str = "local";

/// Key-value cache storage.
pub const REDIS: &str = "redis";

/// Builds a storage bound to one target.
pub type StorageFactory = Arc<dyn Fn(StorageTarget) -> Result<Box<dyn Storage>, Error> + Send + Sync>;

/// Maps technique names to storage factories.
///
/// New backends are added with [`StorageSelector::register`]; callers only
/// ever go through [`StorageSelector::resolve`].
#[derive(Clone, Default)]
pub struct StorageSelector {
    factories: BTreeMap<String, StorageFactory>,
}

impl fmt::Debug for StorageSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSelector")
            .field("techniques", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl StorageSelector {
    /// An empty selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// A selector with `local` (files under `data_root`) and `redis`
    /// (the shared cache client) registered.
    pub fn with_defaults(data_root: impl Into<PathBuf>, cache: CacheClient, locks: KeyLocks) -> Self {
        let data_root = data_root.into();
        let mut selector = Self::new();

        selector.register(LOCAL, move |target: StorageTarget| {
            let storage = FileStorage::new(data_root.clone(), target.name, locks.clone())?;
            Ok(Box::new(storage) as Box<dyn Storage>)
        });

        selector.register(REDIS, move |target: StorageTarget| {
            Ok(Box::new(CacheStorage::new(cache.clone(), target.name, target.ttl)) as Box<dyn Storage>)
        });

        selector
    }

    /// Register (or replace) the factory for `technique`.
    pub fn register<F>(&mut self, technique: impl Into<String>, factory: F)
    where
        F: Fn(StorageTarget) -> Result<Box<dyn Storage>, Error> + Send + Sync + 'static,
    {
        self.factories.insert(technique.into(), Arc::new(factory));
    }

    /// Look up the factory for `technique`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownTechnique` if nothing is registered under that name.
    pub fn resolve(&self, technique: &str) -> Result<StorageFactory, Error> {
        self.factories
            .get(technique)
            .cloned()
            .ok_or_else(|| Error::UnknownTechnique(technique.to_string()))
    }

    /// Resolve `technique` and build a storage for `target` in one step.
    pub fn open(&self, technique: &str, target: StorageTarget) -> Result<Box<dyn Storage>, Error> {
        (self.resolve(technique)?)(target)
    }

    /// Registered technique names, sorted.
    pub fn techniques(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}
