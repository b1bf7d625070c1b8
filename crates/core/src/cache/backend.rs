//! Raw key-value backend seam.

use std::time::Duration;

use crate::Error;

/// A string-valued key-value store with optional per-entry expiry.
///
/// Absent and expired keys read as `None`. Transport failures surface as
/// [`Error::Cache`] or [`Error::Database`] and are never retried here.
#[async_trait::async_trait]
pub trait KvBackend: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), Error>;

    /// Release the underlying connection.
    async fn close(&self) -> Result<(), Error> {
        Ok(())
    }
}
