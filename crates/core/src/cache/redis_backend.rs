//! Redis key-value backend.
//!
//! Uses a multiplexed `ConnectionManager`, which reconnects on its own after
//! a dropped connection. Cloning the backend shares the connection.

use std::fmt;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::backend::KvBackend;
use crate::Error;

#[derive(Clone)]
pub struct RedisBackend {
    conn: ConnectionManager,
    url: String,
}

impl fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisBackend").field("url", &self.url).finish_non_exhaustive()
    }
}

impl RedisBackend {
    /// Connect and verify the server answers `PING`.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        let client = redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;

        tracing::info!(url, "connected to redis");

        Ok(Self { conn, url: url.to_string() })
    }
}

#[async_trait::async_trait]
impl KvBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), Error> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => {
                let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
                let _: () = conn.pset_ex(key, value, millis).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }
}
