//! Key-value cache used for price-aware product deduplication.
//!
//! Values are stored as JSON text with an optional expiry. Two backends sit
//! behind the [`KvBackend`] seam:
//!
//! - Redis (default), via a reconnecting `ConnectionManager`
//! - SQLite via tokio-rusqlite, with WAL mode and versioned migrations;
//!   also the in-memory backend used by tests

pub mod backend;
pub mod client;
pub mod connection;
pub mod entries;
pub mod migrations;
pub mod redis_backend;

pub use crate::Error;

pub use backend::KvBackend;
pub use client::CacheClient;
pub use connection::SqliteBackend;
pub use redis_backend::RedisBackend;
