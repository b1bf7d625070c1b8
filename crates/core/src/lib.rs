//! Core types and shared functionality for shopscrape.
//!
//! This crate provides:
//! - Key-value cache client with Redis and SQLite backends
//! - Storage abstraction (file and cache) behind a technique selector
//! - Product records and cache key derivation
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod locks;
pub mod notify;
pub mod product;
pub mod storage;

pub use cache::CacheClient;
pub use config::{AppConfig, CacheBackend, ConfigError};
pub use error::Error;
pub use locks::KeyLocks;
pub use notify::{ConsoleNotifier, ConsoleStream, Notifier};
pub use product::{ProductRecord, image_file_name, product_cache_key};
pub use storage::{Storage, StorageSelector, StorageTarget};
