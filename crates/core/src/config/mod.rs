//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHOPSCRAPE_*)
//! 2. TOML config file (if SHOPSCRAPE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Backend used by the key-value cache client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Remote Redis server.
    Redis,
    /// Local SQLite file, for single-host deployments and development.
    Sqlite,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHOPSCRAPE_*)
/// 2. TOML config file (if SHOPSCRAPE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listing site root; page N lives at `<base_url>page/<N>/`.
    ///
    /// Set via SHOPSCRAPE_BASE_URL environment variable.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default request headers.
    ///
    /// Set via SHOPSCRAPE_DEFAULT_HEADERS environment variable as a JSON
    /// object string, or as a table in the TOML file.
    #[serde(default, deserialize_with = "deserialize_headers")]
    pub default_headers: BTreeMap<String, String>,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SHOPSCRAPE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Static token expected in the `x-token` header.
    ///
    /// Set via SHOPSCRAPE_STATIC_TOKEN environment variable.
    /// Required only when the HTTP server starts.
    #[serde(default)]
    pub static_token: Option<String>,

    /// Key-value cache backend.
    ///
    /// Set via SHOPSCRAPE_CACHE_BACKEND environment variable.
    #[serde(default = "default_cache_backend")]
    pub cache_backend: CacheBackend,

    /// Set via SHOPSCRAPE_REDIS_HOST environment variable.
    #[serde(default = "default_redis_host")]
    pub redis_host: String,

    /// Set via SHOPSCRAPE_REDIS_PORT environment variable.
    #[serde(default = "default_redis_port")]
    pub redis_port: u16,

    /// Set via SHOPSCRAPE_REDIS_DB environment variable.
    #[serde(default)]
    pub redis_db: i64,

    /// Path to the SQLite cache database (sqlite backend only).
    ///
    /// Set via SHOPSCRAPE_SQLITE_PATH environment variable.
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,

    /// Expiration for product cache entries; `None` keeps them until evicted.
    ///
    /// Set via SHOPSCRAPE_CACHE_TTL_SECS environment variable.
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    /// Directory holding `data/` and `images/`.
    ///
    /// Set via SHOPSCRAPE_DATA_ROOT environment variable.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Catalog document name under `data/`.
    ///
    /// Set via SHOPSCRAPE_CATALOG_FILE environment variable.
    #[serde(default = "default_catalog_file")]
    pub catalog_file: String,

    /// Attempts per URL before giving up.
    ///
    /// Set via SHOPSCRAPE_RETRIES environment variable.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Fixed wait between attempts in milliseconds.
    ///
    /// Set via SHOPSCRAPE_RETRY_INTERVAL_MS environment variable.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Pages scraped when the request does not say.
    ///
    /// Set via SHOPSCRAPE_DEFAULT_PAGES environment variable.
    #[serde(default = "default_pages")]
    pub default_pages: u32,

    /// Set via SHOPSCRAPE_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Set via SHOPSCRAPE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Headers arrive either as a JSON document (env) or as a table (TOML, defaults).
#[derive(Deserialize)]
#[serde(untagged)]
enum HeadersInput {
    Table(BTreeMap<String, String>),
    Json(String),
}

fn deserialize_headers<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match HeadersInput::deserialize(deserializer)? {
        HeadersInput::Table(map) => Ok(map),
        HeadersInput::Json(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
        HeadersInput::Json(raw) => serde_json::from_str(&raw)
            .map_err(|e| serde::de::Error::custom(format!("default_headers must be a JSON object of strings: {e}"))),
    }
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Redis
}

fn default_redis_host() -> String {
    "127.0.0.1".into()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./shopscrape-cache.sqlite")
}

fn default_data_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_catalog_file() -> String {
    "products.json".into()
}

fn default_retries() -> u32 {
    3
}

fn default_retry_interval_ms() -> u64 {
    5_000
}

fn default_pages() -> u32 {
    5
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".into()
}

fn default_user_agent() -> String {
    "shopscrape/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_headers: BTreeMap::new(),
            timeout_ms: default_timeout_ms(),
            static_token: None,
            cache_backend: default_cache_backend(),
            redis_host: default_redis_host(),
            redis_port: default_redis_port(),
            redis_db: 0,
            sqlite_path: default_sqlite_path(),
            cache_ttl_secs: None,
            data_root: default_data_root(),
            catalog_file: default_catalog_file(),
            retries: default_retries(),
            retry_interval_ms: default_retry_interval_ms(),
            default_pages: default_pages(),
            bind_addr: default_bind_addr(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Wait between fetch attempts.
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    /// Expiration applied to product cache entries.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Connection URL for the Redis backend.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.redis_host, self.redis_port, self.redis_db)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHOPSCRAPE_`
    /// 2. TOML file from `SHOPSCRAPE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHOPSCRAPE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHOPSCRAPE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Base URL of the listing site (required for scraping).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the base URL is not set.
    pub fn require_base_url(&self) -> Result<&str, ConfigError> {
        self.base_url.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "base_url".into(),
            hint: "Set SHOPSCRAPE_BASE_URL environment variable".into(),
        })
    }

    /// Token the HTTP server checks (deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the static token is not set.
    pub fn require_static_token(&self) -> Result<&str, ConfigError> {
        self.static_token.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "static_token".into(),
            hint: "Set SHOPSCRAPE_STATIC_TOKEN environment variable".into(),
        })
    }
}
