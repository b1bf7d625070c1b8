//! HTTP fetch pipeline with fixed-interval retry.
//!
//! ### Attempts
//! - One GET per attempt through a [`Transport`]
//! - Non-2xx status and transport errors both count as a failed attempt
//! - Exactly `retries` attempts, `retries - 1` waits of `interval` between them
//! - Exhaustion yields `None`; the caller decides what a missing page means
//!
//! ### Cancellation
//! - The in-flight request and every wait race a [`CancellationToken`]
//! - A cancelled fetch yields `None` without further attempts

pub mod transport;
pub mod url;

use std::collections::BTreeMap;
use std::time::Duration;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;

pub use transport::{HttpTransport, Transport};
pub use url::{UrlError, canonicalize, listing_base, page_url};

use shopscrape_core::{AppConfig, Error};

/// Retry schedule for a single URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (default: 3)
    pub retries: u32,

    /// Pause between attempts (default: 5s)
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { retries: 3, interval: Duration::from_secs(5) }
    }
}

/// Configuration for the fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "shopscrape/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,

    /// Proxy URL for both http and https traffic
    pub proxy: Option<String>,

    pub retry: RetryPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "shopscrape/0.1".to_string(),
            timeout: Duration::from_millis(20000),
            headers: BTreeMap::new(),
            proxy: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl FetchConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            headers: config.default_headers.clone(),
            proxy: None,
            retry: RetryPolicy { retries: config.retries, interval: config.retry_interval() },
        }
    }

    /// Route requests through `proxy`. Empty strings mean no proxy.
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy.filter(|p| !p.trim().is_empty());
        self
    }
}

/// Retrying fetcher.
pub struct Fetcher<T = HttpTransport> {
    transport: T,
    retry: RetryPolicy,
}

impl Fetcher<HttpTransport> {
    /// Build a fetcher over a reqwest transport.
    pub fn from_config(config: &FetchConfig) -> Result<Self, Error> {
        Ok(Self::new(HttpTransport::new(config)?, config.retry))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// Fetch `url`, retrying on failure.
    ///
    /// Returns `None` when every attempt failed or `cancel` fired.
    pub async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Option<Bytes> {
        let mut remaining = self.retry.retries.max(1);

        loop {
            let attempt = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(url, "fetch cancelled");
                    return None;
                }
                result = self.transport.get(url) => result,
            };

            match attempt {
                Ok(bytes) => {
                    tracing::debug!(url, bytes = bytes.len(), "fetched");
                    return Some(bytes);
                }
                Err(e) => {
                    remaining -= 1;
                    tracing::warn!(url, error = %e, remaining, "fetch attempt failed");
                }
            }

            if remaining == 0 {
                tracing::warn!(url, retries = self.retry.retries, "giving up");
                return None;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(url, "fetch cancelled while waiting to retry");
                    return None;
                }
                _ = tokio::time::sleep(self.retry.interval) => {}
            }
        }
    }
}
