//! Per-run counters and failure log.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Something that went wrong without stopping the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeFailure {
    pub page: u32,
    /// Product title, absent for whole-page failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    pub reason: String,
}

/// Outcome of one scrape run.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeSummary {
    /// Products written to cache and catalog.
    pub scraped: usize,
    /// Products already cached at the same price.
    pub skipped: usize,
    /// Products that could not be extracted or whose image could not be fetched.
    pub failed: usize,
    pub pages_fetched: u32,
    pub pages_missing: u32,
    pub cancelled: bool,
    pub failures: Vec<ScrapeFailure>,
    pub started_at: String,
    pub finished_at: Option<String>,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ScrapeSummary {
    pub(crate) fn start() -> Self {
        Self {
            scraped: 0,
            skipped: 0,
            failed: 0,
            pages_fetched: 0,
            pages_missing: 0,
            cancelled: false,
            failures: Vec::new(),
            started_at: now(),
            finished_at: None,
        }
    }

    pub(crate) fn record_failure(&mut self, page: u32, product: Option<String>, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(ScrapeFailure { page, product, reason: reason.into() });
    }

    pub(crate) fn record_missing_page(&mut self, page: u32, url: &str) {
        self.pages_missing += 1;
        self.failures
            .push(ScrapeFailure { page, product: None, reason: format!("page unavailable after retries: {url}") });
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(now());
    }

    /// Line handed to the notifier at the end of a run.
    pub fn notification(&self) -> String {
        format!("Total Products Scrapped : {}", self.scraped)
    }
}
