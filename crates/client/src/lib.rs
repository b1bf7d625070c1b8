//! Scraping client for shopscrape.
//!
//! This crate provides the retrying HTTP fetcher, the listing page parser and
//! the scrape orchestrator shared by the server and CLI.

pub mod fetch;
pub mod parse;
pub mod pipeline;

pub use fetch::{FetchConfig, Fetcher, HttpTransport, RetryPolicy, Transport};
pub use parse::{ParsedPage, ParserConfig, ProductParser, RawProduct};
pub use pipeline::{ScrapeFailure, ScrapeRequest, ScrapeSettings, ScrapeSummary, Scraper};
