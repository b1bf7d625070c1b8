use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use shopscrape_client::{ScrapeRequest, ScrapeSummary, Scraper};
use shopscrape_core::{AppConfig, CacheClient, ConsoleNotifier, KeyLocks};

/// Run one scrape and write the summary JSON to `out`.
///
/// `out` receives nothing but the JSON document; the completion
/// notification goes to stderr.
pub async fn scrape_once(
    config: &AppConfig, cache: CacheClient, request: &ScrapeRequest, proxy: Option<String>,
    cancel: &CancellationToken, compact: bool, out: &mut impl Write,
) -> Result<ScrapeSummary> {
    let scraper = Scraper::from_config(config, cache, KeyLocks::new(), proxy)?
        .with_notifier(Arc::new(ConsoleNotifier::stderr()));
    let summary = scraper.run(request, cancel).await?;

    if compact {
        serde_json::to_writer(&mut *out, &summary)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
    }
    writeln!(out)?;

    Ok(summary)
}
