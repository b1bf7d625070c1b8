//! shopscrape one-shot runner.
//!
//! Loads the same configuration as the server, runs a single scrape and
//! prints the summary JSON to stdout. Logs and the completion notification go
//! to stderr. Ctrl-C stops the run after the current product; everything
//! already scraped is still persisted.

mod cli;
mod runner;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use shopscrape_client::ScrapeRequest;
use shopscrape_core::{AppConfig, CacheClient, Error};

use crate::cli::Args;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("Application error: {e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = AppConfig::load()?;
    if let Some(base_url) = args.base_url {
        config.base_url = Some(base_url);
    }
    config.require_base_url()?;

    let cache = CacheClient::connect(&config)
        .await
        .context("failed to connect to the cache")?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, finishing current product");
            on_ctrl_c.cancel();
        }
    });

    let request = ScrapeRequest { pages: args.pages.unwrap_or(config.default_pages) };
    let mut stdout = std::io::stdout();
    let result =
        runner::scrape_once(&config, cache.clone(), &request, args.proxy, &cancel, args.compact, &mut stdout).await;
    cache.close().await?;
    let summary = result?;

    if summary.cancelled {
        return Err(Error::Cancelled.into());
    }

    Ok(())
}
