//! HTTP routes.
//!
//! - `GET /` liveness
//! - `GET /api/v1/scrap?pages=<n>&proxy=<url>` runs one scrape, guarded by
//!   the `x-token` header

use std::sync::Arc;

use axum::extract::{Query, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use shopscrape_client::{ScrapeFailure, ScrapeRequest, ScrapeSummary, Scraper};
use shopscrape_core::{AppConfig, CacheClient, KeyLocks};

use crate::error::ApiError;

pub const TOKEN_HEADER: &str = "x-token";

/// Shared by every request. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    cache: CacheClient,
    locks: KeyLocks,
    token: Arc<str>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: AppConfig, cache: CacheClient, token: &str, shutdown: CancellationToken) -> Self {
        Self { config: Arc::new(config), cache, locks: KeyLocks::new(), token: Arc::from(token), shutdown }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScrapParams {
    pub pages: Option<u32>,
    pub proxy: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScrapResponse {
    pub scrapping: &'static str,
    pub total_products_scrapped: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<ScrapeFailure>,
}

impl From<ScrapeSummary> for ScrapResponse {
    fn from(summary: ScrapeSummary) -> Self {
        Self {
            scrapping: "done",
            total_products_scrapped: summary.scraped,
            skipped: summary.skipped,
            failed: summary.failed,
            failures: summary.failures,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/scrap", get(scrap))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "Hello": "World" }))
}

async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(&*state.token) {
        tracing::warn!(path = %request.uri().path(), "rejected request with invalid token");
        return Err(ApiError::InvalidToken);
    }

    Ok(next.run(request).await)
}

async fn scrap(State(state): State<AppState>, Query(params): Query<ScrapParams>) -> Result<Json<ScrapResponse>, ApiError> {
    let request = ScrapeRequest { pages: params.pages.unwrap_or(state.config.default_pages) };
    tracing::info!(pages = request.pages, proxied = params.proxy.is_some(), "scrape requested");

    let scraper = Scraper::from_config(&state.config, state.cache.clone(), state.locks.clone(), params.proxy)?;
    let summary = scraper.run(&request, &state.shutdown.child_token()).await?;

    Ok(Json(summary.into()))
}
