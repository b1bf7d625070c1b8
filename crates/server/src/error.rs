//! Structured errors for the shopscrape HTTP API.
//!
//! Internal causes are logged; clients only ever see the fixed bodies below.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or wrong `x-token` header.
    #[error("INVALID_TOKEN: missing or mismatched x-token header")]
    InvalidToken,

    /// The scrape run aborted.
    #[error("SCRAPE_FAILED: {0}")]
    Scrape(#[from] shopscrape_core::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Invalid Token" }))).into_response()
            }
            ApiError::Scrape(err) => {
                tracing::error!(code = err.code(), error = %err, "scrape failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Error while scrapping the data" })))
                    .into_response()
            }
        }
    }
}
