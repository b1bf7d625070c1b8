//! Unified error types for shopscrape.
//!
//! Every variant carries an UPPER_SNAKE code prefix in its display string so
//! log lines and HTTP bodies can be grepped by category.

use tokio_rusqlite::rusqlite;

/// Unified error type shared by the core, client and server crates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., a non-array catalog payload).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// HTTP error response or network failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// A product node is missing one of its expected sub-elements.
    #[error("MALFORMED_PRODUCT: {0}")]
    MalformedProduct(String),

    /// No storage is registered under the requested technique name.
    #[error("UNKNOWN_TECHNIQUE: unknown storage technique: {0}")]
    UnknownTechnique(String),

    /// The storage variant does not support the requested operation.
    #[error("UNSUPPORTED: {0}")]
    Unsupported(String),

    /// Key-value cache transport failure.
    #[error("CACHE_ERROR: {0}")]
    Cache(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// JSON encoding or decoding failed.
    #[error("SERIALIZATION_ERROR: {0}")]
    Serialization(String),

    /// Filesystem operation failed.
    #[error("IO_ERROR: {0}")]
    Io(String),

    /// The run was cancelled by the caller.
    #[error("CANCELLED")]
    Cancelled,
}

impl Error {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::HttpError(_) => "HTTP_ERROR",
            Error::FetchTimeout(_) => "FETCH_TIMEOUT",
            Error::MalformedProduct(_) => "MALFORMED_PRODUCT",
            Error::UnknownTechnique(_) => "UNKNOWN_TECHNIQUE",
            Error::Unsupported(_) => "UNSUPPORTED",
            Error::Cache(_) | Error::Database(_) | Error::MigrationFailed(_) => "CACHE_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Cancelled => "CANCELLED",
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
