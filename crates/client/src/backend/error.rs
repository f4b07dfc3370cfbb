//! Search backend error types.

use std::sync::Arc;

use shoutout_core::{ErrorKind, SearchFailure};

/// Errors from the search backend client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// Invalid backend base URL.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Invalid search query.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Rate limited by the backend.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// Map an unsuccessful HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => BackendError::RateLimited,
            400 | 422 => BackendError::InvalidQuery(format!("backend rejected query (HTTP {status})")),
            _ => BackendError::HttpError { status },
        }
    }

    /// Position of this error in the search error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::InvalidUrl(_) => ErrorKind::Unknown,
            BackendError::InvalidQuery(_) => ErrorKind::InvalidQuery,
            BackendError::RateLimited => ErrorKind::RateLimited,
            BackendError::HttpError { status } if *status >= 500 => ErrorKind::ServerError,
            BackendError::HttpError { .. } => ErrorKind::Unknown,
            BackendError::Timeout => ErrorKind::Timeout,
            BackendError::Network(_) => ErrorKind::NetworkError,
            BackendError::Parse(_) => ErrorKind::Unknown,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { BackendError::Timeout } else { BackendError::Network(Arc::new(err)) }
    }
}

impl From<BackendError> for SearchFailure {
    fn from(err: BackendError) -> Self {
        SearchFailure::typed(err.kind(), err.to_string())
    }
}
