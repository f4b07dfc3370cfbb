//! Unified error types for shoutout-search.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::config::ConfigError;
use crate::search::SearchError;

/// Unified error type for the search core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty query).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A search failed after retry, cache and fallback were exhausted.
    #[error("SEARCH_FAILED: {0}")]
    Search(SearchError),

    /// The caller cancelled the search.
    #[error("SEARCH_CANCELLED")]
    Cancelled,

    /// History database operation failed.
    #[error("HISTORY_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("HISTORY_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Configuration could not be loaded or is invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// The classified search error, if this is a search failure.
    pub fn search_error(&self) -> Option<&SearchError> {
        match self {
            Error::Search(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SearchError> for Error {
    fn from(err: SearchError) -> Self {
        Error::Search(err)
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

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message, data) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone(), None),
            Error::Search(search) => (-32010, search.message.clone(), serde_json::to_value(search).ok()),
            Error::Cancelled => (-32011, "search cancelled".to_string(), None),
            Error::Database(e) => (-32002, e.to_string(), None),
            Error::MigrationFailed(msg) => (-32002, msg.clone(), None),
            Error::Config(e) => (-32003, e.to_string(), None),
        };

        McpError { code: ErrorCode(code), message: message.into(), data }
    }
}
