//! Search failure taxonomy, classification and recovery strategies.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Closed set of search error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// A valid, empty outcome. Never produced by the classifier.
    NoResults,
    NetworkError,
    Timeout,
    InvalidQuery,
    RateLimited,
    ServerError,
    Unknown,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::NetworkError | Self::Timeout | Self::ServerError | Self::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoResults => "no-results",
            Self::NetworkError => "network-error",
            Self::Timeout => "timeout",
            Self::InvalidQuery => "invalid-query",
            Self::RateLimited => "rate-limited",
            Self::ServerError => "server-error",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw failure reported by a search operation.
///
/// Network layers that know what went wrong attach a typed kind; anything else
/// is classified from its message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SearchFailure {
    pub kind: Option<ErrorKind>,
    pub message: String,
}

impl SearchFailure {
    pub fn typed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind: Some(kind), message: message.into() }
    }

    /// An unstructured failure, classified by inspecting its message.
    pub fn untyped(message: impl Into<String>) -> Self {
        Self { kind: None, message: message.into() }
    }
}

/// A classified search failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchError {
    pub kind: ErrorKind,
    pub retryable: bool,
    pub message: String,
    pub occurred_at: DateTime<Utc>,
    pub retry_count: u32,
}

impl SearchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, retry_count: u32) -> Self {
        Self { kind, retryable: kind.is_retryable(), message: message.into(), occurred_at: Utc::now(), retry_count }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SearchError {}

/// Classify a failure into a [`SearchError`].
///
/// A typed kind wins. Otherwise the lowercased message is inspected in a
/// fixed order; the first matching marker decides the kind.
pub fn classify(failure: &SearchFailure, retry_count: u32) -> SearchError {
    let kind = failure.kind.unwrap_or_else(|| sniff_kind(&failure.message));
    SearchError::new(kind, failure.message.clone(), retry_count)
}

fn sniff_kind(message: &str) -> ErrorKind {
    let message = message.to_lowercase();
    if message.contains("network") || message.contains("fetch") {
        ErrorKind::NetworkError
    } else if message.contains("timeout") {
        ErrorKind::Timeout
    } else if message.contains("rate") {
        ErrorKind::RateLimited
    } else if message.contains("invalid") {
        ErrorKind::InvalidQuery
    } else if message.contains("server") {
        ErrorKind::ServerError
    } else {
        ErrorKind::Unknown
    }
}

/// Action a UI can offer next to a failed search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RecoveryAction {
    Retry,
    ClearFilters,
    BrowseAll,
    /// Disable searching for a countdown before allowing a retry.
    WaitCooldown { seconds: u64 },
}

/// Human-readable recovery guidance for an error kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecoveryStrategy {
    pub kind: ErrorKind,
    pub title: String,
    pub message: String,
    pub steps: Vec<String>,
    pub action: Option<RecoveryAction>,
    pub retryable: bool,
}

/// Recovery guidance for `kind`.
///
/// `cooldown_secs` is the countdown attached to rate-limited searches.
pub fn recovery_strategy(kind: ErrorKind, cooldown_secs: u64) -> RecoveryStrategy {
    let (title, message, steps, action): (&str, &str, Vec<&str>, Option<RecoveryAction>) = match kind {
        ErrorKind::NoResults => (
            "No creators found",
            "We couldn't find any creators matching your search.",
            vec!["Check your spelling", "Try broader search terms", "Remove some filters", "Browse all categories"],
            Some(RecoveryAction::ClearFilters),
        ),
        ErrorKind::NetworkError => (
            "Connection problem",
            "We're having trouble connecting to our servers.",
            vec!["Check your internet connection", "Try refreshing the page", "Disable VPN if enabled"],
            Some(RecoveryAction::Retry),
        ),
        ErrorKind::Timeout => (
            "Search timed out",
            "The search is taking longer than expected.",
            vec!["Try a simpler search", "Remove some filters", "Check your connection speed"],
            Some(RecoveryAction::Retry),
        ),
        ErrorKind::InvalidQuery => (
            "Invalid search",
            "There's an issue with your search query.",
            vec!["Remove special characters", "Use simpler search terms", "Check for typos"],
            Some(RecoveryAction::ClearFilters),
        ),
        ErrorKind::RateLimited => (
            "Too many searches",
            "You're searching too quickly. Please wait a moment.",
            vec!["Wait a few seconds before searching again", "Refine your search instead of retyping it"],
            Some(RecoveryAction::WaitCooldown { seconds: cooldown_secs }),
        ),
        ErrorKind::ServerError => (
            "Server issue",
            "Our servers are experiencing issues. We're working on it.",
            vec!["Try again in a few minutes", "Browse popular creators instead"],
            Some(RecoveryAction::BrowseAll),
        ),
        ErrorKind::Unknown => (
            "Something went wrong",
            "An unexpected error occurred.",
            vec!["Try refreshing the page", "Clear your browser cache", "Try again later"],
            Some(RecoveryAction::Retry),
        ),
    };

    RecoveryStrategy {
        kind,
        title: title.to_string(),
        message: message.to_string(),
        steps: steps.into_iter().map(String::from).collect(),
        action,
        retryable: kind.is_retryable(),
    }
}
