//! Resilient search: error classification, retries and orchestration.

pub mod error;
pub mod orchestrator;
pub mod retry;

pub use error::{
    ErrorKind, RecoveryAction, RecoveryStrategy, SearchError, SearchFailure, classify, recovery_strategy,
};
pub use orchestrator::{ResilientSearch, SearchOutcome, SearchStatus};
pub use retry::{RetryCoordinator, RetryNotice, RetryPolicy, SearchControl};
