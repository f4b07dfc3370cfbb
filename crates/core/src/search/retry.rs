//! Bounded retries with exponential backoff.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{ErrorKind, SearchError, SearchFailure, classify};
use crate::Error;

/// Retry limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3, base_delay: Duration::from_millis(1_000) }
    }
}

impl RetryPolicy {
    /// Wait after the failed attempt `attempt` (0-based): `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Progress notice emitted before each backoff wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryNotice {
    /// 1-based number of the attempt about to run.
    pub next_attempt: u32,
    pub max_attempts: u32,
    pub delay: Duration,
    pub kind: ErrorKind,
}

impl fmt::Display for RetryNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "retrying in {}s... attempt {}/{}",
            self.delay.as_secs_f64().ceil() as u64,
            self.next_attempt,
            self.max_attempts
        )
    }
}

type NoticeSink = Arc<dyn Fn(&RetryNotice) + Send + Sync>;

/// Cancellation and deadline for one search.
#[derive(Debug, Clone, Default)]
pub struct SearchControl {
    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
}

impl SearchControl {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel, deadline: None }
    }

    /// Give up once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    async fn deadline_reached(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

enum Interrupt {
    Cancelled,
    DeadlineExceeded,
}

/// Runs an operation until it succeeds, fails permanently, or runs out of attempts.
#[derive(Clone)]
pub struct RetryCoordinator {
    policy: RetryPolicy,
    on_retry: Option<NoticeSink>,
}

impl fmt::Debug for RetryCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryCoordinator").field("policy", &self.policy).finish_non_exhaustive()
    }
}

impl RetryCoordinator {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, on_retry: None }
    }

    /// Register a callback receiving a notice before each backoff wait.
    pub fn with_notices(mut self, on_retry: impl Fn(&RetryNotice) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Arc::new(on_retry));
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `operation` with retries.
    ///
    /// Non-retryable failures surface immediately. Cancellation and the
    /// deadline are honored before each attempt, while an attempt is in flight
    /// and during each backoff wait.
    ///
    /// # Errors
    ///
    /// - `Error::Search` with the classified last failure once attempts are
    ///   exhausted, on a non-retryable failure, or when the deadline passes
    ///   (reported as a timeout).
    /// - `Error::Cancelled` if `control.cancel` fires.
    pub async fn run<T, F, Fut>(&self, mut operation: F, control: &SearchControl) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchFailure>>,
    {
        let max_attempts = self.policy.max_retries.max(1);
        let mut attempt = 0;

        loop {
            if control.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let outcome = tokio::select! {
                biased;
                _ = control.cancel.cancelled() => Err(Interrupt::Cancelled),
                _ = control.deadline_reached() => Err(Interrupt::DeadlineExceeded),
                result = operation() => Ok(result),
            };

            let failure = match outcome {
                Ok(Ok(value)) => {
                    if attempt > 0 {
                        tracing::info!(attempts = attempt + 1, "search succeeded after retry");
                    }
                    return Ok(value);
                }
                Ok(Err(failure)) => failure,
                Err(interrupt) => return Err(self.interrupted(interrupt, attempt)),
            };

            let error = classify(&failure, attempt);
            if !error.retryable {
                tracing::warn!(kind = %error.kind, "search failed with non-retryable error: {}", error.message);
                return Err(Error::Search(error));
            }
            if attempt + 1 >= max_attempts {
                tracing::warn!(kind = %error.kind, attempts = max_attempts, "search retries exhausted: {}", error.message);
                return Err(Error::Search(error));
            }

            let notice = RetryNotice {
                next_attempt: attempt + 2,
                max_attempts,
                delay: self.policy.delay_for(attempt),
                kind: error.kind,
            };
            tracing::info!(kind = %error.kind, "{notice}");
            if let Some(on_retry) = &self.on_retry {
                on_retry(&notice);
            }

            tokio::select! {
                biased;
                _ = control.cancel.cancelled() => return Err(Error::Cancelled),
                _ = control.deadline_reached() => {
                    return Err(self.interrupted(Interrupt::DeadlineExceeded, attempt));
                }
                _ = tokio::time::sleep(notice.delay) => {}
            }

            attempt += 1;
        }
    }

    fn interrupted(&self, interrupt: Interrupt, attempt: u32) -> Error {
        match interrupt {
            Interrupt::Cancelled => Error::Cancelled,
            Interrupt::DeadlineExceeded => {
                tracing::warn!(attempt, "search deadline exceeded");
                Error::Search(SearchError::new(ErrorKind::Timeout, "search deadline exceeded", attempt))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn coordinator() -> RetryCoordinator {
        RetryCoordinator::new(RetryPolicy::default())
    }

    #[test]
    fn test_delay_sequence() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4_000));
    }

    #[test]
    fn test_notice_display() {
        let notice =
            RetryNotice { next_attempt: 2, max_attempts: 3, delay: Duration::from_secs(1), kind: ErrorKind::Timeout };
        assert_eq!(notice.to_string(), "retrying in 1s... attempt 2/3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_sequence_then_exhausted() {
        let started = Instant::now();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let recorded = calls.clone();

        let result: Result<(), Error> = coordinator()
            .run(
                || {
                    recorded.lock().unwrap().push(started.elapsed());
                    async { Err(SearchFailure::untyped("network down")) }
                },
                &SearchControl::default(),
            )
            .await;

        let offsets = calls.lock().unwrap().clone();
        assert_eq!(offsets, vec![Duration::ZERO, Duration::from_millis(1_000), Duration::from_millis(3_000)]);

        let err = result.unwrap_err();
        let search = err.search_error().expect("classified error");
        assert_eq!(search.kind, ErrorKind::NetworkError);
        assert_eq!(search.retry_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fail_then_succeed() {
        let attempts = AtomicU32::new(0);
        let result = coordinator()
            .run(
                || {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    async move { if n == 0 { Err(SearchFailure::untyped("server hiccup")) } else { Ok(vec![7]) } }
                },
                &SearchControl::default(),
            )
            .await;

        assert_eq!(result.unwrap(), vec![7]);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_surfaces_immediately() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), Error> = coordinator()
            .run(
                || {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    async { Err(SearchFailure::typed(ErrorKind::InvalidQuery, "query too long")) }
                },
                &SearchControl::default(),
            )
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err().search_error().unwrap().kind, ErrorKind::InvalidQuery);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notices_emitted_before_each_wait() {
        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = notices.clone();
        let coordinator = coordinator().with_notices(move |n| sink.lock().unwrap().push(n.to_string()));

        let _ = coordinator
            .run(|| async { Err::<(), _>(SearchFailure::untyped("timeout")) }, &SearchControl::default())
            .await;

        assert_eq!(
            *notices.lock().unwrap(),
            vec!["retrying in 1s... attempt 2/3".to_string(), "retrying in 2s... attempt 3/3".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff() {
        let control = SearchControl::default();
        let cancel = control.cancel.clone();
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            cancel.cancel();
        });

        let result: Result<(), Error> = coordinator()
            .run(
                move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Err(SearchFailure::untyped("network down")) }
                },
                &control,
            )
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let control = SearchControl::default();
        control.cancel.cancel();
        let result = coordinator().run(|| async { Ok::<_, SearchFailure>(1) }, &control).await;
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_aborts_in_flight_attempt() {
        let control = SearchControl::default().with_timeout(Duration::from_secs(5));
        let result = coordinator()
            .run(
                || async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok::<_, SearchFailure>(1)
                },
                &control,
            )
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.search_error().unwrap().kind, ErrorKind::Timeout);
    }
}
