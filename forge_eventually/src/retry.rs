//! Retry-until-success driver.
//!
//! Runs a verification check repeatedly until it passes or the retry budget
//! is spent. Between attempts the driver sleeps on a tokio timer, so waiting
//! never blocks a worker thread and many checks can be outstanding at once.
//!
//! # Timing
//!
//! The first attempt always runs, even with a zero budget. Elapsed time is
//! compared against the budget after each failed attempt and again after each
//! pause; a new attempt never starts once the budget is spent. The check is
//! never interrupted, so the total wall-clock time can exceed the budget by
//! up to one polling interval plus the duration of one attempt.
//!
//! # Example
//!
//! ```
//! use forge_eventually::{retry_until_success, ensure, CheckOutcome};
//! use std::convert::Infallible;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let processed = Arc::new(AtomicUsize::new(0));
//!
//! let worker = processed.clone();
//! tokio::spawn(async move {
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!     worker.store(3, Ordering::SeqCst);
//! });
//!
//! retry_until_success(
//!     || -> CheckOutcome<Infallible> {
//!         let n = processed.load(Ordering::SeqCst);
//!         ensure(n == 3, || format!("expected 3 items, got {}", n)).into()
//!     },
//!     Duration::from_secs(2),
//! )
//! .await
//! .unwrap();
//! # }
//! ```

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::{RetryConfig, MIN_POLL_INTERVAL};
use crate::error::{ExpectationNotMet, RetryError, TimeoutFailure};
use crate::outcome::CheckOutcome;

/// Drives a check until it succeeds or its budget runs out.
///
/// The driver holds configuration only. Every call to [`run`](Self::run) or
/// [`run_async`](Self::run_async) keeps its own timer and attempt count, so a
/// single driver can be shared by concurrent invocations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryUntilSuccess {
    config: RetryConfig,
}

impl RetryUntilSuccess {
    /// Creates a driver with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Creates a driver with the given budget and the default polling interval.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(RetryConfig::new(timeout))
    }

    /// Returns the driver configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs a synchronous check until it succeeds.
    ///
    /// Returns `Ok(())` as soon as the check reports success. A fatal outcome
    /// ends the loop immediately and is returned unchanged as
    /// [`RetryError::Fatal`]. If the budget is spent while the check keeps
    /// reporting [`CheckOutcome::NotYetMet`], the last cause is returned
    /// inside [`RetryError::Timeout`].
    pub async fn run<F, E>(&self, mut check: F) -> Result<(), RetryError<E>>
    where
        F: FnMut() -> CheckOutcome<E>,
    {
        let mut deadline = Deadline::start(self.config);
        loop {
            deadline.attempts += 1;
            let cause = match deadline.classify(check()) {
                ControlFlow::Break(result) => return result,
                ControlFlow::Continue(cause) => cause,
            };
            deadline.pause_or_give_up(cause).await?;
        }
    }

    /// Runs an asynchronous check until it succeeds.
    ///
    /// Same contract as [`run`](Self::run). Each returned future is awaited to
    /// completion before the next pause starts; time spent inside the check
    /// counts against the budget.
    pub async fn run_async<F, Fut, E>(&self, mut check: F) -> Result<(), RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CheckOutcome<E>>,
    {
        let mut deadline = Deadline::start(self.config);
        loop {
            deadline.attempts += 1;
            let cause = match deadline.classify(check().await) {
                ControlFlow::Break(result) => return result,
                ControlFlow::Continue(cause) => cause,
            };
            deadline.pause_or_give_up(cause).await?;
        }
    }
}

/// Runs `check` until it succeeds or `timeout` elapses, polling every
/// [`DEFAULT_POLL_INTERVAL`](crate::config::DEFAULT_POLL_INTERVAL).
pub async fn retry_until_success<F, E>(check: F, timeout: Duration) -> Result<(), RetryError<E>>
where
    F: FnMut() -> CheckOutcome<E>,
{
    RetryUntilSuccess::with_timeout(timeout).run(check).await
}

/// Asynchronous-check counterpart of [`retry_until_success`].
pub async fn retry_until_success_async<F, Fut, E>(
    check: F,
    timeout: Duration,
) -> Result<(), RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CheckOutcome<E>>,
{
    RetryUntilSuccess::with_timeout(timeout)
        .run_async(check)
        .await
}

/// Per-invocation timer and attempt count.
struct Deadline {
    config: RetryConfig,
    started: Instant,
    attempts: u32,
}

impl Deadline {
    fn start(mut config: RetryConfig) -> Self {
        // Struct literals and deserialized configs bypass with_poll_interval.
        config.poll_interval = config.poll_interval.max(MIN_POLL_INTERVAL);
        Self {
            config,
            started: Instant::now(),
            attempts: 0,
        }
    }

    fn exhausted(&self) -> bool {
        self.started.elapsed() >= self.config.timeout
    }

    /// Breaks out of the loop on success or a fatal failure.
    fn classify<E>(
        &self,
        outcome: CheckOutcome<E>,
    ) -> ControlFlow<Result<(), RetryError<E>>, ExpectationNotMet> {
        match outcome {
            CheckOutcome::Success => {
                if self.attempts > 1 {
                    tracing::debug!(
                        "Check passed on attempt {} after {:?}",
                        self.attempts,
                        self.started.elapsed()
                    );
                }
                ControlFlow::Break(Ok(()))
            }
            CheckOutcome::NotYetMet(cause) => {
                tracing::debug!(
                    "Attempt {} not met after {:?}: {}",
                    self.attempts,
                    self.started.elapsed(),
                    cause.cause
                );
                ControlFlow::Continue(cause)
            }
            CheckOutcome::Fatal(err) => {
                tracing::warn!(
                    "Check failed on attempt {} with a non-retryable error",
                    self.attempts
                );
                ControlFlow::Break(Err(RetryError::Fatal(err)))
            }
        }
    }

    /// Sleeps one polling interval, or fails if the budget is spent.
    async fn pause_or_give_up(&self, cause: ExpectationNotMet) -> Result<(), TimeoutFailure> {
        if !self.exhausted() {
            tokio::time::sleep(self.config.poll_interval).await;
            if !self.exhausted() {
                return Ok(());
            }
        }

        let failure = TimeoutFailure {
            timeout: self.config.timeout,
            last_cause: cause,
            attempts: self.attempts,
            elapsed: self.started.elapsed(),
        };
        tracing::warn!(
            "Gave up after {} attempts in {:?} (timeout {:?}): {}",
            failure.attempts,
            failure.elapsed,
            failure.timeout,
            failure.last_cause.cause
        );
        Err(failure)
    }
}
