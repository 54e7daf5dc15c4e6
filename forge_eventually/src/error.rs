//! Error types for eventually-consistent verification.
//!
//! A check reports [`ExpectationNotMet`] while the condition it verifies does
//! not hold yet. The driver absorbs those and either succeeds later or gives
//! up with a single [`TimeoutFailure`]. Anything else a check reports is
//! handed back untouched through [`RetryError::Fatal`].

use std::fmt;
use std::time::Duration;

/// The condition under test does not hold yet.
///
/// This is the only failure the retry driver will retry. The cause is a
/// human-readable description of what was still wrong.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("Expectation not met: {cause}")]
pub struct ExpectationNotMet {
    /// Why the check did not pass
    pub cause: String,
}

impl ExpectationNotMet {
    /// Creates a new expectation failure with the given cause.
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    /// Returns the cause reported by the check.
    pub fn cause(&self) -> &str {
        &self.cause
    }
}

/// The retry budget ran out before the check ever passed.
///
/// Carries the configured timeout and the most recent [`ExpectationNotMet`]
/// so the caller can see what state was still wrong when retries stopped.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error(
    "Expectation not met within {timeout:?} ({attempts} attempts, {elapsed:?} elapsed): {}",
    .last_cause.cause
)]
pub struct TimeoutFailure {
    /// Configured retry budget
    pub timeout: Duration,
    /// Cause reported by the last attempt
    #[source]
    pub last_cause: ExpectationNotMet,
    /// Number of times the check was invoked
    pub attempts: u32,
    /// Wall-clock time spent before giving up
    pub elapsed: Duration,
}

/// Error returned by the retry driver.
///
/// `Fatal` holds the check's own error value exactly as the check produced
/// it. It is never retried and never folded into a timeout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Retry budget exhausted
    Timeout(TimeoutFailure),
    /// Non-retryable failure reported by the check
    Fatal(E),
}

impl<E> RetryError<E> {
    /// Returns true if the budget was exhausted.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetryError::Timeout(_))
    }

    /// Returns the timeout failure, if this is one.
    pub fn timeout(&self) -> Option<&TimeoutFailure> {
        match self {
            RetryError::Timeout(failure) => Some(failure),
            RetryError::Fatal(_) => None,
        }
    }

    /// Consumes the error, returning the check's own error if it was fatal.
    pub fn into_fatal(self) -> Option<E> {
        match self {
            RetryError::Fatal(err) => Some(err),
            RetryError::Timeout(_) => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Timeout(failure) => write!(f, "{}", failure),
            RetryError::Fatal(err) => write!(f, "{}", err),
        }
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RetryError::Timeout(failure) => std::error::Error::source(failure),
            RetryError::Fatal(err) => err.source(),
        }
    }
}

impl<E> From<TimeoutFailure> for RetryError<E> {
    fn from(failure: TimeoutFailure) -> Self {
        RetryError::Timeout(failure)
    }
}
