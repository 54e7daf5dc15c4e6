//! Outcome of a single verification attempt.
//!
//! Checks classify themselves: the driver never inspects an error to decide
//! whether it is worth retrying. A check returns [`CheckOutcome::NotYetMet`]
//! to ask for another attempt and [`CheckOutcome::Fatal`] to stop.

use crate::error::ExpectationNotMet;

/// Result of one invocation of a check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckOutcome<E> {
    /// The condition holds
    Success,
    /// The condition does not hold yet; retry after the polling interval
    NotYetMet(ExpectationNotMet),
    /// Unrelated failure; abort and hand the error back to the caller
    Fatal(E),
}

impl<E> CheckOutcome<E> {
    /// Shorthand for a not-yet-met outcome with the given cause.
    pub fn not_yet_met(cause: impl Into<String>) -> Self {
        CheckOutcome::NotYetMet(ExpectationNotMet::new(cause))
    }

    /// Shorthand for a fatal outcome.
    pub fn fatal(err: E) -> Self {
        CheckOutcome::Fatal(err)
    }

    /// Returns true if the condition holds.
    pub fn is_success(&self) -> bool {
        matches!(self, CheckOutcome::Success)
    }

    /// Splits a single error type into retryable and fatal failures.
    ///
    /// `classify` returns `Ok(expectation)` for errors that mean "not yet"
    /// and hands every other error back as `Err` so it is propagated as is.
    ///
    /// # Example
    ///
    /// ```
    /// use forge_eventually::{CheckOutcome, ExpectationNotMet};
    ///
    /// #[derive(Debug)]
    /// enum LookupError {
    ///     Missing(String),
    ///     Corrupt,
    /// }
    ///
    /// let classify = |err: LookupError| match err {
    ///     LookupError::Missing(key) => Ok(ExpectationNotMet::new(format!("{} not found", key))),
    ///     other => Err(other),
    /// };
    ///
    /// let outcome = CheckOutcome::from_result(Err::<(), _>(LookupError::Missing("a".into())), classify);
    /// assert!(matches!(outcome, CheckOutcome::NotYetMet(_)));
    /// ```
    pub fn from_result<T, F>(result: Result<T, E>, classify: F) -> Self
    where
        F: FnOnce(E) -> Result<ExpectationNotMet, E>,
    {
        match result {
            Ok(_) => CheckOutcome::Success,
            Err(err) => match classify(err) {
                Ok(expectation) => CheckOutcome::NotYetMet(expectation),
                Err(err) => CheckOutcome::Fatal(err),
            },
        }
    }
}

impl<E> From<Result<(), ExpectationNotMet>> for CheckOutcome<E> {
    fn from(result: Result<(), ExpectationNotMet>) -> Self {
        match result {
            Ok(()) => CheckOutcome::Success,
            Err(expectation) => CheckOutcome::NotYetMet(expectation),
        }
    }
}

/// Fails with `cause()` unless `condition` holds.
///
/// The cause is built lazily so passing checks never format a message.
pub fn ensure<F, S>(condition: bool, cause: F) -> Result<(), ExpectationNotMet>
where
    F: FnOnce() -> S,
    S: Into<String>,
{
    if condition {
        Ok(())
    } else {
        Err(ExpectationNotMet::new(cause()))
    }
}
