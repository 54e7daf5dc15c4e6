//! Call-count expectations.
//!
//! Mocking layers usually verify "this was called N times". [`Times`] states
//! that expectation independently of any mocking library and turns it into a
//! check the retry driver can poll.

use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::ExpectationNotMet;
use crate::outcome::CheckOutcome;

/// Expected number of invocations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Times {
    /// Exactly this many calls
    Exactly(usize),
    /// This many calls or more
    AtLeast(usize),
    /// This many calls or fewer
    AtMost(usize),
    /// Inclusive range of calls
    Between(usize, usize),
}

impl Times {
    /// No calls at all.
    pub fn never() -> Self {
        Times::Exactly(0)
    }

    /// Exactly one call.
    pub fn once() -> Self {
        Times::Exactly(1)
    }

    /// Exactly `n` calls.
    pub fn exactly(n: usize) -> Self {
        Times::Exactly(n)
    }

    /// `n` calls or more.
    pub fn at_least(n: usize) -> Self {
        Times::AtLeast(n)
    }

    /// One call or more.
    pub fn at_least_once() -> Self {
        Times::AtLeast(1)
    }

    /// `n` calls or fewer.
    pub fn at_most(n: usize) -> Self {
        Times::AtMost(n)
    }

    /// Inclusive range; the bounds may be given in either order.
    pub fn between(a: usize, b: usize) -> Self {
        Times::Between(a.min(b), a.max(b))
    }

    /// Returns true if `actual` calls satisfy the expectation.
    pub fn matches(&self, actual: usize) -> bool {
        match *self {
            Times::Exactly(n) => actual == n,
            Times::AtLeast(n) => actual >= n,
            Times::AtMost(n) => actual <= n,
            Times::Between(lo, hi) => (lo..=hi).contains(&actual),
        }
    }

    /// Verifies `actual` against the expectation.
    ///
    /// # Example
    ///
    /// ```
    /// use forge_eventually::Times;
    ///
    /// let err = Times::exactly(2).verify(0).unwrap_err();
    /// assert_eq!(err.cause(), "expected 2 calls, got 0");
    /// ```
    pub fn verify(&self, actual: usize) -> Result<(), ExpectationNotMet> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(ExpectationNotMet::new(format!(
                "expected {} calls, got {}",
                self, actual
            )))
        }
    }

    /// Builds a check that reads the current count from `count`.
    pub fn check_with<F>(self, mut count: F) -> impl FnMut() -> CheckOutcome<Infallible>
    where
        F: FnMut() -> usize,
    {
        move || CheckOutcome::from(self.verify(count()))
    }

    /// Builds a check over a shared call counter.
    pub fn check(self, counter: &AtomicUsize) -> impl FnMut() -> CheckOutcome<Infallible> + '_ {
        self.check_with(move || counter.load(Ordering::SeqCst))
    }
}

impl fmt::Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Times::Exactly(n) => write!(f, "{}", n),
            Times::AtLeast(n) => write!(f, "at least {}", n),
            Times::AtMost(n) => write!(f, "at most {}", n),
            Times::Between(lo, hi) => write!(f, "between {} and {}", lo, hi),
        }
    }
}
