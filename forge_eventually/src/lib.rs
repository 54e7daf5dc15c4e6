//! ForgeKit eventually - Verification that waits for the system to catch up.
//!
//! Tests that trigger background work often assert on state before that work
//! has finished. This crate retries such assertions on a fixed polling
//! interval until they pass or a timeout expires:
//!
//! - [`CheckOutcome`]: what a single attempt reports (success, not yet, fatal)
//! - [`RetryUntilSuccess`]: the polling driver
//! - [`RetryConfig`]: retry budget and polling interval
//! - [`TimeoutFailure`]: the single error reported when the budget runs out
//! - [`Times`]: call-count expectations that produce checks
//!
//! Only [`CheckOutcome::NotYetMet`] is retried. A [`CheckOutcome::Fatal`]
//! error stops the loop at once and reaches the caller unchanged.
//!
//! # Example
//!
//! ```
//! use forge_eventually::{RetryConfig, RetryUntilSuccess, Times};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let calls = Arc::new(AtomicUsize::new(0));
//!
//! let handler = calls.clone();
//! tokio::spawn(async move {
//!     for _ in 0..2 {
//!         tokio::time::sleep(Duration::from_millis(20)).await;
//!         handler.fetch_add(1, Ordering::SeqCst);
//!     }
//! });
//!
//! let driver = RetryUntilSuccess::new(RetryConfig::from_secs(2));
//! driver.run(Times::exactly(2).check(&calls)).await.unwrap();
//! # }
//! ```

pub mod config;
pub mod error;
pub mod outcome;
pub mod retry;
pub mod times;

pub use config::{RetryConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, MIN_POLL_INTERVAL};
pub use error::{ExpectationNotMet, RetryError, TimeoutFailure};
pub use outcome::{ensure, CheckOutcome};
pub use retry::{retry_until_success, retry_until_success_async, RetryUntilSuccess};
pub use times::Times;

/// Version of the eventually crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Logs the crate banner.
pub fn init() {
    tracing::info!("ForgeKit Eventually v{}", VERSION);
}
