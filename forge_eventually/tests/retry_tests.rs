//! Integration tests for retrying checks against state changed by other tasks.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use forge_eventually::{
    ensure, retry_until_success, retry_until_success_async, CheckOutcome, RetryConfig,
    RetryError, RetryUntilSuccess, Times,
};
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, PartialEq, thiserror::Error)]
enum StoreError {
    #[error("store closed")]
    Closed,
}

#[tokio::test(start_paused = true)]
async fn test_waits_for_background_task() {
    let flag = Arc::new(AtomicBool::new(false));
    let setter = flag.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        setter.store(true, Ordering::SeqCst);
    });

    let start = Instant::now();
    let mut calls = 0;
    let result = retry_until_success(
        || -> CheckOutcome<Infallible> {
            calls += 1;
            ensure(flag.load(Ordering::SeqCst), || "flag not set").into()
        },
        Duration::from_millis(500),
    )
    .await;

    assert!(result.is_ok());
    // Polls at 0, 100, 200 and 300ms; the flag flips at 250ms.
    assert_eq!(calls, 4);
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_call_count_scenario_times_out() {
    let counter = AtomicUsize::new(0);
    let driver = RetryUntilSuccess::new(
        RetryConfig::from_millis(250).with_poll_interval(Duration::from_millis(100)),
    );

    let err = driver
        .run(Times::exactly(2).check(&counter))
        .await
        .unwrap_err();

    let failure = err.timeout().unwrap();
    assert_eq!(failure.timeout, Duration::from_millis(250));
    assert_eq!(failure.last_cause.cause(), "expected 2 calls, got 0");
    assert!((2..=3).contains(&failure.attempts));
    assert!(err.to_string().contains("expected 2 calls, got 0"));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_invocations_are_independent() {
    let counter = Arc::new(AtomicUsize::new(0));
    let worker = counter.clone();
    tokio::spawn(async move {
        for _ in 0..3 {
            tokio::time::sleep(Duration::from_millis(150)).await;
            worker.fetch_add(1, Ordering::SeqCst);
        }
    });

    let driver = RetryUntilSuccess::new(RetryConfig::from_secs(1));
    let (one, three, never) = tokio::join!(
        driver.run(Times::at_least_once().check(&counter)),
        driver.run(Times::exactly(3).check(&counter)),
        driver.run(Times::exactly(10).check(&counter)),
    );

    assert!(one.is_ok());
    assert!(three.is_ok());
    let failure = never.unwrap_err();
    assert!(failure.is_timeout());
    assert_eq!(
        failure.timeout().unwrap().last_cause.cause(),
        "expected 10 calls, got 3"
    );
}

#[tokio::test(start_paused = true)]
async fn test_fatal_error_stops_retrying() {
    let closed = Arc::new(AtomicBool::new(false));
    let closer = closed.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(120)).await;
        closer.store(true, Ordering::SeqCst);
    });

    let mut calls = 0;
    let err = retry_until_success(
        || {
            calls += 1;
            if closed.load(Ordering::SeqCst) {
                CheckOutcome::Fatal(StoreError::Closed)
            } else {
                CheckOutcome::not_yet_met("no rows yet")
            }
        },
        Duration::from_secs(5),
    )
    .await
    .unwrap_err();

    assert_eq!(err, RetryError::Fatal(StoreError::Closed));
    // 0ms and 100ms see an open store; 200ms sees it closed.
    assert_eq!(calls, 3);
}

#[tokio::test(start_paused = true)]
async fn test_async_check_over_shared_state() {
    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let writer = log.clone();
    tokio::spawn(async move {
        for entry in ["started", "indexed", "committed"] {
            tokio::time::sleep(Duration::from_millis(80)).await;
            writer.lock().await.push(entry.to_string());
        }
    });

    let result = retry_until_success_async(
        || {
            let log = log.clone();
            async move {
                let entries = log.lock().await;
                let committed = entries.last().map(String::as_str) == Some("committed");
                let cause = format!("log is {:?}", *entries);
                drop(entries);
                CheckOutcome::<Infallible>::from(ensure(committed, || cause))
            }
        },
        Duration::from_secs(1),
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(log.lock().await.len(), 3);
}

#[tokio::test]
async fn test_real_clock_overrun_is_bounded() {
    let start = std::time::Instant::now();
    let err = retry_until_success(
        || CheckOutcome::<Infallible>::not_yet_met("never"),
        Duration::from_millis(150),
    )
    .await
    .unwrap_err();

    let elapsed = start.elapsed();
    assert!(err.is_timeout());
    assert!(elapsed >= Duration::from_millis(150));
    // One polling interval of slack plus scheduler noise.
    assert!(
        elapsed < Duration::from_millis(150 + 100 + 200),
        "elapsed {:?}",
        elapsed
    );
}
