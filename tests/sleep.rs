use std::error::Error;

use debounced::task::{sleep, sleep_until};
use debounced::time::{Duration, Instant};
use futures_concurrency::prelude::*;

#[debounced::test]
async fn just_sleep() -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    sleep(Duration::from_millis(20)).await;
    assert!(start.elapsed() >= Duration::from_millis(20));
    Ok(())
}

#[debounced::test]
async fn sleep_until_a_past_instant_is_ready() {
    let past = Instant::now();
    let woke = sleep_until(past).await;
    assert!(woke >= past);
}

#[debounced::test]
async fn durations_and_instants_are_awaitable() {
    let start = Instant::now();
    Duration::from_millis(5).await;
    (start + Duration::from_millis(15)).await;
    assert!(start.elapsed() >= Duration::from_millis(15));
}

#[debounced::test]
async fn concurrent_sleeps_overlap() {
    let start = Instant::now();
    let (a, b) = (
        sleep(Duration::from_millis(30)),
        sleep(Duration::from_millis(30)),
    )
        .join()
        .await;
    let elapsed = start.elapsed();
    assert!(a >= start && b >= start);
    assert!(elapsed >= Duration::from_millis(30));
    assert!(
        elapsed < Duration::from_millis(55),
        "sleeps ran back to back: {elapsed:?}"
    );
}
