//! Time primitives for the timer runtime.

mod duration;
mod instant;
pub use duration::Duration;
pub use instant::Instant;

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::{ready, Stream};

use crate::future::Timer;
use crate::task::{sleep, Sleep};

/// A stream yielding an [`Instant`] every `duration`.
///
/// The first tick happens one full `duration` after the stream is created.
/// Ticks are measured from the moment the previous one was observed, so a
/// consumer that falls behind delays later ticks rather than bursting.
///
/// # Examples
///
/// ```
/// use debounced::time::{interval, Duration};
/// use futures_lite::prelude::*;
///
/// debounced::runtime::block_on(async {
///     let ticks: Vec<_> = interval(Duration::from_millis(1)).take(3).collect().await;
///     assert_eq!(ticks.len(), 3);
///     assert!(ticks[0] < ticks[2]);
/// });
/// ```
pub fn interval(duration: Duration) -> Interval {
    Interval {
        timer: sleep(duration),
    }
}

/// A stream representing notifications at fixed interval.
///
/// See the [`interval`] function for more.
#[derive(Debug)]
#[must_use = "streams do nothing unless polled or .awaited"]
pub struct Interval {
    timer: Sleep,
}

impl Stream for Interval {
    type Item = Instant;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let instant = ready!(Pin::new(&mut self.timer).poll(cx));
        Pin::new(&mut self.timer).reset_timer();
        Poll::Ready(Some(instant))
    }
}
