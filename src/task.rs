//! Types and Traits for working with asynchronous tasks.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::future::Timer;
use crate::runtime::{Reactor, Registration};
use crate::time::{Duration, Instant};

/// Sleeps for the specified amount of time.
///
/// The returned future can be moved forward with [`Timer::reset_timer`].
pub fn sleep(dur: Duration) -> Sleep {
    Sleep {
        deadline: Instant::now() + dur,
        dur,
        registration: None,
    }
}

/// Sleeps until the specified instant.
pub fn sleep_until(deadline: Instant) -> Sleep {
    Sleep {
        deadline,
        dur: deadline.duration_since(Instant::now()),
        registration: None,
    }
}

/// Sleeps for the specified amount of time.
///
/// This `struct` is created by [`sleep`] and [`sleep_until`]. It must be
/// polled inside [`block_on`](crate::runtime::block_on).
#[derive(Debug)]
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Sleep {
    deadline: Instant,
    dur: Duration,
    registration: Option<Registration>,
}

impl Sleep {
    /// The instant this future resolves at.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl Future for Sleep {
    type Output = Instant;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let now = Instant::now();
        if now >= this.deadline {
            this.registration = None;
            return Poll::Ready(now);
        }

        match &this.registration {
            Some(registration) => registration.update(this.deadline, cx.waker()),
            None => {
                let reactor = Reactor::current();
                this.registration = Some(reactor.register_waker(this.deadline, cx.waker()));
            }
        }
        Poll::Pending
    }
}

impl Timer for Sleep {
    fn reset_timer(self: Pin<&mut Self>) {
        let this = self.get_mut();
        this.deadline = Instant::now() + this.dur;
    }
}
