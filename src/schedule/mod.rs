//! Deferred callbacks behind an injectable clock.
//!
//! [`Debouncer`](crate::debounce::Debouncer) never talks to a timer directly.
//! It receives a [`Schedule`] implementation instead, which lets the same
//! code run against the real monotonic clock ([`Reactor`]) or against a
//! manually advanced [`VirtualClock`] in tests.
//!
//! Implementations must uphold a few rules:
//!
//! 1. A callback never runs inside the `schedule` call that registered it,
//!    not even with a zero delay.
//! 2. Callbacks sharing a deadline run in the order they were scheduled.
//! 3. Canceling a handle whose callback already ran, or was already
//!    canceled, does nothing. In particular it never cancels another timer.
//! 4. Dropping a handle does not cancel its timer.
//!
//! [`Reactor`]: crate::runtime::Reactor

mod virtual_clock;

pub use virtual_clock::{VirtualClock, VirtualTimer};

use crate::time::Duration;

/// Run a callback once, after a delay.
pub trait Schedule {
    /// The handle returned for each scheduled callback.
    type Handle: Cancel;

    /// Run `callback` once `delay` has elapsed.
    fn schedule<F>(&self, delay: Duration, callback: F) -> Self::Handle
    where
        F: FnOnce() + 'static;
}

/// A handle that can withdraw a scheduled callback before it runs.
pub trait Cancel {
    /// Cancel the callback if it has not run yet.
    fn cancel(self);
}
