//! Async event loop support.
//!
//! The way to use this is to call [`block_on()`], which installs a
//! [`Reactor`] for the current thread. Code running inside it can reach the
//! reactor through [`Reactor::current()`] to register timers: either wakers,
//! used by [`sleep`](crate::task::sleep), or plain callbacks, used through the
//! [`Schedule`](crate::schedule::Schedule) implementation. The loop fires
//! every due timer between polls and parks the thread until the next deadline
//! otherwise.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod block_on;
mod reactor;

pub use block_on::block_on;
pub use reactor::{Reactor, TimerHandle};
pub(crate) use reactor::Registration;

use std::cell::RefCell;

thread_local! {
    pub(crate) static REACTOR: RefCell<Option<Reactor>> = const { RefCell::new(None) };
}
