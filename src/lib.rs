#![warn(future_incompatible, unreachable_pub)]
#![deny(missing_debug_implementations)]
//#![warn(missing_docs)]

//! Debounce calls and values.
//!
//! A debouncer defers acting on a rapidly-changing input until it has been
//! stable for a quiet period. This crate provides:
//!
//! - [`debounce::Debouncer`], which wraps an action and coalesces bursts of
//!   calls into one invocation, on either the trailing or the leading edge.
//! - [`value::Debounced`], a value with a debounced shadow and change
//!   listeners, for input handling.
//! - [`stream::StreamExt::debounce`], the same idea for async streams.
//!
//! Timers are injected through the [`schedule::Schedule`] trait. Use
//! [`schedule::VirtualClock`] to drive time by hand in tests, or the
//! single-threaded [`runtime`] to run on the real clock.
//!
//! # Examples
//!
//! **Debounce on the real clock**
//!
//! ```rust
//! use debounced::debounce::Debouncer;
//! use debounced::runtime::Reactor;
//! use debounced::task::sleep;
//! use debounced::time::Duration;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[debounced::main]
//! async fn main() {
//!     let seen = Rc::new(RefCell::new(Vec::new()));
//!     let sink = seen.clone();
//!     let wait = Duration::from_millis(20);
//!     let search = Debouncer::new(Reactor::current(), wait, move |query: &'static str| {
//!         sink.borrow_mut().push(query)
//!     });
//!
//!     search.call("de");
//!     search.call("deb");
//!     sleep(Duration::from_millis(50)).await;
//!
//!     assert_eq!(*seen.borrow(), ["deb"]);
//! }
//! ```
//!
//! **Drive time by hand**
//!
//! ```rust
//! use debounced::debounce::{Config, Debouncer};
//! use debounced::schedule::VirtualClock;
//! use debounced::time::Duration;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let clock = VirtualClock::new();
//! let saves = Rc::new(Cell::new(0));
//! let counter = saves.clone();
//! let config = Config::new(Duration::from_millis(20)).immediate(true);
//! let save = Debouncer::with_config(clock.clone(), config, move |()| {
//!     counter.set(counter.get() + 1)
//! });
//!
//! save.call(()); // leading edge: runs now
//! save.call(()); // inside the quiet period: dropped
//! assert_eq!(saves.get(), 1);
//!
//! clock.advance(Duration::from_millis(20));
//! save.call(()); // a fresh burst
//! assert_eq!(saves.get(), 2);
//! ```
//!
//! # Design Decisions
//!
//! Everything here is single-threaded. Debouncers, clocks and the reactor
//! are built on `Rc` and `RefCell` and are not `Send`; only the runtime's
//! waker may be used from other threads. This matches the event-loop model
//! debouncing comes from, where calls and timer callbacks never overlap.
//!
//! Callbacks run from whatever drives time: [`runtime::block_on`] or the
//! methods of [`schedule::VirtualClock`]. A panic in a debounced action
//! unwinds out of that driver; nothing is caught along the way.

pub mod debounce;
pub mod future;
pub mod runtime;
pub mod schedule;
pub mod stream;
pub mod task;
pub mod time;
pub mod value;

pub use debounced_macro::attr_macro_main as main;
pub use debounced_macro::attr_macro_test as test;

pub mod prelude {
    pub use crate::schedule::Cancel as _;
    pub use crate::schedule::Schedule as _;
    pub use crate::stream::StreamExt as _;
}
