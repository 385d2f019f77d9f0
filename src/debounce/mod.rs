//! Coalesce bursts of calls into a single invocation.
//!
//! A [`Debouncer`] wraps an action and defers it until a quiet period of
//! `wait` has passed since the most recent [`call`](Debouncer::call). In
//! leading mode ([`Config::immediate`]) the action instead runs right away on
//! the first call of a burst, and the rest of the burst is dropped.
//!
//! Timers come from a [`Schedule`] implementation, so the same debouncer can
//! run on the [`Reactor`](crate::runtime::Reactor) or on a
//! [`VirtualClock`](crate::schedule::VirtualClock).
//!
//! # Examples
//!
//! ```
//! use debounced::debounce::Debouncer;
//! use debounced::schedule::VirtualClock;
//! use debounced::time::Duration;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let clock = VirtualClock::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! let wait = Duration::from_millis(20);
//! let search = Debouncer::new(clock.clone(), wait, move |query: &'static str| {
//!     sink.borrow_mut().push(query.to_owned())
//! });
//!
//! search.call("d");
//! clock.advance(Duration::from_millis(5));
//! search.call("de");
//! clock.advance(Duration::from_millis(5));
//! search.call("deb");
//! clock.advance(Duration::from_millis(20));
//!
//! assert_eq!(*seen.borrow(), ["deb"]);
//! ```

mod config;

pub use config::{Config, ConfigError};

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::schedule::{Cancel, Schedule};
use crate::time::Duration;

/// Debounce an action taking arguments of type `A`.
///
/// Several arguments are passed as a tuple. Anything the action needs as a
/// receiver is either captured by the closure or passed as part of `A`; the
/// invocation always sees the values handed to the call that triggered it.
///
/// Clones share one debounce state. Dropping the last clone cancels the
/// pending timer, so an action never runs after its debouncer is gone.
pub struct Debouncer<A, S: Schedule> {
    shared: Rc<Shared<A, S>>,
}

struct Shared<A, S: Schedule> {
    scheduler: S,
    wait: Duration,
    immediate: bool,
    action: RefCell<Box<dyn FnMut(A)>>,
    /// At most one outstanding timer.
    pending: RefCell<Option<S::Handle>>,
}

impl<A: 'static, S: Schedule + 'static> Debouncer<A, S> {
    /// Debounce `action` on the trailing edge: it runs once `wait` has
    /// elapsed without further calls, with the arguments of the last call.
    pub fn new<F>(scheduler: S, wait: Duration, action: F) -> Self
    where
        F: FnMut(A) + 'static,
    {
        Self::with_config(scheduler, Config::new(wait), action)
    }

    /// Debounce `action` as described by `config`.
    pub fn with_config<F>(scheduler: S, config: Config, action: F) -> Self
    where
        F: FnMut(A) + 'static,
    {
        Self {
            shared: Rc::new(Shared {
                scheduler,
                wait: config.wait,
                immediate: config.immediate,
                action: RefCell::new(Box::new(action)),
                pending: RefCell::new(None),
            }),
        }
    }

    /// Record a call with `args`, restarting the quiet period.
    ///
    /// In trailing mode this only (re)schedules the action. In leading mode
    /// the action runs synchronously with `args` if no quiet period is
    /// currently running; the timer started afterwards only marks the end of
    /// the burst and never invokes the action.
    ///
    /// The timer is installed before the leading-edge invocation, so an
    /// action that calls back into the same debouncer is debounced as well
    /// instead of recursing.
    pub fn call(&self, args: A) {
        let shared = &self.shared;
        let call_now = shared.immediate && !self.is_pending();

        let previous = shared.pending.borrow_mut().take();
        if let Some(previous) = previous {
            previous.cancel();
        }

        let (now, later) = match (shared.immediate, call_now) {
            (false, _) => (None, Some(args)),
            (true, true) => (Some(args), None),
            (true, false) => (None, None),
        };

        let weak = Rc::downgrade(shared);
        let handle = shared
            .scheduler
            .schedule(shared.wait, move || Shared::elapsed(&weak, later));
        *shared.pending.borrow_mut() = Some(handle);
        tracing::trace!(wait = ?shared.wait, immediate = shared.immediate, call_now, "debounce call");

        if let Some(args) = now {
            shared.invoke(args);
        }
    }

    /// Whether a quiet period is currently running.
    pub fn is_pending(&self) -> bool {
        self.shared.pending.borrow().is_some()
    }

    /// The quiet period.
    pub fn wait(&self) -> Duration {
        self.shared.wait
    }

    /// Whether the action runs on the leading edge of a burst.
    pub fn is_immediate(&self) -> bool {
        self.shared.immediate
    }
}

impl<A, S: Schedule> Shared<A, S> {
    /// Timer callback: the quiet period is over.
    fn elapsed(weak: &Weak<Self>, args: Option<A>) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        // The handle belongs to this very timer, so there is nothing left
        // to cancel.
        drop(shared.pending.borrow_mut().take());
        match args {
            Some(args) => {
                tracing::debug!(wait = ?shared.wait, "debounced action fired");
                shared.invoke(args);
            }
            None => tracing::trace!("leading-edge quiet period over"),
        }
    }

    fn invoke(&self, args: A) {
        let mut action = self.action.borrow_mut();
        (*action)(args);
    }
}

impl<A, S: Schedule> Drop for Shared<A, S> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            pending.cancel();
        }
    }
}

impl<A, S: Schedule> Clone for Debouncer<A, S> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<A, S: Schedule> fmt::Debug for Debouncer<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("wait", &self.shared.wait)
            .field("immediate", &self.shared.immediate)
            .field("pending", &self.shared.pending.borrow().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::VirtualClock;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    /// A debouncer whose action records `(virtual time, argument)`.
    fn recording(
        clock: &VirtualClock,
        config: Config,
    ) -> (Debouncer<&'static str, VirtualClock>, Rc<RefCell<Vec<(u128, &'static str)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (sink, time) = (log.clone(), clock.clone());
        let debouncer =
            Debouncer::with_config(clock.clone(), config, move |arg: &'static str| {
                sink.borrow_mut().push((time.now().as_millis(), arg))
            });
        (debouncer, log)
    }

    #[test_log::test]
    fn trailing_fires_once_with_last_arguments() {
        let clock = VirtualClock::new();
        let (debounce, log) = recording(&clock, Config::new(ms(20)));

        debounce.call("a");
        clock.advance(ms(5));
        debounce.call("b");

        clock.advance(ms(19));
        assert!(log.borrow().is_empty(), "nothing may fire before t=25");

        clock.advance(ms(1));
        assert_eq!(*log.borrow(), [(25, "b")]);

        clock.advance(ms(100));
        assert_eq!(log.borrow().len(), 1);
        assert!(!debounce.is_pending());
    }

    #[test]
    fn supersession_delivers_only_the_final_call() {
        let clock = VirtualClock::new();
        let (debounce, log) = recording(&clock, Config::new(ms(10)));

        for arg in ["h", "he", "hel", "hell", "hello"] {
            debounce.call(arg);
            clock.advance(ms(9));
        }
        assert!(log.borrow().is_empty());
        assert_eq!(clock.pending(), 1);

        clock.run_until_idle();
        assert_eq!(*log.borrow(), [(46, "hello")]);
    }

    #[test]
    fn leading_fires_synchronously_once_per_burst() {
        let clock = VirtualClock::new();
        let (debounce, log) = recording(&clock, Config::new(ms(20)).immediate(true));
        assert!(debounce.is_immediate());

        debounce.call("a");
        assert_eq!(*log.borrow(), [(0, "a")]);

        clock.advance(ms(10));
        debounce.call("b");
        clock.advance(ms(10));
        debounce.call("c");
        assert_eq!(log.borrow().len(), 1, "calls inside the burst are dropped");

        // The trailing timer only ends the burst.
        clock.advance(ms(20));
        assert_eq!(log.borrow().len(), 1);
        assert!(!debounce.is_pending());

        debounce.call("d");
        assert_eq!(*log.borrow(), [(0, "a"), (40, "d")]);
    }

    #[test]
    fn leading_call_still_schedules_the_reset_timer() {
        let clock = VirtualClock::new();
        let (debounce, _log) = recording(&clock, Config::new(ms(20)).immediate(true));

        debounce.call("a");
        assert!(debounce.is_pending());
        assert_eq!(clock.next_deadline(), Some(ms(20)));
    }

    #[test]
    fn zero_wait_is_deferred() {
        let clock = VirtualClock::new();
        let (debounce, log) = recording(&clock, Config::new(Duration::ZERO));

        debounce.call("a");
        assert!(log.borrow().is_empty());

        clock.advance(Duration::ZERO);
        assert_eq!(*log.borrow(), [(0, "a")]);
    }

    #[test]
    fn quiet_period_starts_a_fresh_cycle() {
        let clock = VirtualClock::new();
        let (debounce, log) = recording(&clock, Config::new(ms(20)));

        debounce.call("first");
        clock.advance(ms(50));
        debounce.call("second");
        clock.advance(ms(20));

        assert_eq!(*log.borrow(), [(20, "first"), (70, "second")]);
    }

    #[test]
    fn dropping_the_last_clone_cancels() {
        let clock = VirtualClock::new();
        let (debounce, log) = recording(&clock, Config::new(ms(20)));
        let clone = debounce.clone();

        clone.call("a");
        drop(debounce);
        assert_eq!(clock.pending(), 1, "a clone is still alive");

        drop(clone);
        assert_eq!(clock.pending(), 0);
        clock.run_until_idle();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn reentrant_call_is_debounced() {
        let clock = VirtualClock::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let slot: Rc<RefCell<Option<Debouncer<u32, VirtualClock>>>> = Rc::default();

        let (sink, me) = (log.clone(), Rc::downgrade(&slot));
        let debounce = Debouncer::with_config(
            clock.clone(),
            Config::new(ms(10)).immediate(true),
            move |n: u32| {
                sink.borrow_mut().push(n);
                if n < 3 {
                    if let Some(me) = me.upgrade() {
                        if let Some(debounce) = me.borrow().as_ref() {
                            debounce.call(n + 1);
                        }
                    }
                }
            },
        );
        *slot.borrow_mut() = Some(debounce.clone());

        debounce.call(1);
        assert_eq!(*log.borrow(), [1]);
        clock.run_until_idle();
        assert_eq!(*log.borrow(), [1]);
        slot.borrow_mut().take();
    }

    #[test]
    #[should_panic(expected = "boom")]
    fn action_panics_propagate_to_the_timer_driver() {
        let clock = VirtualClock::new();
        let debounce = Debouncer::new(clock.clone(), ms(1), |_: ()| panic!("boom"));
        debounce.call(());
        clock.advance(ms(1));
    }
}
