use super::{Cancel, Schedule};
use crate::time::Duration;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Timers keyed by deadline, then by scheduling order.
type Key = (Duration, u64);

/// A manually driven clock implementing [`Schedule`].
///
/// Time only moves when [`advance`](VirtualClock::advance),
/// [`advance_to`](VirtualClock::advance_to) or
/// [`run_until_idle`](VirtualClock::run_until_idle) is called. Each due
/// callback runs with [`now`](VirtualClock::now) set to its own deadline, so
/// callbacks observe the same timeline a real clock would give them.
///
/// Clones share the same timeline.
///
/// # Examples
///
/// ```
/// use debounced::schedule::{Schedule, VirtualClock};
/// use debounced::time::Duration;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let clock = VirtualClock::new();
/// let fired = Rc::new(Cell::new(false));
/// let flag = fired.clone();
/// let _timer = clock.schedule(Duration::from_millis(20), move || flag.set(true));
///
/// clock.advance(Duration::from_millis(19));
/// assert!(!fired.get());
/// clock.advance(Duration::from_millis(1));
/// assert!(fired.get());
/// ```
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    inner: Rc<RefCell<ClockState>>,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<Key, Box<dyn FnOnce()>>,
}

impl fmt::Debug for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockState")
            .field("now", &self.now)
            .field("next_id", &self.next_id)
            .field("timers", &self.timers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Handle to a callback scheduled on a [`VirtualClock`].
#[derive(Debug)]
#[must_use = "dropping a timer handle does not cancel the timer"]
pub struct VirtualTimer {
    key: Key,
    clock: Weak<RefCell<ClockState>>,
}

impl VirtualTimer {
    /// The virtual instant this timer fires at.
    pub fn deadline(&self) -> Duration {
        self.key.0
    }
}

impl Cancel for VirtualTimer {
    fn cancel(self) {
        let Some(clock) = self.clock.upgrade() else {
            return;
        };
        let removed = clock.borrow_mut().timers.remove(&self.key);
        if removed.is_some() {
            tracing::trace!(deadline = ?self.key.0, id = self.key.1, "virtual timer canceled");
        }
    }
}

impl VirtualClock {
    /// Create a clock reading zero with no timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on this clock since it was created.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// The number of callbacks waiting to run.
    pub fn pending(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// The deadline of the next callback, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner.borrow().timers.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Move time forward by `by`, running every callback that falls due.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        self.advance_to(target);
    }

    /// Move time forward to `target`, running every callback due at or
    /// before it, in deadline order. Callbacks scheduled while advancing run
    /// too if their deadline falls inside the window.
    ///
    /// A `target` in the past leaves the clock where it is.
    pub fn advance_to(&self, target: Duration) {
        while self.fire_next(Some(target)) {}
        let mut state = self.inner.borrow_mut();
        if state.now < target {
            state.now = target;
        }
    }

    /// Run callbacks until none are left, moving time to each deadline in
    /// turn. Returns how many callbacks ran.
    ///
    /// This never returns if callbacks keep scheduling new ones.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while self.fire_next(None) {
            fired += 1;
        }
        fired
    }

    /// Run the earliest callback due at or before `limit`. The callback runs
    /// outside the state borrow, so it may schedule or cancel freely.
    fn fire_next(&self, limit: Option<Duration>) -> bool {
        let next = {
            let mut state = self.inner.borrow_mut();
            let next = state
                .timers
                .first_entry()
                .filter(|entry| limit.map_or(true, |limit| entry.key().0 <= limit))
                .map(|entry| entry.remove_entry());
            if let Some(((deadline, _), _)) = &next {
                if state.now < *deadline {
                    state.now = *deadline;
                }
            }
            next
        };

        match next {
            Some(((deadline, id), callback)) => {
                tracing::trace!(?deadline, id, "virtual timer fired");
                callback();
                true
            }
            None => false,
        }
    }
}

impl Schedule for VirtualClock {
    type Handle = VirtualTimer;

    fn schedule<F>(&self, delay: Duration, callback: F) -> VirtualTimer
    where
        F: FnOnce() + 'static,
    {
        let mut state = self.inner.borrow_mut();
        let key = (state.now + delay, state.next_id);
        state.next_id += 1;
        state.timers.insert(key, Box::new(callback));
        tracing::trace!(deadline = ?key.0, id = key.1, "virtual timer scheduled");
        VirtualTimer {
            key,
            clock: Rc::downgrade(&self.inner),
        }
    }
}
