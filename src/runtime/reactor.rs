use super::REACTOR;
use crate::schedule::{Cancel, Schedule};
use crate::time::{Duration, Instant};

use core::cell::RefCell;
use core::fmt;
use core::task::Waker;
use slab::Slab;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Identifies one timer. Slab slots are reused, so the `id` guards against a
/// stale key touching a newer timer in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerKey {
    index: usize,
    id: u64,
}

enum Action {
    Wake(Waker),
    Call(Box<dyn FnOnce()>),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Wake(waker) => f.debug_tuple("Wake").field(waker).finish(),
            Action::Call(_) => f.debug_tuple("Call").finish_non_exhaustive(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    id: u64,
    deadline: Instant,
    /// Whether `(deadline, id, index)` is currently in the queue.
    queued: bool,
    action: Action,
}

/// What to run after a due entry has been taken out of the reactor.
enum Fired {
    Wake(Waker),
    Call(Box<dyn FnOnce()>),
}

/// A waker registered by a [`Sleep`](crate::task::Sleep). Deregisters itself
/// when dropped.
#[derive(Debug)]
pub(crate) struct Registration {
    key: TimerKey,
    reactor: Reactor,
}

impl Registration {
    /// Move the deadline and refresh the waker to notify.
    pub(crate) fn update(&self, deadline: Instant, waker: &Waker) {
        self.reactor.update_waker(self.key, deadline, waker)
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.reactor.deregister(self.key)
    }
}

/// A callback scheduled through the reactor's [`Schedule`] implementation.
///
/// Dropping the handle leaves the callback scheduled; use [`Cancel::cancel`]
/// to remove it.
#[derive(Debug)]
#[must_use = "dropping a timer handle does not cancel the timer"]
pub struct TimerHandle {
    key: TimerKey,
    reactor: Reactor,
}

impl Cancel for TimerHandle {
    fn cancel(self) {
        self.reactor.deregister(self.key)
    }
}

/// Manage the timers of a [`block_on`](super::block_on) event loop.
#[derive(Debug, Clone)]
pub struct Reactor {
    inner: Rc<RefCell<InnerReactor>>,
}

/// The private, internal `Reactor` implementation - factored out so we can take
/// a lock of the whole.
#[derive(Debug)]
struct InnerReactor {
    entries: Slab<Entry>,
    /// Ordered by deadline, then by scheduling order.
    queue: BTreeSet<(Instant, u64, usize)>,
    next_id: u64,
}

impl InnerReactor {
    fn insert(&mut self, deadline: Instant, action: Action) -> TimerKey {
        let id = self.next_id;
        self.next_id += 1;
        let index = self.entries.insert(Entry {
            id,
            deadline,
            queued: true,
            action,
        });
        self.queue.insert((deadline, id, index));
        TimerKey { index, id }
    }

    fn remove(&mut self, key: TimerKey) -> Option<Entry> {
        let entry = self.entries.get(key.index).filter(|e| e.id == key.id)?;
        if entry.queued {
            self.queue.remove(&(entry.deadline, key.id, key.index));
        }
        Some(self.entries.remove(key.index))
    }

    /// Take the earliest entry that is due at `now` and was registered
    /// before `limit`.
    fn pop_due(&mut self, now: Instant, limit: u64) -> Option<Fired> {
        let slot = self
            .queue
            .iter()
            .take_while(|(deadline, _, _)| *deadline <= now)
            .find(|(_, id, _)| *id < limit)
            .copied()?;
        self.queue.remove(&slot);
        let (_, _, index) = slot;

        let entry = &mut self.entries[index];
        entry.queued = false;
        // Sleepers deregister themselves once they observe the deadline, so
        // their entry stays allocated until then.
        if let Action::Wake(waker) = &entry.action {
            return Some(Fired::Wake(waker.clone()));
        }
        match self.entries.remove(index).action {
            Action::Call(callback) => Some(Fired::Call(callback)),
            Action::Wake(_) => None,
        }
    }
}

impl Reactor {
    /// Return a `Reactor` for the currently running `debounced::runtime::block_on`.
    ///
    /// # Panic
    /// This will panic if called outside of `debounced::runtime::block_on`.
    pub fn current() -> Self {
        Self::try_current().expect("Reactor::current must be called within a debounced runtime")
    }

    /// Return the `Reactor` for the currently running
    /// `debounced::runtime::block_on`, or `None` outside of it.
    pub fn try_current() -> Option<Self> {
        REACTOR.with(|r| r.borrow().clone())
    }

    /// Create a new instance of `Reactor`
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(InnerReactor {
                entries: Slab::new(),
                queue: BTreeSet::new(),
                next_id: 0,
            })),
        }
    }

    /// The number of timers currently registered, including sleepers that
    /// already fired but have not been polled since.
    pub fn timer_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// The earliest queued deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        let reactor = self.inner.borrow();
        reactor.queue.first().map(|(deadline, _, _)| *deadline)
    }

    /// Block until new events are ready: fire every due timer, or park the
    /// thread until the next deadline or until `awake` reports that the
    /// current task was woken.
    ///
    /// Timers registered while firing (for example a callback that schedules
    /// another zero-delay callback) are left for the next turn, after the
    /// task has been polled again.
    pub(crate) fn block_until(&self, awake: impl Fn() -> bool) {
        let limit = self.inner.borrow().next_id;
        loop {
            if self.fire_due(limit) || awake() {
                return;
            }
            match self.next_deadline() {
                Some(deadline) => {
                    let timeout = deadline.duration_since(Instant::now());
                    tracing::trace!(?timeout, "parking until next deadline");
                    std::thread::park_timeout(timeout.into());
                }
                None => {
                    tracing::trace!("parking until woken");
                    std::thread::park();
                }
            }
        }
    }

    /// Fire due timers one at a time, so a callback can still cancel a later
    /// timer that is due in the same turn. Returns whether anything fired.
    fn fire_due(&self, limit: u64) -> bool {
        let mut fired = false;
        loop {
            let now = Instant::now();
            let next = self.inner.borrow_mut().pop_due(now, limit);
            match next {
                Some(Fired::Wake(waker)) => waker.wake(),
                Some(Fired::Call(callback)) => callback(),
                None => return fired,
            }
            fired = true;
        }
    }

    /// Register a waker to be woken at `deadline`.
    pub(crate) fn register_waker(&self, deadline: Instant, waker: &Waker) -> Registration {
        let key = self
            .inner
            .borrow_mut()
            .insert(deadline, Action::Wake(waker.clone()));
        tracing::trace!(?key, "register waker");
        Registration {
            key,
            reactor: self.clone(),
        }
    }

    fn update_waker(&self, key: TimerKey, deadline: Instant, waker: &Waker) {
        let mut reactor = self.inner.borrow_mut();
        let InnerReactor { entries, queue, .. } = &mut *reactor;
        let Some(entry) = entries.get_mut(key.index).filter(|e| e.id == key.id) else {
            return;
        };
        if let Action::Wake(current) = &mut entry.action {
            if !current.will_wake(waker) {
                *current = waker.clone();
            }
        }
        if entry.queued {
            queue.remove(&(entry.deadline, key.id, key.index));
        }
        entry.deadline = deadline;
        entry.queued = true;
        queue.insert((deadline, key.id, key.index));
    }

    fn deregister(&self, key: TimerKey) {
        // Drop the entry outside the borrow: a callback's captures may touch
        // the reactor when dropped.
        let removed = self.inner.borrow_mut().remove(key);
        if removed.is_some() {
            tracing::trace!(?key, "deregister timer");
        }
    }
}

impl Schedule for Reactor {
    type Handle = TimerHandle;

    fn schedule<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + 'static,
    {
        let deadline = Instant::now() + delay;
        let key = self
            .inner
            .borrow_mut()
            .insert(deadline, Action::Call(Box::new(callback)));
        tracing::trace!(?key, ?delay, "schedule callback");
        TimerHandle {
            key,
            reactor: self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn recorder() -> (Log, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |name: &'static str| -> Box<dyn FnOnce()> {
            let sink = sink.clone();
            Box::new(move || sink.borrow_mut().push(name))
        };
        (log, make)
    }

    #[test]
    fn callbacks_fire_in_deadline_then_schedule_order() {
        let reactor = Reactor::new();
        let (log, make) = recorder();
        let _c = reactor.schedule(Duration::from_millis(2), make("c"));
        let _a = reactor.schedule(Duration::ZERO, make("a"));
        let _b = reactor.schedule(Duration::ZERO, make("b"));

        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(reactor.fire_due(u64::MAX));
        assert_eq!(*log.borrow(), ["a", "b", "c"]);
        assert_eq!(reactor.timer_count(), 0);
    }

    #[test]
    fn cancel_removes_only_its_own_timer() {
        let reactor = Reactor::new();
        let (log, make) = recorder();
        let first = reactor.schedule(Duration::ZERO, make("first"));
        reactor.fire_due(u64::MAX);
        assert_eq!(*log.borrow(), ["first"]);

        // The slot is reused by the next timer; the stale handle must not
        // cancel it.
        let _second = reactor.schedule(Duration::ZERO, make("second"));
        first.cancel();
        assert_eq!(reactor.timer_count(), 1);
        reactor.fire_due(u64::MAX);
        assert_eq!(*log.borrow(), ["first", "second"]);
    }

    #[test]
    fn timers_scheduled_while_firing_wait_for_next_turn() {
        let reactor = Reactor::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (inner_reactor, sink) = (reactor.clone(), log.clone());
        let _outer = reactor.schedule(Duration::ZERO, move || {
            sink.borrow_mut().push("outer");
            let sink = sink.clone();
            let _inner =
                inner_reactor.schedule(Duration::ZERO, move || sink.borrow_mut().push("inner"));
        });

        let limit = reactor.inner.borrow().next_id;
        reactor.fire_due(limit);
        assert_eq!(*log.borrow(), ["outer"]);
        reactor.fire_due(u64::MAX);
        assert_eq!(*log.borrow(), ["outer", "inner"]);
    }
}
