//! A value whose consumers only see it once it settles.
//!
//! [`Debounced`] keeps two copies of a value: the local one, updated on every
//! [`set_value`](Debounced::set_value), and the debounced one, updated once
//! the value has been stable for the configured wait. Each debounced update
//! is also emitted to the listeners registered with
//! [`on_input`](Debounced::on_input).
//!
//! This is the state half of an input widget. Rendering is left to the
//! caller, which reads [`value`](Debounced::value) and
//! [`debounced`](Debounced::debounced) and re-renders from a listener.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::debounce::{Config, Debouncer};
use crate::schedule::Schedule;
use crate::time::Duration;

type Listener<T> = Box<dyn FnMut(&T)>;

/// A value plus its debounced shadow.
///
/// # Examples
///
/// ```
/// use debounced::schedule::VirtualClock;
/// use debounced::time::Duration;
/// use debounced::value::Debounced;
///
/// let clock = VirtualClock::new();
/// let query = Debounced::new(String::new(), clock.clone(), Duration::from_millis(20));
///
/// query.set_value("rust".to_owned());
/// assert_eq!(*query.value(), "rust");
/// assert_eq!(*query.debounced(), "");
///
/// clock.advance(Duration::from_millis(20));
/// assert_eq!(*query.debounced(), "rust");
/// ```
pub struct Debounced<T, S: Schedule> {
    state: Rc<State<T>>,
    debouncer: Debouncer<T, S>,
}

struct State<T> {
    value: RefCell<T>,
    debounced: RefCell<T>,
    listeners: RefCell<Vec<Listener<T>>>,
}

impl<T: Clone> State<T> {
    /// Store a settled value and emit it.
    fn settle(&self, next: T) {
        *self.debounced.borrow_mut() = next.clone();

        // Listeners may register more listeners while we emit, so they are
        // taken out for the duration. The guard puts them back even if one
        // of them panics.
        let mut emitting = Emitting {
            slot: &self.listeners,
            taken: self.listeners.take(),
        };
        for listener in emitting.taken.iter_mut() {
            listener(&next);
        }
    }
}

/// Listeners taken out of a [`State`] while they run.
struct Emitting<'a, T> {
    slot: &'a RefCell<Vec<Listener<T>>>,
    taken: Vec<Listener<T>>,
}

impl<T> Drop for Emitting<'_, T> {
    fn drop(&mut self) {
        let mut current = self.slot.borrow_mut();
        let mut listeners = std::mem::take(&mut self.taken);
        listeners.append(&mut current);
        *current = listeners;
    }
}

impl<T, S> Debounced<T, S>
where
    T: Clone + 'static,
    S: Schedule + 'static,
{
    /// Start with `initial` as both the value and the debounced value, and
    /// debounce changes by `wait` on the trailing edge.
    pub fn new(initial: T, scheduler: S, wait: Duration) -> Self {
        Self::with_config(initial, scheduler, Config::new(wait))
    }

    /// Like [`Debounced::new`], with the debounce behavior taken from
    /// `config`.
    pub fn with_config(initial: T, scheduler: S, config: Config) -> Self {
        let state = Rc::new(State {
            value: RefCell::new(initial.clone()),
            debounced: RefCell::new(initial),
            listeners: RefCell::new(Vec::new()),
        });

        let weak: Weak<State<T>> = Rc::downgrade(&state);
        let debouncer = Debouncer::with_config(scheduler, config, move |next: T| {
            if let Some(state) = weak.upgrade() {
                state.settle(next);
            }
        });

        Self { state, debouncer }
    }

    /// The latest value, updated synchronously.
    ///
    /// The returned borrow must be released before calling
    /// [`set_value`](Debounced::set_value).
    pub fn value(&self) -> Ref<'_, T> {
        self.state.value.borrow()
    }

    /// The settled value, updated once the value has been quiet for the
    /// configured wait.
    ///
    /// The returned borrow must be released before timers run.
    pub fn debounced(&self) -> Ref<'_, T> {
        self.state.debounced.borrow()
    }

    /// Replace the value and feed it to the debouncer.
    pub fn set_value(&self, next: T) {
        *self.state.value.borrow_mut() = next.clone();
        self.debouncer.call(next);
    }

    /// A cloneable setter, for handing to code that should not own the
    /// whole `Debounced`.
    pub fn setter(&self) -> Setter<T, S> {
        Setter {
            state: Rc::downgrade(&self.state),
            debouncer: self.debouncer.clone(),
        }
    }

    /// Call `listener` with every debounced update, after
    /// [`debounced`](Debounced::debounced) has been updated. Listeners run in
    /// registration order.
    pub fn on_input<F>(&self, listener: F)
    where
        F: FnMut(&T) + 'static,
    {
        self.state.listeners.borrow_mut().push(Box::new(listener));
    }
}

impl<T: fmt::Debug, S: Schedule> fmt::Debug for Debounced<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("value", &self.state.value)
            .field("debounced", &self.state.debounced)
            .field("listeners", &self.state.listeners.borrow().len())
            .field("debouncer", &self.debouncer)
            .finish()
    }
}

/// Sets the value of a [`Debounced`]; see [`Debounced::setter`].
///
/// A setter keeps the pending debounce alive but not the value itself:
/// once the `Debounced` is dropped, setting does nothing.
pub struct Setter<T, S: Schedule> {
    state: Weak<State<T>>,
    debouncer: Debouncer<T, S>,
}

impl<T, S> Setter<T, S>
where
    T: Clone + 'static,
    S: Schedule + 'static,
{
    /// Same as [`Debounced::set_value`].
    pub fn set(&self, next: T) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        *state.value.borrow_mut() = next.clone();
        self.debouncer.call(next);
    }
}

impl<T, S: Schedule> Clone for Setter<T, S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            debouncer: self.debouncer.clone(),
        }
    }
}

impl<T, S: Schedule> fmt::Debug for Setter<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::VirtualClock;

    const TIMEOUT: Duration = Duration::from_nanos(20_000_000);

    fn events(value: &Debounced<&'static str, VirtualClock>) -> Rc<RefCell<Vec<&'static str>>> {
        let emitted = Rc::new(RefCell::new(Vec::new()));
        let sink = emitted.clone();
        value.on_input(move |v| sink.borrow_mut().push(*v));
        emitted
    }

    #[test]
    fn initial_value_is_both_value_and_debounced() {
        let clock = VirtualClock::new();
        let value = Debounced::new("One", clock, TIMEOUT);
        assert_eq!(*value.value(), "One");
        assert_eq!(*value.debounced(), "One");
    }

    #[test]
    fn debounces_changes() {
        let clock = VirtualClock::new();
        let value = Debounced::new("One", clock.clone(), TIMEOUT);

        value.set_value("Two");
        assert_eq!(*value.value(), "Two");
        assert_eq!(*value.debounced(), "One");

        clock.advance(TIMEOUT);
        assert_eq!(*value.debounced(), "Two");
    }

    #[test]
    fn zero_timeout_settles_on_the_next_turn() {
        let clock = VirtualClock::new();
        let value = Debounced::new("", clock.clone(), Duration::ZERO);
        value.set_value("One");
        assert_eq!(*value.debounced(), "");
        clock.advance(Duration::ZERO);
        assert_eq!(*value.debounced(), "One");
    }

    #[test_log::test]
    fn emits_input_events_after_the_wait() {
        let clock = VirtualClock::new();
        let value = Debounced::new("", clock.clone(), TIMEOUT);
        let emitted = events(&value);

        value.set_value("One");
        assert!(emitted.borrow().is_empty());
        clock.advance(TIMEOUT);
        assert_eq!(*emitted.borrow(), ["One"]);

        value.set_value("Tw");
        clock.advance(Duration::from_millis(5));
        value.set_value("Two");
        clock.advance(TIMEOUT);
        assert_eq!(*emitted.borrow(), ["One", "Two"]);
    }

    #[test]
    fn setter_stores_immediately_and_debounces() {
        let clock = VirtualClock::new();
        let value = Debounced::new("", clock.clone(), TIMEOUT);
        let set = value.setter();

        set.clone().set("One");
        assert_eq!(*value.value(), "One");
        assert_eq!(*value.debounced(), "");

        clock.advance(TIMEOUT);
        assert_eq!(*value.debounced(), "One");

        drop(value);
        set.set("Two");
        clock.run_until_idle();
    }

    #[test]
    fn leading_config_settles_synchronously() {
        let clock = VirtualClock::new();
        let config = Config::new(TIMEOUT).immediate(true);
        let value = Debounced::with_config("", clock.clone(), config);
        let emitted = events(&value);

        value.set_value("One");
        value.set_value("Two");
        assert_eq!(*value.debounced(), "One");
        assert_eq!(*emitted.borrow(), ["One"]);
        assert_eq!(*value.value(), "Two");
    }

    #[test]
    fn listeners_may_register_listeners_and_set_values() {
        let clock = VirtualClock::new();
        let value = Rc::new(Debounced::new(0u32, clock.clone(), TIMEOUT));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let (me, sink) = (Rc::downgrade(&value), seen.clone());
        value.on_input(move |v| {
            sink.borrow_mut().push(*v);
            if let Some(me) = me.upgrade() {
                if *v < 2 {
                    me.set_value(*v + 1);
                }
                let late = sink.clone();
                me.on_input(move |v| late.borrow_mut().push(100 + *v));
            }
        });

        value.set_value(1);
        clock.run_until_idle();
        // 1 reaches only the first listener; 2 reaches it and the listener
        // it registered on the way.
        assert_eq!(*seen.borrow(), [1, 2, 102]);
    }

    #[test]
    fn listeners_survive_a_panicking_listener() {
        let clock = VirtualClock::new();
        let value = Debounced::new(0u32, clock.clone(), TIMEOUT);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        value.on_input(move |v| sink.borrow_mut().push(*v));
        value.on_input(|v| assert_ne!(*v, 1, "listener rejects 1"));

        value.set_value(1);
        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            clock.advance(TIMEOUT);
        }));
        assert!(panicked.is_err());
        assert_eq!(*value.debounced(), 1);

        value.set_value(2);
        clock.advance(TIMEOUT);
        assert_eq!(*value.debounced(), 2);
        assert_eq!(*seen.borrow(), [1, 2]);
    }
}
