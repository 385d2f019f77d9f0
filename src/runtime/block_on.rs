use super::{Reactor, REACTOR};

use core::future::Future;
use core::pin::pin;
use core::task::Waker;
use core::task::{Context, Poll};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::Wake;
use std::thread::{self, Thread};

/// Start the event loop
///
/// Polls `fut` on the current thread until it completes. Between polls every
/// due timer fires; otherwise the thread parks until the next deadline or
/// until the future is woken, from any thread. Timers still pending when the
/// future completes are dropped without firing.
///
/// # Panics
///
/// Panics when called inside another `block_on` on the same thread.
pub fn block_on<Fut>(fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    if REACTOR.with(|r| r.borrow().is_some()) {
        panic!("cannot debounced::runtime::block_on inside an existing block_on!")
    }

    // Construct the reactor and store a copy as a singleton to be used
    // elsewhere. The guard clears it again, even when unwinding.
    let reactor = Reactor::new();
    REACTOR.replace(Some(reactor.clone()));
    let _guard = ClearReactor;

    // Pin the future so it can be polled
    let mut fut = pin!(fut);

    // Create a new context to be passed to the future.
    let waker_impl = Arc::new(ReactorWaker::new());
    let waker = Waker::from(Arc::clone(&waker_impl));
    let mut cx = Context::from_waker(&waker);

    // Either the future completes and we return, or some timer is pending
    // and we wait.
    loop {
        waker_impl.set_awake(false);
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(res) => break res,
            Poll::Pending => reactor.block_until(|| waker_impl.awake()),
        }
    }
}

struct ClearReactor;

impl Drop for ClearReactor {
    fn drop(&mut self) {
        REACTOR.replace(None);
    }
}

struct ReactorWaker {
    awake: AtomicBool,
    thread: Thread,
}

impl ReactorWaker {
    fn new() -> Self {
        Self {
            awake: AtomicBool::new(false),
            thread: thread::current(),
        }
    }

    #[inline]
    fn set_awake(&self, awake: bool) {
        self.awake.store(awake, Ordering::Release);
    }

    #[inline]
    fn awake(&self) -> bool {
        self.awake.load(Ordering::Acquire)
    }
}

impl Wake for ReactorWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref()
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.set_awake(true);
        self.thread.unpark();
    }
}
