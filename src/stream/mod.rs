//! Time-based operations on streams.

mod debounce;

pub use debounce::Debounce;

use futures_core::Stream;

use crate::task::sleep;
use crate::time::Duration;

/// Extend `Stream` with time-based operations.
pub trait StreamExt: Stream {
    /// Yield the last item of every burst, once the stream has been quiet
    /// for `window`.
    ///
    /// Every item restarts the window, so a stream that never pauses for
    /// `window` yields nothing until it ends. When the stream ends with an
    /// item still held back, that item is yielded after its window and the
    /// debounced stream ends right after.
    ///
    /// # Example
    ///
    /// ```
    /// use debounced::prelude::*;
    /// use debounced::time::Duration;
    /// use futures_lite::prelude::*;
    ///
    /// #[debounced::main]
    /// async fn main() {
    ///     let keystrokes = futures_lite::stream::iter(["d", "de", "deb"]);
    ///     let settled: Vec<_> = keystrokes
    ///         .debounce(Duration::from_millis(10))
    ///         .collect()
    ///         .await;
    ///     assert_eq!(settled, ["deb"]);
    /// }
    /// ```
    fn debounce(self, window: Duration) -> Debounce<Self, crate::task::Sleep>
    where
        Self: Sized,
    {
        Debounce::new(self, sleep(window))
    }
}

impl<S> StreamExt for S where S: Stream {}
