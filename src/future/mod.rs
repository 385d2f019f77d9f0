//! Futures that resolve at a deadline.

use std::{future::Future, pin::Pin};

/// A future which holds a deadline relative to now.
///
/// Operations such as [`debounce`](crate::stream::StreamExt::debounce), which
/// need to move their deadline forward every time an item is received from
/// the underlying stream, use this trait to ask the future to resolve later
/// instead.
pub trait Timer: Future {
    /// Move the point at which this future resolves to some point in the
    /// future. If the future has already resolved before, calling this method
    /// will allow it to resolve again.
    fn reset_timer(self: Pin<&mut Self>);
}
