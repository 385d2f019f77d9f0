use super::Instant;
use crate::task::Sleep;
use std::future::IntoFuture;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// A Duration type to represent a span of time, typically used for debounce
/// windows and timer delays.
///
/// This type wraps a count of nanoseconds so we can implement traits on it
/// without coherence issues, and so conversions from untrusted inputs can
/// saturate instead of panicking.
#[derive(Debug, Default, PartialEq, PartialOrd, Ord, Eq, Hash, Clone, Copy)]
pub struct Duration(pub(crate) u64);

impl Duration {
    /// A duration of zero time.
    pub const ZERO: Duration = Duration(0);

    /// The largest representable duration, roughly 584 years.
    pub const MAX: Duration = Duration(u64::MAX);

    /// Creates a new `Duration` from the specified number of whole seconds and
    /// additional nanoseconds.
    #[must_use]
    #[inline]
    pub fn new(secs: u64, nanos: u32) -> Duration {
        std::time::Duration::new(secs, nanos).into()
    }

    /// Creates a new `Duration` from the specified number of whole seconds.
    #[must_use]
    #[inline]
    pub fn from_secs(secs: u64) -> Duration {
        std::time::Duration::from_secs(secs).into()
    }

    /// Creates a new `Duration` from the specified number of milliseconds.
    #[must_use]
    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        std::time::Duration::from_millis(millis).into()
    }

    /// Creates a new `Duration` from the specified number of microseconds.
    #[must_use]
    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        std::time::Duration::from_micros(micros).into()
    }

    /// Creates a new `Duration` from the specified number of nanoseconds.
    #[must_use]
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Duration(nanos)
    }

    /// Creates a new `Duration` from a fractional number of milliseconds.
    ///
    /// Unlike the stdlib float constructors this never panics: negative and
    /// NaN inputs become [`Duration::ZERO`], and values too large to
    /// represent (including `+inf`) become [`Duration::MAX`].
    ///
    /// # Examples
    /// ```
    /// use debounced::time::Duration;
    ///
    /// assert_eq!(Duration::from_millis_f64(2.5), Duration::from_micros(2500));
    /// assert_eq!(Duration::from_millis_f64(-20.0), Duration::ZERO);
    /// assert_eq!(Duration::from_millis_f64(f64::NAN), Duration::ZERO);
    /// ```
    #[must_use]
    pub fn from_millis_f64(millis: f64) -> Duration {
        if millis.is_nan() || millis <= 0.0 {
            return Duration::ZERO;
        }
        let nanos = millis * 1_000_000.0;
        if nanos >= u64::MAX as f64 {
            Duration::MAX
        } else {
            Duration(nanos as u64)
        }
    }

    /// Creates a new `Duration` from the specified number of seconds represented
    /// as `f64`.
    ///
    /// # Panics
    /// This constructor will panic if `secs` is not finite, negative or overflows `Duration`.
    #[must_use]
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Duration {
        std::time::Duration::from_secs_f64(secs).into()
    }

    /// Returns `true` if this `Duration` spans no time.
    #[must_use]
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the number of whole seconds contained by this `Duration`.
    #[must_use]
    #[inline]
    pub const fn as_secs(&self) -> u64 {
        self.0 / 1_000_000_000
    }

    /// Returns the number of whole milliseconds contained by this `Duration`.
    #[must_use]
    #[inline]
    pub const fn as_millis(&self) -> u128 {
        (self.0 / 1_000_000) as u128
    }

    /// Returns the number of whole microseconds contained by this `Duration`.
    #[must_use]
    #[inline]
    pub const fn as_micros(&self) -> u128 {
        (self.0 / 1_000) as u128
    }

    /// Returns the total number of nanoseconds contained by this `Duration`.
    #[must_use]
    #[inline]
    pub const fn as_nanos(&self) -> u128 {
        self.0 as u128
    }

    /// Adds two durations, saturating at [`Duration::MAX`].
    #[must_use]
    #[inline]
    pub const fn saturating_add(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_add(rhs.0))
    }

    /// Subtracts two durations, saturating at [`Duration::ZERO`].
    #[must_use]
    #[inline]
    pub const fn saturating_sub(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

impl From<std::time::Duration> for Duration {
    fn from(inner: std::time::Duration) -> Self {
        Self(inner.as_nanos().try_into().unwrap_or(u64::MAX))
    }
}

impl From<Duration> for std::time::Duration {
    fn from(duration: Duration) -> Self {
        Self::from_nanos(duration.0)
    }
}

impl Add<Duration> for Duration {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl AddAssign<Duration> for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs
    }
}

impl Sub<Duration> for Duration {
    type Output = Self;

    fn sub(self, rhs: Duration) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl SubAssign<Duration> for Duration {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs
    }
}

impl Mul<u32> for Duration {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Duration(self.0.saturating_mul(u64::from(rhs)))
    }
}

impl IntoFuture for Duration {
    type Output = Instant;

    type IntoFuture = Sleep;

    fn into_future(self) -> Self::IntoFuture {
        crate::task::sleep(self)
    }
}
