use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic clock reading, measured from the clock's origin.
///
/// Comparable to a `performance.now()` value: only differences between readings
/// of the same clock are meaningful.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    #[inline]
    pub const fn from_duration(since_origin: Duration) -> Self {
        Self(since_origin)
    }

    #[inline]
    pub const fn since_origin(self) -> Duration {
        self.0
    }

    /// Time elapsed from `earlier` to `self`.
    ///
    /// Returns zero when `earlier` is later than `self`, so a delta derived from
    /// two readings is never negative.
    #[inline]
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

/// Source of monotonic timestamps.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Clock backed by `std::time::Instant`.
///
/// Never goes backwards, unlike wall-clock time which can jump when the system
/// time is adjusted.
#[derive(Debug, Copy, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(Instant::now().saturating_duration_since(self.origin))
    }
}

/// Hand-driven clock for tests and replays.
///
/// `set` accepts any value, including one earlier than the current reading,
/// which models a source that jumps backwards.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, since_origin: Duration) {
        self.now.set(since_origin);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn rewind(&self, by: Duration) {
        self.now.set(self.now.get().saturating_sub(by));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}
