//! Time abstraction for tick timing and timed tasks
//!
//! Tasks never sleep; they compare the tick timestamp handed to them by the
//! scheduler against a start time captured in `begin`. The timestamp comes
//! from a [`TimeSource`] owned by the run driver.

use alloc::rc::Rc;
use core::cell::Cell;

/// Monotonic time source
///
/// Implementations:
/// - `MonotonicClock` (root crate) backed by `std::time::Instant`
/// - [`MockTime`] for host tests and lockstep simulation
pub trait TimeSource {
    /// Current time in microseconds since an arbitrary fixed origin
    fn now_us(&self) -> u64;

    /// Current time in milliseconds
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Current time in seconds
    fn now_secs(&self) -> f64 {
        us_to_secs(self.now_us())
    }

    /// Elapsed microseconds since `reference_us` (saturates at zero)
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

/// Convert seconds to the nearest whole microsecond (negative and NaN map to zero)
#[inline]
pub fn secs_to_us(secs: f64) -> u64 {
    if secs.is_nan() || secs <= 0.0 {
        0
    } else {
        libm::round(secs * 1_000_000.0) as u64
    }
}

#[inline]
pub fn us_to_secs(us: u64) -> f64 {
    us as f64 / 1_000_000.0
}

/// Manually advanced clock
///
/// Clones share the same underlying time, so a test can keep a handle and
/// advance the clock owned by a run driver.
///
/// # Example
///
/// ```
/// use tickbot_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// let handle = time.clone();
/// handle.advance_secs(0.5);
/// assert_eq!(time.now_us(), 500_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTime {
    current_us: Rc<Cell<u64>>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Rc::new(Cell::new(us)),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time by `us` microseconds.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get().saturating_add(us));
    }

    /// Advances the current time by `secs` seconds.
    pub fn advance_secs(&self, secs: f64) {
        self.advance(secs_to_us(secs));
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}
