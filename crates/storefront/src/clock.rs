//! Time sources for badge and toast timers.
//!
//! Timers are stored as deadlines and evaluated against a [`Clock`] when the
//! owner is ticked. Production code uses [`SystemClock`]; tests share a
//! [`ManualClock`] and advance it explicitly.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};

/// Source of the current time.
pub trait Clock: fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock handle shared between components.
pub type SharedClock = Rc<dyn Clock>;

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: TimeDelta) {
        self.now.set(self.now.get() + by);
    }

    /// Move the clock forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: i64) {
        self.advance(TimeDelta::milliseconds(ms));
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        self.now.set(to);
    }

    /// Convert into a [`SharedClock`] that stays linked to this handle.
    #[must_use]
    pub fn shared(&self) -> SharedClock {
        Rc::new(self.clone())
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Convert a millisecond count to a [`TimeDelta`], clamping negatives to zero.
#[must_use]
pub fn millis(ms: i64) -> TimeDelta {
    TimeDelta::milliseconds(ms.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::default();
        let shared = clock.shared();

        clock.advance_ms(250);

        assert_eq!(shared.now(), DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(250));
    }

    #[test]
    fn test_millis_clamps_negative() {
        assert_eq!(millis(-10), TimeDelta::zero());
        assert_eq!(millis(10), TimeDelta::milliseconds(10));
    }
}
