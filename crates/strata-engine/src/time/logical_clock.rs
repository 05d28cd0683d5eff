use core::fmt;

/// A point on the logical timeline.
///
/// Only ordering matters; the unit is whatever the time signal counts
/// (frames, traversals, milliseconds).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct LogicalTime(pub u64);

impl LogicalTime {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for LogicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Monotonically non-decreasing logical clock.
///
/// Updates that would move time backwards are ignored, so LRU comparisons
/// stay meaningful even when the time source is reset or jitters.
#[derive(Debug, Clone, Default)]
pub struct LogicalClock {
    now: LogicalTime,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time.
    #[inline]
    pub fn now(&self) -> LogicalTime {
        self.now
    }

    /// Applies an external time signal.
    ///
    /// Returns `false` (and keeps the current time) if `t` is earlier than now.
    pub fn update(&mut self, t: LogicalTime) -> bool {
        if t < self.now {
            log::warn!("ignoring time signal {t}: clock is already at {}", self.now);
            return false;
        }
        self.now = t;
        true
    }

    /// Advances the clock by one unit and returns the new time.
    pub fn tick(&mut self) -> LogicalTime {
        self.now = LogicalTime(self.now.0.saturating_add(1));
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(LogicalClock::new().now(), LogicalTime::ZERO);
    }

    #[test]
    fn update_moves_forward() {
        let mut c = LogicalClock::new();
        assert!(c.update(LogicalTime(5)));
        assert!(c.update(LogicalTime(5)));
        assert_eq!(c.now(), LogicalTime(5));
    }

    #[test]
    fn update_never_moves_backwards() {
        let mut c = LogicalClock::new();
        c.update(LogicalTime(10));
        assert!(!c.update(LogicalTime(3)));
        assert_eq!(c.now(), LogicalTime(10));
    }

    #[test]
    fn tick_increments() {
        let mut c = LogicalClock::new();
        assert_eq!(c.tick(), LogicalTime(1));
        assert_eq!(c.tick(), LogicalTime(2));
    }
}
