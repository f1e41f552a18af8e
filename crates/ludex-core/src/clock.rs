//! Time source abstraction.
//!
//! The cache, circuit breaker and staleness checks read time through
//! [`Clock`] so tests can drive them with [`ManualClock`].

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
    /// Monotonic time, for TTLs and timeouts.
    fn now(&self) -> Instant;

    /// Wall-clock time, for comparing against persisted timestamps.
    fn utc_now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    base_utc: DateTime<Utc>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Start the wall clock at a fixed point.
    pub fn starting_at(utc: DateTime<Utc>) -> Self {
        Self {
            base: Instant::now(),
            base_utc: utc,
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move both clocks forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }

    fn offset(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        let offset = chrono::TimeDelta::from_std(self.offset()).unwrap_or(chrono::TimeDelta::MAX);
        self.base_utc + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_both_views() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        let u0 = clock.utc_now();

        clock.advance(Duration::from_secs(90));

        assert_eq!(clock.now() - t0, Duration::from_secs(90));
        assert_eq!((clock.utc_now() - u0).num_seconds(), 90);
    }
}
