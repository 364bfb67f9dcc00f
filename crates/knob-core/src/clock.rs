//! Wall-clock seam for server-side timestamps.

use chrono::{DateTime, SubsecRound, Utc};

/// Source of the current time.
///
/// The store asks the clock for `now` on every write. Tests substitute a
/// manual clock to pin or rewind time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock, truncated to microseconds so values survive an
/// RFC 3339 round-trip unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn system_clock_has_microsecond_precision() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond() % 1_000, 0);
    }
}
