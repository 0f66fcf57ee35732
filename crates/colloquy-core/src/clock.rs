//! Clock abstraction for deterministic timers.
//!
//! Auto-advance deadlines and reveal sequences are measured against an
//! injected clock. Hosts use [`SystemClock`]; tests substitute a manually
//! advanced clock so timer behavior is reproducible.

use chrono::{DateTime, Duration, Utc};

/// Source of "now" for every timed decision a session makes.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds elapsed since `earlier`, saturating at zero if the clock
    /// reports a time before it.
    fn millis_since(&self, earlier: DateTime<Utc>) -> u64 {
        let elapsed = self.now() - earlier;
        u64::try_from(elapsed.num_milliseconds()).unwrap_or(0)
    }

    /// The instant `millis` milliseconds from now.
    fn deadline_after(&self, millis: u64) -> DateTime<Utc> {
        let millis = i64::try_from(millis).unwrap_or(i64::MAX);
        self.now()
            .checked_add_signed(Duration::milliseconds(millis))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct StaticClock(DateTime<Utc>);

    impl Clock for StaticClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_millis_since_saturates_for_future_instants() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let clock = StaticClock(now);

        // Act
        let elapsed = clock.millis_since(now + Duration::seconds(5));

        // Assert
        assert_eq!(elapsed, 0);
    }

    #[test]
    fn test_deadline_after_offsets_from_now() {
        // Arrange
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let clock = StaticClock(now);

        // Act
        let deadline = clock.deadline_after(2_000);

        // Assert
        assert_eq!(deadline, now + Duration::milliseconds(2_000));
        assert_eq!(clock.millis_since(now - Duration::milliseconds(250)), 250);
    }
}
