//! # Clock
//!
//! The only source of "now" for the pricing engine.
//!
//! Time-of-day and weekday conditions, promo validity dates, combo windows
//! and the smart-recommendation window all read local wall-clock time
//! through this trait, so tests can pin it with [`FixedClock`].

use std::fmt::Debug;
use std::sync::RwLock;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};

/// A source of local wall-clock time.
pub trait Clock: Debug + Send + Sync {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Current local date.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Reads the operating system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to a given instant. Can be moved explicitly.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        FixedClock {
            now: RwLock::new(now),
        }
    }

    /// Convenience constructor; `None` for an invalid date or time.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .map(FixedClock::new)
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: NaiveDateTime) {
        // A poisoned lock still holds a valid timestamp.
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::at(2024, 3, 15, 14, 30).unwrap();
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(clock.now().format("%H:%M").to_string(), "14:30");

        clock.advance(Duration::hours(10));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(clock.now().format("%H:%M").to_string(), "00:30");
    }

    #[test]
    fn test_fixed_clock_rejects_invalid_dates() {
        assert!(FixedClock::at(2024, 2, 30, 10, 0).is_none());
        assert!(FixedClock::at(2024, 2, 1, 24, 0).is_none());
    }
}
