//! Clocks and time types at millisecond precision
//!
//! The token record stores its expiry as an absolute epoch millisecond, so
//! all time handling in this crate runs through these types. The [`Clock`]
//! trait allows tests to control the current time.

use std::ops::{Add, Sub};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Unix time in milliseconds
///
/// The number of milliseconds elapsed since the beginning of the Unix epoch
/// on 1970/01/01 at 00:00:00 UTC.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct UnixMillis(pub u64);

impl UnixMillis {
    /// Converts a whole-second epoch timestamp into epoch milliseconds
    ///
    /// Saturates rather than wrapping; a nonsensically large timestamp stays
    /// at the far future instead of collapsing to the epoch.
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }
}

impl From<SystemTime> for UnixMillis {
    #[inline]
    fn from(t: SystemTime) -> Self {
        let millis = t
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("times before Unix epoch are not expected")
            .as_millis() as u64;

        UnixMillis(millis)
    }
}

/// A span of time in milliseconds
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct DurationMillis(pub u64);

impl DurationMillis {
    /// Converts a whole-second duration into milliseconds, saturating on
    /// overflow
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }
}

impl Add<DurationMillis> for UnixMillis {
    type Output = UnixMillis;

    #[inline]
    fn add(self, rhs: DurationMillis) -> Self::Output {
        UnixMillis(self.0.saturating_add(rhs.0))
    }
}

impl Sub<UnixMillis> for UnixMillis {
    type Output = DurationMillis;

    #[inline]
    fn sub(self, rhs: UnixMillis) -> Self::Output {
        DurationMillis(self.0.saturating_sub(rhs.0))
    }
}

/// Represents a clock, which can tell the current time
pub trait Clock {
    /// Gets the current time according to this clock
    fn now(&self) -> UnixMillis;
}

/// The system clock as provided by `std::time::SystemTime`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct System;

impl Clock for System {
    #[inline]
    fn now(&self) -> UnixMillis {
        UnixMillis::from(SystemTime::now())
    }
}

/// A test clock which maintains the current time as internal state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TestClock(UnixMillis);

impl Clock for TestClock {
    #[inline]
    fn now(&self) -> UnixMillis {
        self.0
    }
}

impl TestClock {
    /// Creates a new test clock with the specified time
    #[inline]
    pub const fn new(time: UnixMillis) -> Self {
        Self(time)
    }

    /// Updates the clock's current time to `val`
    pub fn set(&mut self, val: UnixMillis) {
        self.0 = val;
    }

    /// Increments the clock's current time by `inc` milliseconds
    pub fn inc(&mut self, inc: u64) {
        (self.0).0 += inc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_convert_to_milliseconds() {
        assert_eq!(UnixMillis::from_secs(12), UnixMillis(12_000));
        assert_eq!(DurationMillis::from_secs(300), DurationMillis(300_000));
    }

    #[test]
    fn arithmetic_saturates_on_underflow() {
        assert_eq!(UnixMillis(500) + DurationMillis(250), UnixMillis(750));
        assert_eq!(UnixMillis(500) - UnixMillis(750), DurationMillis(0));
    }

    #[test]
    fn arithmetic_saturates_on_overflow() {
        assert_eq!(
            UnixMillis::from_secs(u64::MAX / 1000 + 1),
            UnixMillis(u64::MAX)
        );
        assert_eq!(DurationMillis::from_secs(u64::MAX), DurationMillis(u64::MAX));
        assert_eq!(
            UnixMillis(1_700_000_000_000) + DurationMillis::from_secs(u64::MAX / 1000),
            UnixMillis(u64::MAX)
        );
    }

    #[test]
    fn test_clock_advances_as_told() {
        let mut clock = TestClock::new(UnixMillis(1_000));
        assert_eq!(clock.now(), UnixMillis(1_000));
        clock.inc(500);
        assert_eq!(clock.now(), UnixMillis(1_500));
        clock.set(UnixMillis(10));
        assert_eq!(clock.now(), UnixMillis(10));
    }
}
