//! Wall-clock source for session timing

use chrono::{DateTime, Utc};

/// Source of "now", swappable in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whole minutes between two instants, halves rounded up
pub fn rounded_minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    (millis + 30_000).div_euclid(60_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn ninety_seconds_rounds_to_two_minutes() {
        let start = Utc::now();
        assert_eq!(rounded_minutes_between(start, start + Duration::seconds(90)), 2);
    }

    #[test]
    fn rounding_boundaries() {
        let start = Utc::now();
        assert_eq!(rounded_minutes_between(start, start), 0);
        assert_eq!(rounded_minutes_between(start, start + Duration::milliseconds(29_999)), 0);
        assert_eq!(rounded_minutes_between(start, start + Duration::milliseconds(89_999)), 1);
        assert_eq!(rounded_minutes_between(start, start + Duration::minutes(25)), 25);
    }
}
