//! Throttling for high-frequency input events

use chrono::{DateTime, Local};
use std::time::Duration;

use crate::to_chrono;

/// Lets at most one event through per interval.
///
/// Pointer and scroll events arrive far faster than the session needs to
/// notice them; only the first event in each window is acted upon.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_pass: Option<DateTime<Local>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_pass: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` if an event at `now` should be handled
    pub fn check(&mut self, now: DateTime<Local>) -> bool {
        match self.last_pass {
            Some(last) if now < last + to_chrono(self.interval) => false,
            _ => {
                self.last_pass = Some(now);
                true
            }
        }
    }

    /// Forget the last pass so the next event goes through
    pub fn reset(&mut self) {
        self.last_pass = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_throttle_allows_once_per_interval() {
        let mut throttle = Throttle::new(Duration::from_secs(1));

        assert!(throttle.check(t0()));
        assert!(!throttle.check(t0() + chrono::Duration::milliseconds(500)));
        assert!(!throttle.check(t0() + chrono::Duration::milliseconds(999)));
        assert!(throttle.check(t0() + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_throttle_reset() {
        let mut throttle = Throttle::new(Duration::from_secs(1));

        assert!(throttle.check(t0()));
        throttle.reset();
        assert!(throttle.check(t0() + chrono::Duration::milliseconds(10)));
    }
}
