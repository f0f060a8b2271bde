//! Absolute-Time Periodic Timer

use std::time::{Duration, Instant};
use tracing::debug;

/// Fixed-period release times computed from the previous deadline
///
/// Each deadline is `previous + period`, never `now + period`, so jitter in
/// the loop body does not accumulate as drift.
#[derive(Debug, Clone)]
pub struct PeriodicTimer {
    period: Duration,
    next_deadline: Instant,
    overruns: u64,
}

impl PeriodicTimer {
    /// Start a timer whose first deadline is one period from now
    pub fn new(period: Duration) -> Self {
        Self::starting_at(Instant::now(), period)
    }

    /// Start a timer anchored at `start`
    pub fn starting_at(start: Instant, period: Duration) -> Self {
        Self {
            period,
            next_deadline: start + period,
            overruns: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Deadline the next `wait` sleeps until
    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Deadlines already in the past when `wait` was called
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Sleep until the current deadline, then advance it by one period
    pub fn wait(&mut self) {
        let now = Instant::now();
        if self.next_deadline > now {
            std::thread::sleep(self.next_deadline - now);
        } else {
            self.overruns += 1;
            debug!(
                late_us = (now - self.next_deadline).as_micros() as u64,
                "Periodic deadline overrun"
            );
        }
        self.next_deadline += self.period;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadlines_advance_from_previous() {
        let start = Instant::now();
        let mut timer = PeriodicTimer::starting_at(start, Duration::from_millis(5));
        timer.wait();
        timer.wait();
        assert_eq!(timer.next_deadline(), start + Duration::from_millis(15));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_late_call_counts_overrun() {
        let start = Instant::now() - Duration::from_millis(50);
        let mut timer = PeriodicTimer::starting_at(start, Duration::from_millis(10));
        timer.wait();
        assert_eq!(timer.overruns(), 1);
        assert_eq!(timer.next_deadline(), start + Duration::from_millis(20));
    }
}
