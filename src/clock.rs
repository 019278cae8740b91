//! Fixed-period tick source.
//!
//! The clock separates two things: whether the underlying timer is
//! *running*, and whether its fires are *delivered*. Pausing leaves the
//! timer running and only suppresses delivery, so resuming never replays
//! or skips ticks and the tick count stays exactly where it was.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::trace;

use crate::error::ConfigurationError;

/// Default period between ticks.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(100);

/// Tick source with pause gating.
#[derive(Debug, Clone)]
pub struct Clock {
    period: Duration,
    running: bool,
    paused: bool,
    delivered: u64,
    suppressed: u64,
}

impl Clock {
    /// Creates a stopped, unpaused clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroTickPeriod`] for a zero period.
    pub const fn new(period: Duration) -> Result<Self, ConfigurationError> {
        if period.is_zero() {
            return Err(ConfigurationError::ZeroTickPeriod);
        }
        Ok(Self {
            period,
            running: false,
            paused: false,
            delivered: 0,
            suppressed: 0,
        })
    }

    /// Tick period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Arms the timer. A no-op when already running.
    pub const fn start(&mut self) {
        self.running = true;
    }

    /// Disarms the timer. Idempotent.
    pub const fn stop(&mut self) {
        self.running = false;
    }

    /// Suspends delivery without disarming.
    pub const fn pause(&mut self) {
        self.paused = true;
    }

    /// Re-enables delivery.
    pub const fn resume(&mut self) {
        self.paused = false;
    }

    /// Sets the pause state.
    pub const fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Whether the timer is armed.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether delivery is suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Called once per raw timer fire. Returns whether the fire becomes a
    /// delivered tick.
    pub fn deliver(&mut self) -> bool {
        if !self.running {
            return false;
        }
        if self.paused {
            self.suppressed += 1;
            trace!(suppressed = self.suppressed, "tick suppressed while paused");
            return false;
        }
        self.delivered += 1;
        true
    }

    /// Fires delivered since creation.
    #[must_use]
    pub const fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Fires swallowed by pause since creation.
    #[must_use]
    pub const fn suppressed(&self) -> u64 {
        self.suppressed
    }

    /// Builds the timer for this clock's period.
    ///
    /// The first fire is one period after the call. Missed fires are
    /// delayed rather than burst, so a stalled runtime never delivers a
    /// backlog of ticks at once.
    #[must_use]
    pub fn interval(&self) -> Interval {
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_period_rejected() {
        assert_eq!(
            Clock::new(Duration::ZERO).unwrap_err(),
            ConfigurationError::ZeroTickPeriod
        );
    }

    #[test]
    fn test_stopped_clock_never_delivers() {
        let mut clock = Clock::new(DEFAULT_TICK_PERIOD).unwrap();
        assert!(!clock.deliver());
        assert_eq!(clock.delivered(), 0);
    }

    #[test]
    fn test_pause_suppresses_delivery() {
        let mut clock = Clock::new(DEFAULT_TICK_PERIOD).unwrap();
        clock.start();
        assert!(clock.deliver());
        clock.pause();
        assert!(!clock.deliver());
        assert!(!clock.deliver());
        clock.resume();
        assert!(clock.deliver());
        assert_eq!(clock.delivered(), 2);
        assert_eq!(clock.suppressed(), 2);
        assert!(clock.is_running());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut clock = Clock::new(DEFAULT_TICK_PERIOD).unwrap();
        clock.start();
        clock.stop();
        clock.stop();
        assert!(!clock.is_running());
        assert!(!clock.deliver());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_first_fire_after_one_period() {
        let clock = Clock::new(Duration::from_millis(50)).unwrap();
        let start = Instant::now();
        let mut interval = clock.interval();
        interval.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(50));
        interval.tick().await;
        assert_eq!(start.elapsed(), Duration::from_millis(100));
    }
}
