//! Non-blocking interval timers
//!
//! The `millis() - previous >= interval` idiom, with wrapping arithmetic.

use crate::config::StatusConfig;

/// Fires once per period when polled
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period_ms: u32,
    last_ms: u32,
}

impl Interval {
    /// Create an interval whose first period starts at `now_ms`
    pub const fn new(period_ms: u32, now_ms: u32) -> Self {
        Self {
            period_ms,
            last_ms: now_ms,
        }
    }

    /// Period in milliseconds
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Change the period without restarting the current one
    pub fn set_period(&mut self, period_ms: u32) {
        self.period_ms = period_ms;
    }

    /// Returns true once the period has elapsed, and starts the next one
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_ms) >= self.period_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}

/// Status LED health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Health {
    Good,
    Error,
}

/// Status LED blinker
///
/// Blinks slowly while healthy and fast after a failure.
#[derive(Debug, Clone, Copy)]
pub struct Blinker {
    interval: Interval,
    good_ms: u32,
    error_ms: u32,
    lit: bool,
}

impl Blinker {
    /// Create a healthy blinker with the LED off
    pub fn new(config: &StatusConfig, now_ms: u32) -> Self {
        Self {
            interval: Interval::new(config.led_good_ms, now_ms),
            good_ms: config.led_good_ms,
            error_ms: config.led_error_ms,
            lit: false,
        }
    }

    /// Switch blink rate
    pub fn set_health(&mut self, health: Health) {
        let period = match health {
            Health::Good => self.good_ms,
            Health::Error => self.error_ms,
        };
        self.interval.set_period(period);
    }

    /// Current blink period
    pub fn period_ms(&self) -> u32 {
        self.interval.period_ms()
    }

    /// New LED level if it should change now
    pub fn poll(&mut self, now_ms: u32) -> Option<bool> {
        if self.interval.poll(now_ms) {
            self.lit = !self.lit;
            Some(self.lit)
        } else {
            None
        }
    }
}

/// Periodic "still alive" log line
#[derive(Debug, Clone, Copy)]
pub struct Heartbeat {
    interval: Interval,
}

impl Heartbeat {
    /// Create a heartbeat that first fires one period after `now_ms`
    pub fn new(config: &StatusConfig, now_ms: u32) -> Self {
        Self {
            interval: Interval::new(config.hello_interval_ms, now_ms),
        }
    }

    /// Uptime to report, if a heartbeat is due
    pub fn poll(&mut self, now_ms: u32) -> Option<u32> {
        self.interval.poll(now_ms).then_some(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_fires_per_period() {
        let mut interval = Interval::new(10, 0);
        assert!(!interval.poll(9));
        assert!(interval.poll(10));
        assert!(!interval.poll(15));
        assert!(interval.poll(25));
    }

    #[test]
    fn test_interval_wraps() {
        let mut interval = Interval::new(100, u32::MAX - 10);
        assert!(!interval.poll(50));
        assert!(interval.poll(89));
    }

    #[test]
    fn test_blinker_toggles() {
        let config = StatusConfig::default();
        let mut blinker = Blinker::new(&config, 0);
        assert_eq!(blinker.poll(500), None);
        assert_eq!(blinker.poll(1000), Some(true));
        assert_eq!(blinker.poll(2000), Some(false));
    }

    #[test]
    fn test_blinker_error_rate() {
        let config = StatusConfig::default();
        let mut blinker = Blinker::new(&config, 0);
        blinker.set_health(Health::Error);
        assert_eq!(blinker.period_ms(), 200);
        assert_eq!(blinker.poll(200), Some(true));
        assert_eq!(blinker.poll(400), Some(false));
        blinker.set_health(Health::Good);
        assert_eq!(blinker.period_ms(), 1000);
    }

    #[test]
    fn test_heartbeat() {
        let config = StatusConfig::default();
        let mut hello = Heartbeat::new(&config, 0);
        assert_eq!(hello.poll(9_999), None);
        assert_eq!(hello.poll(10_000), Some(10_000));
        assert_eq!(hello.poll(15_000), None);
    }
}
