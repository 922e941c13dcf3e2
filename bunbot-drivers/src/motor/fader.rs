//! Motorized fader position control
//!
//! The fader wiper is read through a 12-bit ADC and scaled to 0-255. The
//! controller drives the motor towards the target at a speed eased by the
//! remaining distance:
//!
//! ```text
//! distance   speed
//!  > 80      255 (full)
//!  16..=80   80 + (d - 15) / 65 * 175      (linear)
//!  0..=15    80 + (d / 15)^2 * 175         (quadratic)
//! ```
//!
//! The motor stops once the wiper is within the deadband of the target.

use bunbot_core::timing::Interval;
use bunbot_core::traits::MotorDrive;

/// Slowest speed that still moves the fader
pub const MIN_SPEED: u8 = 80;

/// Distance beyond which the motor runs flat out
pub const FULL_SPEED_DISTANCE: u8 = 80;

/// Distance below which the quadratic ease applies
pub const EASE_DISTANCE: u8 = 15;

const SPEED_SPAN: u32 = 255 - MIN_SPEED as u32;

/// Scale a 12-bit ADC reading to a 0-255 position
pub fn position_from_adc(raw: u16) -> u8 {
    (raw / 16).min(255) as u8
}

/// Motor speed for a remaining distance
pub fn eased_speed(distance: u8) -> u8 {
    let d = u32::from(distance);
    let ease = if distance > FULL_SPEED_DISTANCE {
        SPEED_SPAN
    } else if distance > EASE_DISTANCE {
        let span = u32::from(FULL_SPEED_DISTANCE - EASE_DISTANCE);
        (d - u32::from(EASE_DISTANCE)) * SPEED_SPAN / span
    } else {
        let e = u32::from(EASE_DISTANCE);
        d * d * SPEED_SPAN / (e * e)
    };
    (u32::from(MIN_SPEED) + ease).min(255) as u8
}

/// Fader controller configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaderConfig {
    /// Distance at which the motor stops
    pub deadband: u8,
    /// Minimum time between position reports while moving
    pub report_interval_ms: u32,
}

impl Default for FaderConfig {
    fn default() -> Self {
        Self {
            deadband: 4,
            report_interval_ms: 100,
        }
    }
}

/// Position report for the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaderReport {
    /// Still travelling
    Moving(u8),
    /// Reached the target
    Stopped(u8),
}

/// Closed-loop fader position controller
pub struct FaderController {
    config: FaderConfig,
    target: u8,
    moving: bool,
    last_report_ms: Option<u32>,
}

impl FaderController {
    pub fn new(config: FaderConfig, target: u8) -> Self {
        Self {
            config,
            target,
            moving: false,
            last_report_ms: None,
        }
    }

    /// Current target position
    pub fn target(&self) -> u8 {
        self.target
    }

    /// Set a new target position
    pub fn set_target(&mut self, target: u8) {
        self.target = target;
    }

    /// Whether the last update drove the motor
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Motor command for the current wiper position
    pub fn update(&mut self, position: u8) -> MotorDrive {
        let distance = position.abs_diff(self.target);
        if distance <= self.config.deadband {
            self.moving = false;
            return MotorDrive::Stop;
        }

        self.moving = true;
        let speed = eased_speed(distance);
        if position > self.target {
            MotorDrive::Down(speed)
        } else {
            MotorDrive::Up(speed)
        }
    }

    /// Report after an update, throttled while moving
    ///
    /// Returns `Stopped` once when the motor comes to rest.
    pub fn report(&mut self, position: u8, now_ms: u32) -> Option<FaderReport> {
        if self.moving {
            let due = match self.last_report_ms {
                None => true,
                Some(last) => now_ms.wrapping_sub(last) > self.config.report_interval_ms,
            };
            if due {
                self.last_report_ms = Some(now_ms);
                return Some(FaderReport::Moving(position));
            }
            None
        } else if self.last_report_ms.take().is_some() {
            Some(FaderReport::Stopped(position))
        } else {
            None
        }
    }
}

/// Demo target that swings between two positions
pub struct TargetOscillator {
    interval: Interval,
    high: u8,
    low: u8,
    current: u8,
}

impl TargetOscillator {
    /// Fader demo defaults: 250 and 10, every 2 s
    pub const HIGH: u8 = 250;
    pub const LOW: u8 = 10;
    pub const PERIOD_MS: u32 = 2000;

    pub fn new(high: u8, low: u8, period_ms: u32, now_ms: u32) -> Self {
        Self {
            interval: Interval::new(period_ms, now_ms),
            high,
            low,
            current: high,
        }
    }

    /// Current target
    pub fn current(&self) -> u8 {
        self.current
    }

    /// Flip the target when the period elapses
    pub fn poll(&mut self, now_ms: u32) -> Option<u8> {
        if !self.interval.poll(now_ms) {
            return None;
        }
        self.current = if self.current == self.high {
            self.low
        } else {
            self.high
        };
        Some(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_from_adc() {
        assert_eq!(position_from_adc(0), 0);
        assert_eq!(position_from_adc(4095), 255);
        assert_eq!(position_from_adc(2048), 128);
    }

    #[test]
    fn test_eased_speed_zones() {
        assert_eq!(eased_speed(0), 80);
        assert_eq!(eased_speed(15), 255);
        assert_eq!(eased_speed(16), 82);
        assert_eq!(eased_speed(80), 255);
        assert_eq!(eased_speed(81), 255);
        assert_eq!(eased_speed(255), 255);
    }

    #[test]
    fn test_update_directions() {
        let mut fader = FaderController::new(FaderConfig::default(), 100);
        assert_eq!(fader.update(200), MotorDrive::Down(255));
        assert_eq!(fader.update(50), MotorDrive::Up(eased_speed(50)));
        assert!(fader.is_moving());
    }

    #[test]
    fn test_deadband_stops() {
        let mut fader = FaderController::new(FaderConfig::default(), 100);
        assert_eq!(fader.update(104), MotorDrive::Stop);
        assert_eq!(fader.update(96), MotorDrive::Stop);
        assert!(!fader.is_moving());
        assert_ne!(fader.update(95), MotorDrive::Stop);
    }

    #[test]
    fn test_report_throttling() {
        let mut fader = FaderController::new(FaderConfig::default(), 250);

        fader.update(10);
        assert_eq!(fader.report(10, 0), Some(FaderReport::Moving(10)));
        fader.update(40);
        assert_eq!(fader.report(40, 50), None);
        fader.update(90);
        assert_eq!(fader.report(90, 101), Some(FaderReport::Moving(90)));

        fader.update(248);
        assert_eq!(fader.report(248, 150), Some(FaderReport::Stopped(248)));
        assert_eq!(fader.report(248, 400), None);
    }

    #[test]
    fn test_no_stop_report_without_motion() {
        let mut fader = FaderController::new(FaderConfig::default(), 10);
        fader.update(10);
        assert_eq!(fader.report(10, 0), None);
    }

    #[test]
    fn test_oscillator_toggles() {
        let mut osc = TargetOscillator::new(
            TargetOscillator::HIGH,
            TargetOscillator::LOW,
            TargetOscillator::PERIOD_MS,
            0,
        );
        assert_eq!(osc.current(), 250);
        assert_eq!(osc.poll(1999), None);
        assert_eq!(osc.poll(2000), Some(10));
        assert_eq!(osc.poll(4000), Some(250));
    }
}
