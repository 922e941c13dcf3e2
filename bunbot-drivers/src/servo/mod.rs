//! Hobby servo drivers
//!
//! All servos here are driven through [`ServoOutput`], which repeats the
//! last pulse every 20 ms frame. "Holding" a position for some time is
//! therefore a single write followed by a delay.
//!
//! Pulse widths are clamped to 400..=2700 µs before they reach the output.

pub mod continuous;
pub mod positional;
pub mod tower_pro;

use bunbot_core::traits::{AngleServo, ServoError};
use bunbot_hal::ServoOutput;
use embedded_hal_async::delay::DelayNs;

pub use bunbot_hal::servo::SERVO_FRAME_MS;
pub use continuous::ContinuousServoDriver;
pub use positional::{GatePresets, BOTTOM_BUN, TOP_BUN};
pub use tower_pro::TowerPro;

/// Shortest pulse sent to any servo
pub const MIN_PULSE_US: u16 = 400;

/// Longest pulse sent to any servo
pub const MAX_PULSE_US: u16 = 2700;

/// Largest angle accepted by positional servos
pub const MAX_ANGLE: i16 = 180;

/// Clamp a pulse width to the safe range
pub fn clamp_pulse(us: i32) -> u16 {
    us.clamp(i32::from(MIN_PULSE_US), i32::from(MAX_PULSE_US)) as u16
}

/// How a servo maps degrees to pulse width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AngleMapping {
    /// DS servos: 0° = 500 µs, 180° = 2500 µs
    Ds,
    /// Servo-library style: 0° = 544 µs, 180° = 2400 µs
    Library,
}

impl AngleMapping {
    /// Pulse width for an angle in `0..=180`
    pub fn angle_to_us(self, degrees: u8) -> u16 {
        let (min, max) = match self {
            AngleMapping::Ds => (500u32, 2500u32),
            AngleMapping::Library => (544u32, 2400u32),
        };
        let deg = u32::from(degrees.min(MAX_ANGLE as u8));
        (min + deg * (max - min) / 180) as u16
    }
}

/// Positional servo on a pulse output
pub struct PositionalServo<S> {
    output: S,
    mapping: AngleMapping,
    angle: Option<i16>,
}

impl<S: ServoOutput> PositionalServo<S> {
    /// Wrap a pulse output
    pub fn new(output: S, mapping: AngleMapping) -> Self {
        Self {
            output,
            mapping,
            angle: None,
        }
    }

    /// Move to `degrees` and keep it for `hold_ms`
    pub async fn hold<D: DelayNs>(
        &mut self,
        delay: &mut D,
        degrees: i16,
        hold_ms: u32,
    ) -> Result<(), ServoError> {
        self.set_angle(degrees)?;
        delay.delay_ms(hold_ms).await;
        Ok(())
    }

    /// Send a raw pulse width, clamped to the safe range
    ///
    /// Returns the pulse actually sent. The angle becomes unknown.
    pub fn set_pulse(&mut self, us: i32) -> Result<u16, ServoError> {
        let pulse = clamp_pulse(us);
        self.output
            .set_pulse_us(pulse)
            .map_err(|_| ServoError::Output)?;
        self.angle = None;
        Ok(pulse)
    }

    /// Stop pulsing
    pub fn release(&mut self) -> Result<(), ServoError> {
        self.angle = None;
        self.output.release().map_err(|_| ServoError::Output)
    }

    /// Give the output back
    pub fn into_inner(self) -> S {
        self.output
    }
}

impl<S: ServoOutput> AngleServo for PositionalServo<S> {
    fn set_angle(&mut self, degrees: i16) -> Result<(), ServoError> {
        if !(0..=MAX_ANGLE).contains(&degrees) {
            return Err(ServoError::AngleOutOfRange);
        }
        let us = self.mapping.angle_to_us(degrees as u8);
        self.output
            .set_pulse_us(clamp_pulse(i32::from(us)))
            .map_err(|_| ServoError::Output)?;
        self.angle = Some(degrees);
        Ok(())
    }

    fn angle(&self) -> Option<i16> {
        self.angle
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use bunbot_hal::pwm::PwmError;
    use bunbot_hal::ServoOutput;
    use heapless::Vec;

    /// Records every pulse written
    #[derive(Default)]
    pub struct RecordingServo {
        pub pulses: Vec<Option<u16>, 64>,
    }

    impl ServoOutput for RecordingServo {
        fn set_pulse_us(&mut self, pulse_us: u16) -> Result<(), PwmError> {
            self.pulses.push(Some(pulse_us)).map_err(|_| PwmError::Hardware)
        }

        fn release(&mut self) -> Result<(), PwmError> {
            self.pulses.push(None).map_err(|_| PwmError::Hardware)
        }
    }

    /// Adds up requested delays instead of waiting
    #[derive(Default)]
    pub struct CountingDelay {
        pub total_ns: u64,
    }

    impl embedded_hal_async::delay::DelayNs for CountingDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.total_ns += u64::from(ms) * 1_000_000;
        }
    }

    impl CountingDelay {
        pub fn total_ms(&self) -> u64 {
            self.total_ns / 1_000_000
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{CountingDelay, RecordingServo};
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_clamp_pulse() {
        assert_eq!(clamp_pulse(100), 400);
        assert_eq!(clamp_pulse(1500), 1500);
        assert_eq!(clamp_pulse(5000), 2700);
    }

    #[test]
    fn test_ds_mapping() {
        assert_eq!(AngleMapping::Ds.angle_to_us(0), 500);
        assert_eq!(AngleMapping::Ds.angle_to_us(90), 1500);
        assert_eq!(AngleMapping::Ds.angle_to_us(180), 2500);
        assert_eq!(AngleMapping::Ds.angle_to_us(200), 2500);
    }

    #[test]
    fn test_library_mapping() {
        assert_eq!(AngleMapping::Library.angle_to_us(0), 544);
        assert_eq!(AngleMapping::Library.angle_to_us(90), 1472);
        assert_eq!(AngleMapping::Library.angle_to_us(180), 2400);
    }

    #[test]
    fn test_set_angle_rejects_out_of_range() {
        let mut servo = PositionalServo::new(RecordingServo::default(), AngleMapping::Ds);
        assert_eq!(servo.set_angle(-1), Err(ServoError::AngleOutOfRange));
        assert_eq!(servo.set_angle(181), Err(ServoError::AngleOutOfRange));
        assert_eq!(servo.angle(), None);
        assert!(servo.into_inner().pulses.is_empty());
    }

    #[test]
    fn test_hold_writes_once_and_waits() {
        let mut servo = PositionalServo::new(RecordingServo::default(), AngleMapping::Ds);
        let mut delay = CountingDelay::default();
        block_on(servo.hold(&mut delay, 90, 500)).unwrap();
        assert_eq!(servo.angle(), Some(90));
        assert_eq!(delay.total_ms(), 500);
        assert_eq!(servo.into_inner().pulses.as_slice(), &[Some(1500)]);
    }
}
