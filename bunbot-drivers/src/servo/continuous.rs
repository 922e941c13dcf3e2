//! Continuous-rotation servo
//!
//! Speed and direction come from the pulse width: 1500 µs is neutral,
//! shorter spins right and longer spins left.

use bunbot_core::traits::{ContinuousServo, ServoError, Spin};
use bunbot_hal::servo::SERVO_FRAME_MS;
use bunbot_hal::ServoOutput;
use embedded_hal_async::delay::DelayNs;

use super::clamp_pulse;

/// Neutral pulse
pub const NEUTRAL_US: u16 = 1500;

/// Clockwise pulse
pub const RIGHT_US: u16 = 1300;

/// Counter-clockwise pulse
pub const LEFT_US: u16 = 1700;

/// Pulse width for a spin command
pub const fn spin_pulse(spin: Spin) -> u16 {
    match spin {
        Spin::Halt => NEUTRAL_US,
        Spin::Right => RIGHT_US,
        Spin::Left => LEFT_US,
    }
}

/// Continuous servo on a pulse output
pub struct ContinuousServoDriver<S> {
    output: S,
    spin: Spin,
}

impl<S: ServoOutput> ContinuousServoDriver<S> {
    pub fn new(output: S) -> Self {
        Self {
            output,
            spin: Spin::Halt,
        }
    }

    /// Current rotation
    pub fn spin(&self) -> Spin {
        self.spin
    }

    /// Spin right for `cycles` frames, rest for `pause_ms`, then spin left
    /// for `cycles` frames and halt
    ///
    /// Negative cycle counts are treated as zero.
    pub async fn bounce<D: DelayNs>(
        &mut self,
        delay: &mut D,
        cycles: i32,
        pause_ms: u32,
    ) -> Result<(), ServoError> {
        let frames = cycles.max(0) as u32;

        self.set_spin(Spin::Right)?;
        delay.delay_ms(frames * SERVO_FRAME_MS).await;
        self.set_spin(Spin::Halt)?;
        delay.delay_ms(pause_ms).await;
        self.set_spin(Spin::Left)?;
        delay.delay_ms(frames * SERVO_FRAME_MS).await;
        self.set_spin(Spin::Halt)
    }

    /// Give the output back
    pub fn into_inner(self) -> S {
        self.output
    }
}

impl<S: ServoOutput> ContinuousServo for ContinuousServoDriver<S> {
    fn set_spin(&mut self, spin: Spin) -> Result<(), ServoError> {
        self.output
            .set_pulse_us(clamp_pulse(i32::from(spin_pulse(spin))))
            .map_err(|_| ServoError::Output)?;
        self.spin = spin;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{CountingDelay, RecordingServo};
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn test_spin_pulses() {
        let mut servo = ContinuousServoDriver::new(RecordingServo::default());
        servo.set_spin(Spin::Right).unwrap();
        servo.set_spin(Spin::Left).unwrap();
        servo.halt().unwrap();
        assert_eq!(servo.spin(), Spin::Halt);
        assert_eq!(
            servo.into_inner().pulses.as_slice(),
            &[Some(1300), Some(1700), Some(1500)]
        );
    }

    #[test]
    fn test_bounce_timing() {
        let mut servo = ContinuousServoDriver::new(RecordingServo::default());
        let mut delay = CountingDelay::default();
        block_on(servo.bounce(&mut delay, 5, 1000)).unwrap();

        assert_eq!(delay.total_ms(), 5 * 20 + 1000 + 5 * 20);
        assert_eq!(
            servo.into_inner().pulses.as_slice(),
            &[Some(1300), Some(1500), Some(1700), Some(1500)]
        );
    }

    #[test]
    fn test_negative_cycles_are_zero() {
        let mut servo = ContinuousServoDriver::new(RecordingServo::default());
        let mut delay = CountingDelay::default();
        block_on(servo.bounce(&mut delay, -3, 200)).unwrap();
        assert_eq!(delay.total_ms(), 200);
        assert_eq!(servo.spin(), Spin::Halt);
    }
}
