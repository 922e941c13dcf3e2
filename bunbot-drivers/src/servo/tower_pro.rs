//! TowerPro MG995 continuous servo
//!
//! The MG995 is driven with servo-library angles: 0 runs forward, 90
//! stops and 180 runs backward.

use bunbot_core::traits::{AngleServo, ContinuousServo, ServoError, Spin};
use bunbot_hal::ServoOutput;
use embedded_hal_async::delay::DelayNs;

use super::{AngleMapping, PositionalServo};

pub const FORWARD_ANGLE: i16 = 0;
pub const HALT_ANGLE: i16 = 90;
pub const BACKWARD_ANGLE: i16 = 180;

/// Bench values are pulse widths in units of 2 µs
pub const BENCH_PULSE_SCALE: i32 = 2;

/// MG995 on a pulse output
pub struct TowerPro<S> {
    servo: PositionalServo<S>,
}

impl<S: ServoOutput> TowerPro<S> {
    pub fn new(output: S) -> Self {
        Self {
            servo: PositionalServo::new(output, AngleMapping::Library),
        }
    }

    /// Run forward for `run_ms`, rest `pause_ms`, run backward for `run_ms`,
    /// then halt
    pub async fn bounce<D: DelayNs>(
        &mut self,
        delay: &mut D,
        run_ms: u32,
        pause_ms: u32,
    ) -> Result<(), ServoError> {
        self.set_spin(Spin::Right)?;
        delay.delay_ms(run_ms).await;
        self.set_spin(Spin::Halt)?;
        delay.delay_ms(pause_ms).await;
        self.set_spin(Spin::Left)?;
        delay.delay_ms(run_ms).await;
        self.set_spin(Spin::Halt)
    }

    /// Drive a bench value as a `value * 2` µs pulse, clamped to the safe
    /// range; returns the pulse sent
    pub fn drive_bench(&mut self, value: i32) -> Result<u16, ServoError> {
        self.servo.set_pulse(value.saturating_mul(BENCH_PULSE_SCALE))
    }

    /// Give the output back
    pub fn into_inner(self) -> S {
        self.servo.into_inner()
    }
}

impl<S: ServoOutput> ContinuousServo for TowerPro<S> {
    fn set_spin(&mut self, spin: Spin) -> Result<(), ServoError> {
        let angle = match spin {
            Spin::Right => FORWARD_ANGLE,
            Spin::Halt => HALT_ANGLE,
            Spin::Left => BACKWARD_ANGLE,
        };
        self.servo.set_angle(angle)
    }
}
