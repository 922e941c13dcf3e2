//! Two-channel PWM motor driver
//!
//! Channel A drives the motor one way, channel B the other. Only one
//! channel is ever on.

use bunbot_core::traits::{MotorDrive, MotorDriver, MotorError};
use bunbot_hal::PwmOutput;

/// Motor on a pair of PWM channels
pub struct DualPwmMotor<A, B> {
    a: A,
    b: B,
    last: MotorDrive,
}

impl<A: PwmOutput, B: PwmOutput> DualPwmMotor<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self {
            a,
            b,
            last: MotorDrive::Stop,
        }
    }

    /// Last applied command
    pub fn last(&self) -> MotorDrive {
        self.last
    }

    /// Give the channels back
    pub fn release(self) -> (A, B) {
        (self.a, self.b)
    }
}

/// Scale an 8-bit speed to a channel's duty range
fn scaled(speed: u8, max_duty: u32) -> u32 {
    u32::from(speed) * max_duty / 255
}

impl<A: PwmOutput, B: PwmOutput> MotorDriver for DualPwmMotor<A, B> {
    fn drive(&mut self, drive: MotorDrive) -> Result<(), MotorError> {
        let (duty_a, duty_b) = match drive {
            MotorDrive::Stop => (0, 0),
            MotorDrive::Down(speed) => (scaled(speed, self.a.max_duty()), 0),
            MotorDrive::Up(speed) => (0, scaled(speed, self.b.max_duty())),
        };

        // Release the idle channel before energizing the other one
        if duty_a == 0 {
            self.a.set_duty(0).map_err(|_| MotorError::Output)?;
            self.b.set_duty(duty_b).map_err(|_| MotorError::Output)?;
        } else {
            self.b.set_duty(0).map_err(|_| MotorError::Output)?;
            self.a.set_duty(duty_a).map_err(|_| MotorError::Output)?;
        }

        self.last = drive;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bunbot_hal::pwm::PwmError;

    struct FakePwm {
        max: u32,
        duty: u32,
    }

    impl FakePwm {
        fn bits8() -> Self {
            Self { max: 255, duty: 0 }
        }
    }

    impl PwmOutput for FakePwm {
        fn max_duty(&self) -> u32 {
            self.max
        }

        fn set_duty(&mut self, duty: u32) -> Result<(), PwmError> {
            if duty > self.max {
                return Err(PwmError::DutyOutOfRange);
            }
            self.duty = duty;
            Ok(())
        }

        fn duty(&self) -> u32 {
            self.duty
        }
    }

    #[test]
    fn test_down_uses_channel_a() {
        let mut motor = DualPwmMotor::new(FakePwm::bits8(), FakePwm::bits8());
        motor.drive(MotorDrive::Down(200)).unwrap();
        let (a, b) = motor.release();
        assert_eq!(a.duty(), 200);
        assert_eq!(b.duty(), 0);
    }

    #[test]
    fn test_direction_change_clears_other_channel() {
        let mut motor = DualPwmMotor::new(FakePwm::bits8(), FakePwm::bits8());
        motor.drive(MotorDrive::Down(255)).unwrap();
        motor.drive(MotorDrive::Up(80)).unwrap();
        assert_eq!(motor.last(), MotorDrive::Up(80));
        let (a, b) = motor.release();
        assert_eq!(a.duty(), 0);
        assert_eq!(b.duty(), 80);
    }

    #[test]
    fn test_stop() {
        let mut motor = DualPwmMotor::new(FakePwm::bits8(), FakePwm::bits8());
        motor.drive(MotorDrive::Up(255)).unwrap();
        motor.stop().unwrap();
        let (a, b) = motor.release();
        assert_eq!((a.duty(), b.duty()), (0, 0));
    }

    #[test]
    fn test_scales_to_wider_channels() {
        let mut motor = DualPwmMotor::new(
            FakePwm { max: 1023, duty: 0 },
            FakePwm { max: 1023, duty: 0 },
        );
        motor.drive(MotorDrive::Down(255)).unwrap();
        assert_eq!(motor.release().0.duty(), 1023);
    }
}
