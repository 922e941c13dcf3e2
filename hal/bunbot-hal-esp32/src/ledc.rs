//! LEDC channels as PWM and servo outputs
//!
//! Timers and channels are configured by the board binary; these wrappers
//! only remember the timer resolution and write raw duty counts.

use bunbot_hal::pwm::{max_duty_for_bits, PwmError};
use bunbot_hal::servo::SERVO_FRAME_MS;
use bunbot_hal::{PwmOutput, ServoOutput};
use esp_hal::ledc::channel::{Channel, ChannelHW};
use esp_hal::ledc::timer::config::Duty;
use esp_hal::ledc::LowSpeed;

/// Servo frame rate
pub const SERVO_FREQUENCY_HZ: u32 = 1000 / SERVO_FRAME_MS;

/// Servo timer resolution
pub const SERVO_RESOLUTION_BITS: u8 = 14;

const FRAME_US: u32 = SERVO_FRAME_MS * 1000;

/// LEDC timer duty setting for a resolution
///
/// The same set as `PWM_RESOLUTIONS` in the board config.
pub fn ledc_duty(bits: u8) -> Option<Duty> {
    Some(match bits {
        8 => Duty::Duty8Bit,
        10 => Duty::Duty10Bit,
        12 => Duty::Duty12Bit,
        13 => Duty::Duty13Bit,
        14 => Duty::Duty14Bit,
        _ => return None,
    })
}

/// LEDC channel used as a plain PWM output
pub struct LedcPwm<'d> {
    channel: Channel<'d, LowSpeed>,
    max_duty: u32,
    duty: u32,
}

impl<'d> LedcPwm<'d> {
    /// Wrap a configured channel whose timer runs at `resolution_bits`
    pub fn new(channel: Channel<'d, LowSpeed>, resolution_bits: u8) -> Self {
        Self {
            channel,
            max_duty: max_duty_for_bits(resolution_bits),
            duty: 0,
        }
    }
}

impl PwmOutput for LedcPwm<'_> {
    fn max_duty(&self) -> u32 {
        self.max_duty
    }

    fn set_duty(&mut self, duty: u32) -> Result<(), PwmError> {
        if duty > self.max_duty {
            return Err(PwmError::DutyOutOfRange);
        }
        self.channel.set_duty_hw(duty);
        self.duty = duty;
        Ok(())
    }

    fn duty(&self) -> u32 {
        self.duty
    }
}

/// LEDC channel on a 50 Hz timer used as a servo output
pub struct LedcServo<'d> {
    channel: Channel<'d, LowSpeed>,
    max_duty: u32,
}

impl<'d> LedcServo<'d> {
    /// Wrap a channel on a [`SERVO_FREQUENCY_HZ`] timer
    pub fn new(channel: Channel<'d, LowSpeed>, resolution_bits: u8) -> Self {
        Self {
            channel,
            max_duty: max_duty_for_bits(resolution_bits),
        }
    }

    /// Duty count for a pulse width
    fn duty_for(&self, pulse_us: u16) -> u32 {
        (u64::from(pulse_us) * u64::from(self.max_duty) / u64::from(FRAME_US)) as u32
    }
}

impl ServoOutput for LedcServo<'_> {
    fn set_pulse_us(&mut self, pulse_us: u16) -> Result<(), PwmError> {
        if u32::from(pulse_us) > FRAME_US {
            return Err(PwmError::DutyOutOfRange);
        }
        let duty = self.duty_for(pulse_us);
        self.channel.set_duty_hw(duty);
        Ok(())
    }

    fn release(&mut self) -> Result<(), PwmError> {
        self.channel.set_duty_hw(0);
        Ok(())
    }
}
