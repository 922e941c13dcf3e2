//! Hobby servo output abstraction
//!
//! Servos take one high pulse per 20 ms frame. Implementations keep
//! repeating the last pulse until it is changed, so callers only write
//! when the commanded width changes.

use crate::pwm::PwmError;

/// Standard RC servo frame length
pub const SERVO_FRAME_MS: u32 = 20;

/// Servo pulse output
pub trait ServoOutput {
    /// Set the high time of every frame, in microseconds
    fn set_pulse_us(&mut self, pulse_us: u16) -> Result<(), PwmError>;

    /// Stop emitting pulses (servo goes limp)
    fn release(&mut self) -> Result<(), PwmError>;
}
