//! DC motor driver trait
//!
//! The motorized fader's motor sits on a two-channel driver: one PWM
//! channel pulls the fader down, the other pushes it up.

/// Errors that can occur with motor operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// PWM output rejected the update
    Output,
}

/// Motor command with an 8-bit speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorDrive {
    /// Both channels off
    Stop,
    /// Channel A at this duty
    Down(u8),
    /// Channel B at this duty
    Up(u8),
}

/// Two-channel DC motor driver
pub trait MotorDriver {
    /// Apply a command, turning the opposite channel off
    fn drive(&mut self, drive: MotorDrive) -> Result<(), MotorError>;

    /// Stop the motor
    fn stop(&mut self) -> Result<(), MotorError> {
        self.drive(MotorDrive::Stop)
    }
}
