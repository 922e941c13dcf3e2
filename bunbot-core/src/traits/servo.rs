//! Servo driver traits
//!
//! Positional servos take an angle; continuous-rotation servos take a
//! spin direction. Both are written once per change and the output keeps
//! refreshing the pulse every frame.

/// Errors that can occur with servo operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoError {
    /// Angle outside the servo's range
    AngleOutOfRange,
    /// Pulse output rejected the update
    Output,
}

/// Rotation command for a continuous servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Spin {
    /// Neutral pulse, motor stopped
    Halt,
    /// Clockwise
    Right,
    /// Counter-clockwise
    Left,
}

/// Positional servo
pub trait AngleServo {
    /// Move to an angle in degrees
    fn set_angle(&mut self, degrees: i16) -> Result<(), ServoError>;

    /// Last commanded angle
    fn angle(&self) -> Option<i16>;
}

/// Continuous-rotation servo
pub trait ContinuousServo {
    /// Set the rotation
    fn set_spin(&mut self, spin: Spin) -> Result<(), ServoError>;

    /// Stop rotating
    fn halt(&mut self) -> Result<(), ServoError> {
        self.set_spin(Spin::Halt)
    }
}
