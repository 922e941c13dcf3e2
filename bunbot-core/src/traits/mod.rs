//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and the drivers in `bunbot-drivers`.

pub mod motor;
pub mod servo;

pub use motor::{MotorDrive, MotorDriver, MotorError};
pub use servo::{AngleServo, ContinuousServo, ServoError, Spin};
