//! Motor drivers
//!
//! The motorized fader runs a small DC motor through a two-channel
//! driver and closes the loop on the fader's wiper.

pub mod dual_pwm;
pub mod fader;

pub use dual_pwm::DualPwmMotor;
pub use fader::{eased_speed, FaderConfig, FaderController, FaderReport, TargetOscillator};
