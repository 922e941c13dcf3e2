//! Sound-reactive NeoPixel bar
//!
//! A microphone level is turned into a bar length (`step`), which is then
//! drawn as a green-to-red gradient whose overall brightness grows with
//! the bar.

pub mod gauge;
pub mod gradient;
pub mod meter;

pub use gauge::{audio_heater_duty, PwmSmoother, SoundGauge};
pub use gradient::{gradient, lerp_color};
pub use meter::LinearMeter;

/// Largest supported strip length
pub const MAX_PIXELS: usize = 64;
