//! bunbot Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the demo logic is written
//! against. Chip-specific crates (currently `bunbot-hal-esp32`) implement
//! them, and host tests implement them with plain structs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Demo binaries (bunbot-firmware)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bunbot-drivers / bunbot-core           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bunbot-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ bunbot-hal-   │
//!             │    esp32      │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`pwm::PwmOutput`] - Duty-cycle outputs (LEDC on the ESP32)
//! - [`adc::AnalogInput`] - One-shot analog reads
//! - [`servo::ServoOutput`] - Hobby servo pulse outputs

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;
pub mod pwm;
pub mod servo;

// Re-export key traits at crate root for convenience
pub use adc::AnalogInput;
pub use gpio::{InputPin, OutputPin};
pub use pwm::PwmOutput;
pub use servo::ServoOutput;
