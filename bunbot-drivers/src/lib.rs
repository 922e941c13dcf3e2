//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in bunbot-core, plus the per-demo signal processing:
//!
//! - Servo drivers (DS positional, continuous rotation, TowerPro MG995)
//! - Motorized fader controller
//! - Sound gauge and NeoPixel gradient
//! - Ultrasonic proximity trigger
//! - SD card clip library

#![no_std]
#![deny(unsafe_code)]

pub mod audio;
pub mod led;
pub mod motor;
pub mod sensor;
pub mod servo;
