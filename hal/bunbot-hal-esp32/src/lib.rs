//! ESP32 HAL for the bunbot boards
//!
//! Thin wrappers that put `esp-hal` peripherals behind the `bunbot-hal`
//! traits:
//!
//! - GPIO outputs and inputs
//! - LEDC channels as PWM outputs and as servo pulse outputs
//! - One-shot ADC reads

#![no_std]
#![deny(unsafe_code)]

pub mod adc;
pub mod gpio;
pub mod ledc;

pub use adc::EspAnalog;
pub use gpio::{EspInput, EspOutput};
pub use ledc::{ledc_duty, LedcPwm, LedcServo, SERVO_FREQUENCY_HZ, SERVO_RESOLUTION_BITS};
