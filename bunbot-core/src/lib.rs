//! Board-agnostic core logic for the bunbot demo boards
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Toaster state machine and its timed sequencer (Chef board)
//! - Flipper and gate follower state machines
//! - Servo motion plans
//! - Button press detection and interval timers
//! - Console line formatting
//! - Configuration types and TOML loading
//! - Driver traits implemented by `bunbot-drivers`

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod console;
pub mod input;
pub mod motion;
pub mod sequencer;
pub mod state;
pub mod timing;
pub mod traits;
