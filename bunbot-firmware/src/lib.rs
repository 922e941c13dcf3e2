//! Shared firmware for the bunbot demo boards
//!
//! Every board binary in `src/bin` is a thin wiring of:
//!
//! - the console print queue and line reader ([`tasks::console`])
//! - the status LED and heartbeat ([`tasks::status`])
//! - ESP-NOW broadcast and receive ([`tasks::radio`])
//! - the WiFi station and network stack ([`tasks::wifi`])
//! - board configuration from the embedded `board.toml` ([`config`])
//!
//! on top of the host-tested logic in `bunbot-core` and `bunbot-drivers`.

#![no_std]

extern crate alloc;

pub mod board;
pub mod channels;
pub mod config;
pub mod tasks;

pub use board::{now_ms, BoardError};
