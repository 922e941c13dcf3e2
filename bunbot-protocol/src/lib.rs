//! bunbot wire formats
//!
//! This crate defines everything the demo boards put on a wire: the
//! ESP-NOW broadcast that the Chef board uses to announce its toaster
//! state, the line-based serial console, and the single HTTP request the
//! proximity board sends.
//!
//! # Broadcast message
//!
//! Every ESP-NOW frame carries the same fixed 36-byte payload, laid out
//! like the ESP32 C struct `{ char msg[32]; int value; }`:
//! ```text
//! ┌──────────────────────────────┬──────────┐
//! │ TEXT (NUL-terminated/padded) │ VALUE    │
//! │ 32B                          │ 4B i32LE │
//! └──────────────────────────────┴──────────┘
//! ```
//!
//! There is no versioning, checksum, acknowledgment or retry. The Chef
//! board rebroadcasts its current state every 500 ms instead, and
//! followers react once per state change.

#![no_std]
#![deny(unsafe_code)]

pub mod announce;
pub mod command;
pub mod http;
pub mod line;
pub mod mac;
pub mod message;

pub use announce::{format_announcement, parse_announcement, STATE_COUNT};
pub use command::{
    percent_to_duty, to_int, BenchMode, CommandSet, ConsoleCommand, GatePreset, ServoBenchCommand,
};
pub use http::{HttpError, StatusLine, TriggerRequest};
pub use line::{GateOutcome, LineBuffer, StartGate};
pub use mac::{MacAddress, MacParseError};
pub use message::{BroadcastMessage, MessageError, MAX_TEXT_LEN, MESSAGE_SIZE, TEXT_CAPACITY};
