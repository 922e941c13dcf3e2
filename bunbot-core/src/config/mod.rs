//! Configuration types
//!
//! Board-agnostic configuration structures, loaded from TOML when the
//! `toml` feature is enabled.

#[cfg(feature = "toml")]
pub mod loader;
pub mod types;

#[cfg(feature = "toml")]
pub use loader::{parse_board_config, parse_board_config_bytes, ConfigError};
pub use types::*;
