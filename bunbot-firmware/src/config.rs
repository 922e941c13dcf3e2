//! Board configuration
//!
//! `board.toml` is compiled into every binary (and checked by `build.rs`).
//! It is parsed once at boot; a broken file falls back to the tuned
//! defaults so the board still runs.

use defmt::*;

use bunbot_core::config::{parse_board_config, BoardConfig};

/// Embedded board configuration, edit `board.toml` and rebuild to change it
const EMBEDDED_CONFIG: &str = include_str!("../board.toml");

/// WiFi network for the proximity board, from `.env` at build time
pub const WIFI_SSID: &str = env!("BUNBOT_WIFI_SSID");

/// WiFi password for the proximity board
pub const WIFI_PASSWORD: &str = env!("BUNBOT_WIFI_PASSWORD");

/// Host that receives `GET /trigger`
pub const TRIGGER_HOST: &str = env!("BUNBOT_TRIGGER_HOST");

/// Port of the trigger server
pub const TRIGGER_PORT: &str = env!("BUNBOT_TRIGGER_PORT");

/// Parse the embedded configuration, falling back to defaults
pub fn load_board_config() -> BoardConfig {
    match parse_board_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using default configuration");
            BoardConfig::default()
        }
    }
}
