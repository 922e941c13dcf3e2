//! TOML configuration loading
//!
//! Boards embed `board.toml` at build time and parse it at boot. Missing
//! tables and keys fall back to their defaults; anything else that does
//! not parse is an error, and the caller decides whether to fall back to
//! [`BoardConfig::default`].

use bunbot_protocol::MacAddress;

use super::types::{BoardConfig, PWM_RESOLUTIONS};

/// Configuration loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Not valid UTF-8
    InvalidUtf8,
    /// TOML syntax or type error
    TomlParse,
    /// `radio.master_mac` is not a MAC address
    InvalidMac,
    /// A period or interval is zero
    ZeroInterval,
    /// PWM resolution the LEDC timers are not set up for
    InvalidResolution,
}

/// Parse and validate a board configuration
pub fn parse_board_config(text: &str) -> Result<BoardConfig, ConfigError> {
    let config: BoardConfig = toml::from_str(text).map_err(|_| ConfigError::TomlParse)?;
    validate(&config)?;
    Ok(config)
}

/// Parse a configuration from raw bytes
pub fn parse_board_config_bytes(bytes: &[u8]) -> Result<BoardConfig, ConfigError> {
    let text = core::str::from_utf8(bytes).map_err(|_| ConfigError::InvalidUtf8)?;
    parse_board_config(text)
}

fn validate(config: &BoardConfig) -> Result<(), ConfigError> {
    config.master_mac()?;

    let intervals = [
        config.sequence.broadcast_interval_ms,
        config.status.led_good_ms,
        config.status.led_error_ms,
        config.status.hello_interval_ms,
        config.sound.sample_interval_ms,
        config.radio.broadcast_period_ms,
    ];
    if intervals.contains(&0) {
        return Err(ConfigError::ZeroInterval);
    }

    if !PWM_RESOLUTIONS.contains(&config.pwm.resolution_bits) {
        return Err(ConfigError::InvalidResolution);
    }

    Ok(())
}

impl BoardConfig {
    /// Parsed Chef board address
    pub fn master_mac(&self) -> Result<MacAddress, ConfigError> {
        self.radio
            .master_mac
            .parse()
            .map_err(|_| ConfigError::InvalidMac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(parse_board_config("").unwrap(), BoardConfig::default());
    }

    #[test]
    fn test_partial_tables() {
        let config = parse_board_config(
            r#"
            [sequence.bottom]
            toast_ms = 9000

            [button]
            min_press_ms = 300
            "#,
        )
        .unwrap();

        assert_eq!(config.sequence.bottom.toast_ms, 9000);
        assert_eq!(config.sequence.bottom.drop_ms, 5000);
        assert_eq!(config.sequence.top.toast_ms, 7000);
        assert_eq!(config.button.min_press_ms, 300);
        assert_eq!(config.button.debounce_ms, 100);
    }

    #[test]
    fn test_master_mac() {
        let config = parse_board_config(
            r#"
            [radio]
            master_mac = "24:6F:28:AA:BB:CC"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.master_mac().unwrap(),
            MacAddress([0x24, 0x6F, 0x28, 0xAA, 0xBB, 0xCC])
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            parse_board_config("[radio]\nmaster_mac = \"not-a-mac\""),
            Err(ConfigError::InvalidMac)
        );
        assert_eq!(
            parse_board_config("[status]\nled_good_ms = 0"),
            Err(ConfigError::ZeroInterval)
        );
        assert_eq!(
            parse_board_config("[pwm]\nresolution_bits = 0"),
            Err(ConfigError::InvalidResolution)
        );
        assert_eq!(
            parse_board_config("[button]\ndebounce_ms = \"fast\""),
            Err(ConfigError::TomlParse)
        );
    }

    #[test]
    fn test_resolution_matches_ledc_timers() {
        for (text, bits) in [
            ("[pwm]\nresolution_bits = 8", 8),
            ("[pwm]\nresolution_bits = 10", 10),
            ("[pwm]\nresolution_bits = 12", 12),
            ("[pwm]\nresolution_bits = 13", 13),
            ("[pwm]\nresolution_bits = 14", 14),
        ] {
            assert_eq!(parse_board_config(text).unwrap().pwm.resolution_bits, bits);
        }
        for text in [
            "[pwm]\nresolution_bits = 1",
            "[pwm]\nresolution_bits = 9",
            "[pwm]\nresolution_bits = 16",
            "[pwm]\nresolution_bits = 20",
        ] {
            assert_eq!(
                parse_board_config(text),
                Err(ConfigError::InvalidResolution)
            );
        }
    }

    #[test]
    fn test_console_only_takes_baud() {
        let config = parse_board_config("[console]\nbaud = 9600").unwrap();
        assert_eq!(config.console.baud, 9600);

        // Line and queue sizes are fixed at compile time
        assert_eq!(
            parse_board_config("[console]\nqueue_depth = 3"),
            Err(ConfigError::TomlParse)
        );
        assert_eq!(
            parse_board_config("[console]\nline_capacity = 64"),
            Err(ConfigError::TomlParse)
        );
    }

    #[test]
    fn test_invalid_utf8() {
        assert_eq!(
            parse_board_config_bytes(&[0xFF, 0xFE]),
            Err(ConfigError::InvalidUtf8)
        );
    }
}
