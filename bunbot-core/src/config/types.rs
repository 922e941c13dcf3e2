//! Configuration type definitions
//!
//! Every field has a default equal to the value the demo boards were tuned
//! with, so an empty `board.toml` is a valid configuration.

use heapless::String;

#[cfg(feature = "serde")]
use serde::Deserialize;

/// Maximum length of a textual MAC address (`AA:BB:CC:DD:EE:FF`)
pub const MAC_TEXT_LEN: usize = 17;

/// Wait times for one bun half
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BunTimings {
    /// Wait after opening the dropper
    pub drop_ms: u32,
    /// Wait after opening the butter gate
    pub butter_ms: u32,
    /// Wait after opening the toast gate
    pub toast_ms: u32,
    /// Wait after dispensing
    pub dispense_ms: u32,
}

impl Default for BunTimings {
    fn default() -> Self {
        Self {
            drop_ms: 5000,
            butter_ms: 4000,
            toast_ms: 7000,
            dispense_ms: 3000,
        }
    }
}

/// Toaster sequence timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SequenceTimings {
    /// Bottom bun waits
    pub bottom: BunTimings,
    /// Top bun waits
    pub top: BunTimings,
    /// Time between state announcements while a sequence runs
    pub broadcast_interval_ms: u32,
}

impl Default for SequenceTimings {
    fn default() -> Self {
        Self {
            bottom: BunTimings::default(),
            top: BunTimings::default(),
            broadcast_interval_ms: 500,
        }
    }
}

/// Start button timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ButtonConfig {
    /// Minimum gap between accepted edges
    pub debounce_ms: u32,
    /// Minimum hold time for a press to count
    pub min_press_ms: u32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            min_press_ms: 200,
        }
    }
}

/// Status LED and heartbeat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StatusConfig {
    /// Blink period while healthy
    pub led_good_ms: u32,
    /// Blink period after an initialization failure
    pub led_error_ms: u32,
    /// Heartbeat log period
    pub hello_interval_ms: u32,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            led_good_ms: 1000,
            led_error_ms: 200,
            hello_interval_ms: 10_000,
        }
    }
}

/// PWM resolutions the LEDC timers are set up for
pub const PWM_RESOLUTIONS: [u8; 5] = [8, 10, 12, 13, 14];

/// Heater / motor PWM channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PwmConfig {
    /// Carrier frequency
    pub frequency_hz: u32,
    /// Duty resolution, one of [`PWM_RESOLUTIONS`]
    pub resolution_bits: u8,
    /// Duty at boot, in raw counts
    pub default_duty: u32,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 1000,
            resolution_bits: 8,
            default_duty: 0,
        }
    }
}

/// Sound-reactive strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SoundConfig {
    /// Time between microphone samples
    pub sample_interval_ms: u32,
    /// Number of pixels on the strip
    pub pixel_count: u8,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 10,
            pixel_count: 16,
        }
    }
}

/// ESP-NOW settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RadioConfig {
    /// Time between broadcasts of the outgoing message
    pub broadcast_period_ms: u32,
    /// Address of the Chef board, as `AA:BB:CC:DD:EE:FF`
    pub master_mac: String<MAC_TEXT_LEN>,
}

impl Default for RadioConfig {
    fn default() -> Self {
        let mut master_mac = String::new();
        // Exactly MAC_TEXT_LEN bytes
        let _ = master_mac.push_str("88:13:BF:0B:C4:58");
        Self {
            broadcast_period_ms: 500,
            master_mac,
        }
    }
}

/// Serial console
///
/// Line capacity and queue depth are compile-time constants
/// ([`crate::console::LINE_CAPACITY`] and the firmware print queue), so
/// only the baud rate is configurable and unknown keys are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ConsoleConfig {
    /// UART baud rate
    pub baud: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self { baud: 115_200 }
    }
}

/// Complete board configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoardConfig {
    pub sequence: SequenceTimings,
    pub button: ButtonConfig,
    pub status: StatusConfig,
    pub pwm: PwmConfig,
    pub sound: SoundConfig,
    pub radio: RadioConfig,
    pub console: ConsoleConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuned_values() {
        let config = BoardConfig::default();
        assert_eq!(config.sequence.bottom.drop_ms, 5000);
        assert_eq!(config.sequence.top.toast_ms, 7000);
        assert_eq!(config.sequence.broadcast_interval_ms, 500);
        assert_eq!(config.button.debounce_ms, 100);
        assert_eq!(config.button.min_press_ms, 200);
        assert_eq!(config.status.led_error_ms, 200);
        assert_eq!(config.pwm.resolution_bits, 8);
        assert_eq!(config.sound.pixel_count, 16);
        assert_eq!(config.radio.master_mac.as_str(), "88:13:BF:0B:C4:58");
        assert_eq!(config.console.baud, 115_200);
    }
}
