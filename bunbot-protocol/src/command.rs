//! Serial console command grammar.
//!
//! Every board that listens on the console reads one trimmed line at a
//! time. Which commands are recognized depends on the board, so parsing
//! takes a [`CommandSet`].

use heapless::String;

use crate::message::MAX_TEXT_LEN;

/// Highest accepted duty percentage
pub const MAX_PERCENT: i32 = 100;

/// Which console commands a board understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandSet {
    /// `ON` / `OFF` switch a digital output
    pub output_switch: bool,
    /// `A` / `M` select audio or manual PWM mode
    pub modes: bool,
    /// Other short text replaces the outgoing broadcast text
    pub messages: bool,
}

impl CommandSet {
    /// Heater board: output switch and duty
    pub const HEATER: Self = Self {
        output_switch: true,
        modes: false,
        messages: false,
    };

    /// Plain ESP-NOW broadcaster: duty and broadcast text
    pub const BROADCASTER: Self = Self {
        output_switch: false,
        modes: false,
        messages: true,
    };

    /// Chef board: modes, duty and broadcast text
    pub const CHEF: Self = Self {
        output_switch: false,
        modes: true,
        messages: true,
    };
}

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Switch the output pin
    Output(bool),
    /// PWM follows the sound gauge
    AudioMode,
    /// PWM follows `Duty` commands
    ManualMode,
    /// Duty in percent, `0..=100`
    Duty(u8),
    /// New broadcast text
    Message(String<MAX_TEXT_LEN>),
    /// Nothing matched, or text too long
    Unknown,
}

impl ConsoleCommand {
    /// Parse a trimmed console line
    pub fn parse(line: &str, set: CommandSet) -> Self {
        let line = line.trim();

        if set.output_switch {
            if line.eq_ignore_ascii_case("ON") {
                return Self::Output(true);
            }
            if line.eq_ignore_ascii_case("OFF") {
                return Self::Output(false);
            }
        }

        if set.modes {
            if line.eq_ignore_ascii_case("A") {
                return Self::AudioMode;
            }
            if line.eq_ignore_ascii_case("M") {
                return Self::ManualMode;
            }
        }

        if let Some(value) = leading_int(line) {
            if (0..=MAX_PERCENT).contains(&value) {
                return Self::Duty(value as u8);
            }
        }

        if set.messages && line.len() <= MAX_TEXT_LEN {
            let mut text = String::new();
            if text.push_str(line).is_ok() {
                return Self::Message(text);
            }
        }

        Self::Unknown
    }
}

/// Parse leading digits the way Arduino's `String::toInt` does
///
/// Returns `None` when there are no digits to read; `toInt` would return 0
/// there, which is indistinguishable from a real zero.
fn leading_int(s: &str) -> Option<i32> {
    let bytes = s.trim_start().as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let count = digits.iter().take_while(|b| b.is_ascii_digit()).count();
    if count == 0 {
        return None;
    }

    let magnitude = digits[..count].iter().fold(0i32, |acc, &b| {
        acc.wrapping_mul(10).wrapping_add(i32::from(b - b'0'))
    });

    Some(if negative { magnitude.wrapping_neg() } else { magnitude })
}

/// Arduino `String::toInt`: leading integer, or 0 when there is none
pub fn to_int(s: &str) -> i32 {
    leading_int(s).unwrap_or(0)
}

/// Scale a percentage to a raw duty count, like `map(p, 0, 100, 0, max)`
pub fn percent_to_duty(percent: u8, resolution_bits: u8) -> u32 {
    let max = if resolution_bits >= 32 {
        u32::MAX
    } else {
        (1u32 << resolution_bits) - 1
    };
    let percent = u64::from(percent.min(MAX_PERCENT as u8));
    (percent * u64::from(max) / MAX_PERCENT as u64) as u32
}

/// Positional gate presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GatePreset {
    Open,
    Closed,
}

/// Which kind of servo the bench drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BenchMode {
    /// Positional servo: presets or an angle
    Positional,
    /// Continuous rotation servo: direction or bounce
    Continuous,
}

/// Servo bench console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoBenchCommand {
    /// Drive both gates to a preset
    Preset(GatePreset),
    /// Drive to an angle in degrees (range checked by the driver)
    Angle(i32),
    /// Spin right until told otherwise
    Right,
    /// Spin left until told otherwise
    Left,
    /// Hold neutral
    Stop,
    /// Right then left for this many frames each
    Bounce(i32),
    /// Not understood
    Unknown,
}

impl ServoBenchCommand {
    /// Parse a trimmed bench line
    pub fn parse(line: &str, mode: BenchMode) -> Self {
        let line = line.trim();
        let first = line.bytes().next();

        match mode {
            BenchMode::Positional => match first {
                Some(b'a'..=b'z') => match line {
                    "open" => Self::Preset(GatePreset::Open),
                    "close" | "closed" => Self::Preset(GatePreset::Closed),
                    _ => Self::Unknown,
                },
                Some(_) => leading_int(line).map_or(Self::Unknown, Self::Angle),
                None => Self::Unknown,
            },
            BenchMode::Continuous => match first {
                Some(b'r') => Self::Right,
                Some(b'l') => Self::Left,
                Some(b's') => Self::Stop,
                Some(b'1'..=b'9') => Self::Bounce(to_int(line)),
                _ => Self::Unknown,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_int_semantics() {
        assert_eq!(to_int("42"), 42);
        assert_eq!(to_int("  7abc"), 7);
        assert_eq!(to_int("-5"), -5);
        assert_eq!(to_int("+12"), 12);
        assert_eq!(to_int("abc"), 0);
        assert_eq!(to_int(""), 0);
        assert_eq!(to_int("-"), 0);
    }

    #[test]
    fn test_heater_commands() {
        let set = CommandSet::HEATER;
        assert_eq!(ConsoleCommand::parse("on", set), ConsoleCommand::Output(true));
        assert_eq!(ConsoleCommand::parse("OFF", set), ConsoleCommand::Output(false));
        assert_eq!(ConsoleCommand::parse("55", set), ConsoleCommand::Duty(55));
        assert_eq!(ConsoleCommand::parse("0", set), ConsoleCommand::Duty(0));
        assert_eq!(ConsoleCommand::parse("100", set), ConsoleCommand::Duty(100));
        assert_eq!(ConsoleCommand::parse("101", set), ConsoleCommand::Unknown);
        assert_eq!(ConsoleCommand::parse("hello", set), ConsoleCommand::Unknown);
        // Modes are Chef-only
        assert_eq!(ConsoleCommand::parse("A", set), ConsoleCommand::Unknown);
    }

    #[test]
    fn test_chef_commands() {
        let set = CommandSet::CHEF;
        assert_eq!(ConsoleCommand::parse("a", set), ConsoleCommand::AudioMode);
        assert_eq!(ConsoleCommand::parse("M", set), ConsoleCommand::ManualMode);
        assert_eq!(ConsoleCommand::parse("30%", set), ConsoleCommand::Duty(30));
        // ON is not a Chef command, so it becomes broadcast text
        match ConsoleCommand::parse("ON", set) {
            ConsoleCommand::Message(text) => assert_eq!(text.as_str(), "ON"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_message_length_limit() {
        let set = CommandSet::BROADCASTER;
        let fits = [b'x'; MAX_TEXT_LEN];
        let fits = core::str::from_utf8(&fits).unwrap();
        assert!(matches!(ConsoleCommand::parse(fits, set), ConsoleCommand::Message(_)));

        let too_long = [b'x'; MAX_TEXT_LEN + 1];
        let too_long = core::str::from_utf8(&too_long).unwrap();
        assert_eq!(ConsoleCommand::parse(too_long, set), ConsoleCommand::Unknown);
    }

    #[test]
    fn test_out_of_range_number_is_message() {
        match ConsoleCommand::parse("250", CommandSet::BROADCASTER) {
            ConsoleCommand::Message(text) => assert_eq!(text.as_str(), "250"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_percent_to_duty() {
        assert_eq!(percent_to_duty(0, 8), 0);
        assert_eq!(percent_to_duty(50, 8), 127);
        assert_eq!(percent_to_duty(100, 8), 255);
        assert_eq!(percent_to_duty(200, 8), 255);
        assert_eq!(percent_to_duty(100, 10), 1023);
    }

    #[test]
    fn test_bench_positional() {
        let mode = BenchMode::Positional;
        assert_eq!(
            ServoBenchCommand::parse("open", mode),
            ServoBenchCommand::Preset(GatePreset::Open)
        );
        assert_eq!(
            ServoBenchCommand::parse("close", mode),
            ServoBenchCommand::Preset(GatePreset::Closed)
        );
        assert_eq!(ServoBenchCommand::parse("135", mode), ServoBenchCommand::Angle(135));
        assert_eq!(ServoBenchCommand::parse("-10", mode), ServoBenchCommand::Angle(-10));
        assert_eq!(ServoBenchCommand::parse("wobble", mode), ServoBenchCommand::Unknown);
        assert_eq!(ServoBenchCommand::parse("", mode), ServoBenchCommand::Unknown);
    }

    #[test]
    fn test_bench_continuous() {
        let mode = BenchMode::Continuous;
        assert_eq!(ServoBenchCommand::parse("r", mode), ServoBenchCommand::Right);
        assert_eq!(ServoBenchCommand::parse("left", mode), ServoBenchCommand::Left);
        assert_eq!(ServoBenchCommand::parse("s", mode), ServoBenchCommand::Stop);
        assert_eq!(ServoBenchCommand::parse("25", mode), ServoBenchCommand::Bounce(25));
        assert_eq!(ServoBenchCommand::parse("0", mode), ServoBenchCommand::Unknown);
        assert_eq!(ServoBenchCommand::parse("x", mode), ServoBenchCommand::Unknown);
    }
}
