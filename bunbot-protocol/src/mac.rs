//! Six-byte station addresses used as ESP-NOW peers.

use core::fmt;
use core::str::FromStr;

/// Errors returned when parsing a textual MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacParseError {
    /// Not six colon-separated groups
    Format,
    /// A group is not two hex digits
    Digit,
}

/// IEEE 802 MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Everyone on the channel
    pub const BROADCAST: Self = Self([0xFF; 6]);

    /// The Chef board the followers were paired with
    pub const DEFAULT_MASTER: Self = Self([0x88, 0x13, 0xBF, 0x0B, 0xC4, 0x58]);

    /// Raw address bytes
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Whether this is the broadcast address
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}", a, b, c, d, e, g)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MacAddress {
    fn format(&self, f: defmt::Formatter) {
        let [a, b, c, d, e, g] = self.0;
        defmt::write!(f, "{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}:{=u8:02X}", a, b, c, d, e, g)
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    /// Parse `AA:BB:CC:DD:EE:FF` (either case)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut groups = s.trim().split(':');

        for byte in bytes.iter_mut() {
            let group = groups.next().ok_or(MacParseError::Format)?;
            if group.len() != 2 {
                return Err(MacParseError::Digit);
            }
            *byte = u8::from_str_radix(group, 16).map_err(|_| MacParseError::Digit)?;
        }

        if groups.next().is_some() {
            return Err(MacParseError::Format);
        }

        Ok(Self(bytes))
    }
}
