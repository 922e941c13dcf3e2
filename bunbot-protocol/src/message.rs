//! Fixed-layout ESP-NOW broadcast message.
//!
//! Layout:
//! - TEXT (32 bytes): UTF-8 text, NUL-terminated and NUL-padded
//! - VALUE (4 bytes): signed 32-bit integer, little-endian
//!
//! The text can hold at most 31 bytes so the terminator always fits.

use core::fmt;

use heapless::String;

/// Bytes reserved for the text field, terminator included
pub const TEXT_CAPACITY: usize = 32;

/// Longest text that fits in the text field
pub const MAX_TEXT_LEN: usize = TEXT_CAPACITY - 1;

/// Total encoded message size
pub const MESSAGE_SIZE: usize = TEXT_CAPACITY + 4;

/// Text the Chef board sends until something else is set
pub const DEFAULT_TEXT: &str = "Hello ESP-NOW";

/// Text followers answer with
pub const ACK_TEXT: &str = "Ack from Slave";

/// Errors that can occur while building or decoding a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Payload is not exactly [`MESSAGE_SIZE`] bytes
    Length,
    /// No NUL byte inside the text field
    Unterminated,
    /// Text bytes are not valid UTF-8
    InvalidText,
    /// Text longer than [`MAX_TEXT_LEN`] bytes
    TextTooLong,
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => write!(f, "message must be {} bytes", MESSAGE_SIZE),
            Self::Unterminated => write!(f, "message text is not NUL-terminated"),
            Self::InvalidText => write!(f, "message text is not valid UTF-8"),
            Self::TextTooLong => write!(f, "message text longer than {} bytes", MAX_TEXT_LEN),
        }
    }
}

/// A decoded or outgoing broadcast message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    text: String<MAX_TEXT_LEN>,
    /// Sender-defined value; the Chef board sends its uptime in seconds
    pub value: i32,
}

impl Default for BroadcastMessage {
    fn default() -> Self {
        let mut text = String::new();
        // DEFAULT_TEXT is shorter than MAX_TEXT_LEN
        let _ = text.push_str(DEFAULT_TEXT);
        Self { text, value: 0 }
    }
}

impl BroadcastMessage {
    /// Create a message, rejecting text that does not fit
    pub fn new(text: &str, value: i32) -> Result<Self, MessageError> {
        let mut owned = String::new();
        owned
            .push_str(text)
            .map_err(|_| MessageError::TextTooLong)?;
        Ok(Self { text: owned, value })
    }

    /// Message text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, keeping the value
    pub fn set_text(&mut self, text: &str) -> Result<(), MessageError> {
        if text.len() > MAX_TEXT_LEN {
            return Err(MessageError::TextTooLong);
        }
        self.text.clear();
        self.text
            .push_str(text)
            .map_err(|_| MessageError::TextTooLong)
    }

    /// Encode into the 36-byte wire layout
    pub fn encode(&self) -> [u8; MESSAGE_SIZE] {
        let mut buffer = [0u8; MESSAGE_SIZE];
        let text = self.text.as_bytes();
        buffer[..text.len()].copy_from_slice(text);
        buffer[TEXT_CAPACITY..].copy_from_slice(&self.value.to_le_bytes());
        buffer
    }

    /// Decode the 36-byte wire layout
    ///
    /// Anything after the first NUL in the text field is ignored, the same
    /// way `strcmp` on the receiving board ignores it.
    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        if bytes.len() != MESSAGE_SIZE {
            return Err(MessageError::Length);
        }

        let text_field = &bytes[..TEXT_CAPACITY];
        let end = text_field
            .iter()
            .position(|&b| b == 0)
            .ok_or(MessageError::Unterminated)?;
        let text = core::str::from_utf8(&text_field[..end]).map_err(|_| MessageError::InvalidText)?;

        let mut value = [0u8; 4];
        value.copy_from_slice(&bytes[TEXT_CAPACITY..]);

        Self::new(text, i32::from_le_bytes(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let msg = BroadcastMessage::new("FSM STATE 3", 42).unwrap();
        let bytes = msg.encode();

        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[..11], b"FSM STATE 3");
        assert!(bytes[11..32].iter().all(|&b| b == 0));
        assert_eq!(&bytes[32..], &[42, 0, 0, 0]);
    }

    #[test]
    fn test_negative_value_little_endian() {
        let bytes = BroadcastMessage::new("x", -2).unwrap().encode();
        assert_eq!(&bytes[32..], &[0xFE, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_decode_roundtrip() {
        let original = BroadcastMessage::new(ACK_TEXT, 1234).unwrap();
        let decoded = BroadcastMessage::decode(&original.encode()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_ignores_bytes_after_terminator() {
        let mut bytes = BroadcastMessage::new("GO", 7).unwrap().encode();
        bytes[10] = b'Z';
        let decoded = BroadcastMessage::decode(&bytes).unwrap();
        assert_eq!(decoded.text(), "GO");
        assert_eq!(decoded.value, 7);
    }

    #[test]
    fn test_decode_wrong_length() {
        assert_eq!(BroadcastMessage::decode(&[0u8; 35]), Err(MessageError::Length));
        assert_eq!(BroadcastMessage::decode(&[0u8; 40]), Err(MessageError::Length));
        assert_eq!(BroadcastMessage::decode(&[]), Err(MessageError::Length));
    }

    #[test]
    fn test_decode_unterminated() {
        let mut bytes = [b'a'; MESSAGE_SIZE];
        bytes[32..].copy_from_slice(&0i32.to_le_bytes());
        assert_eq!(BroadcastMessage::decode(&bytes), Err(MessageError::Unterminated));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut bytes = [0u8; MESSAGE_SIZE];
        bytes[0] = 0xFF;
        bytes[1] = 0xFE;
        assert_eq!(BroadcastMessage::decode(&bytes), Err(MessageError::InvalidText));
    }

    #[test]
    fn test_text_length_limit() {
        let max = [b'a'; MAX_TEXT_LEN];
        let max = core::str::from_utf8(&max).unwrap();
        assert!(BroadcastMessage::new(max, 0).is_ok());

        let too_long = [b'a'; TEXT_CAPACITY];
        let too_long = core::str::from_utf8(&too_long).unwrap();
        assert_eq!(BroadcastMessage::new(too_long, 0), Err(MessageError::TextTooLong));
    }

    #[test]
    fn test_set_text_keeps_old_text_on_error() {
        let mut msg = BroadcastMessage::default();
        assert_eq!(msg.text(), DEFAULT_TEXT);
        let long = [b'b'; 40];
        let long = core::str::from_utf8(&long).unwrap();
        assert_eq!(msg.set_text(long), Err(MessageError::TextTooLong));
        assert_eq!(msg.text(), DEFAULT_TEXT);
        msg.set_text("FSM STATE 1").unwrap();
        assert_eq!(msg.text(), "FSM STATE 1");
    }
}
