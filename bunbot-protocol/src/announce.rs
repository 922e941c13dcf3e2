//! Toaster state announcement text.
//!
//! The Chef board puts `FSM STATE <n>` in the broadcast text, where `<n>`
//! is the decimal wire index of its current toaster state. Followers that
//! cannot parse the text treat the sender as being in an unknown state.

use core::fmt::Write;

use heapless::String;

use crate::message::MAX_TEXT_LEN;

/// Prefix in front of the state index
pub const ANNOUNCE_PREFIX: &str = "FSM STATE ";

/// Number of toaster states (valid indices are `0..STATE_COUNT`)
pub const STATE_COUNT: u8 = 10;

/// Build the announcement text for a state index
pub fn format_announcement(index: u8) -> String<MAX_TEXT_LEN> {
    let mut text = String::new();
    // Prefix plus three digits always fits in 31 bytes
    let _ = write!(text, "{}{}", ANNOUNCE_PREFIX, index);
    text
}

/// Parse an announcement back into a state index
///
/// Returns `None` for any other text or for an index that is out of range.
pub fn parse_announcement(text: &str) -> Option<u8> {
    let digits = text.strip_prefix(ANNOUNCE_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: u8 = digits.parse().ok()?;
    (index < STATE_COUNT).then_some(index)
}
