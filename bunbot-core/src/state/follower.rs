//! Announcement filter for follower boards
//!
//! The Chef rebroadcasts its state every 500 ms, so followers see the same
//! state many times. A follower acts once per change.

use bunbot_protocol::parse_announcement;

use super::machine::ToastState;

/// Passes each announced state through once until it changes
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnouncementFilter {
    last: Option<ToastState>,
}

impl AnnouncementFilter {
    /// Create a filter that has not seen any state
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Last accepted state
    pub fn last(&self) -> Option<ToastState> {
        self.last
    }

    /// Offer a received state; returns it if it differs from the last one
    pub fn accept(&mut self, state: ToastState) -> Option<ToastState> {
        if self.last == Some(state) {
            return None;
        }
        self.last = Some(state);
        Some(state)
    }

    /// Offer received broadcast text
    ///
    /// Text that is not a state announcement is ignored and does not count
    /// as a change.
    pub fn accept_text(&mut self, text: &str) -> Option<ToastState> {
        let state = parse_announcement(text).and_then(ToastState::from_index)?;
        self.accept(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeats_suppressed() {
        let mut filter = AnnouncementFilter::new();
        assert_eq!(filter.accept(ToastState::BottomDrop), Some(ToastState::BottomDrop));
        assert_eq!(filter.accept(ToastState::BottomDrop), None);
        assert_eq!(filter.accept(ToastState::BottomButter), Some(ToastState::BottomButter));
        assert_eq!(filter.last(), Some(ToastState::BottomButter));
    }

    #[test]
    fn test_text_announcements() {
        let mut filter = AnnouncementFilter::new();
        assert_eq!(filter.accept_text("FSM STATE 4"), Some(ToastState::BottomDispense));
        assert_eq!(filter.accept_text("FSM STATE 4"), None);
        // Unrelated text does not reset the filter
        assert_eq!(filter.accept_text("Hello ESP-NOW"), None);
        assert_eq!(filter.accept_text("FSM STATE 4"), None);
        assert_eq!(filter.accept_text("FSM STATE 5"), Some(ToastState::TopDetectButton));
    }
}
