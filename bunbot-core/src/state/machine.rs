//! Toaster state machine definition
//!
//! Ten states in a fixed loop: the bottom bun runs drop, butter, toast,
//! dispense, then the machine waits for a second press and runs the same
//! steps for the top bun. Each timed state lasts a fixed time.

use super::events::ToastEvent;
use crate::config::SequenceTimings;

/// Toaster states, in wire-index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToastState {
    /// Waiting for a press to start the bottom bun
    #[default]
    BottomDetectButton,
    /// Bottom dropper open
    BottomDrop,
    /// Butter gate open
    BottomButter,
    /// Toast gate open, heater follows the sound gauge in audio mode
    BottomToast,
    /// Pusher dispensing the bottom bun
    BottomDispense,
    /// Waiting for a press to start the top bun
    TopDetectButton,
    /// Top dropper open
    TopDrop,
    /// Butter gate open
    TopButter,
    /// Toast gate open, heater follows the sound gauge in audio mode
    TopToast,
    /// Flipper dispensing the top bun
    TopDispense,
}

/// Which half of the bun a state belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bun {
    Bottom,
    Top,
}

impl ToastState {
    /// All states in wire-index order
    pub const ALL: [ToastState; 10] = [
        ToastState::BottomDetectButton,
        ToastState::BottomDrop,
        ToastState::BottomButter,
        ToastState::BottomToast,
        ToastState::BottomDispense,
        ToastState::TopDetectButton,
        ToastState::TopDrop,
        ToastState::TopButter,
        ToastState::TopToast,
        ToastState::TopDispense,
    ];

    /// Wire index used in announcements
    pub fn index(self) -> u8 {
        self as u8
    }

    /// State for a wire index
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Check if this state waits for a button press
    pub fn is_waiting_for_button(&self) -> bool {
        matches!(self, Self::BottomDetectButton | Self::TopDetectButton)
    }

    /// Check if the heater may follow the sound gauge in this state
    pub fn is_toasting(&self) -> bool {
        matches!(self, Self::BottomToast | Self::TopToast)
    }

    /// Check if this state drops a bun
    pub fn is_drop(&self) -> bool {
        matches!(self, Self::BottomDrop | Self::TopDrop)
    }

    /// Check if this state dispenses a bun
    pub fn is_dispense(&self) -> bool {
        matches!(self, Self::BottomDispense | Self::TopDispense)
    }

    /// Bun half this state works on
    pub fn bun(&self) -> Bun {
        if self.index() < ToastState::TopDetectButton.index() {
            Bun::Bottom
        } else {
            Bun::Top
        }
    }

    /// Fixed wait of a timed state, `None` for the button states
    pub fn wait_ms(&self, timings: &SequenceTimings) -> Option<u32> {
        use ToastState::*;

        match self {
            BottomDetectButton | TopDetectButton => None,
            BottomDrop => Some(timings.bottom.drop_ms),
            BottomButter => Some(timings.bottom.butter_ms),
            BottomToast => Some(timings.bottom.toast_ms),
            BottomDispense => Some(timings.bottom.dispense_ms),
            TopDrop => Some(timings.top.drop_ms),
            TopButter => Some(timings.top.butter_ms),
            TopToast => Some(timings.top.toast_ms),
            TopDispense => Some(timings.top.dispense_ms),
        }
    }

    /// Process an event and return the next state
    ///
    /// Presses only count in the two button states; a press while a timed
    /// state runs is ignored.
    pub fn transition(self, event: ToastEvent) -> Self {
        use ToastEvent::*;
        use ToastState::*;

        match (self, event) {
            // Button states
            (BottomDetectButton, ButtonPressed) => BottomDrop,
            (TopDetectButton, ButtonPressed) => TopDrop,

            // Bottom bun
            (BottomDrop, WaitElapsed) => BottomButter,
            (BottomButter, WaitElapsed) => BottomToast,
            (BottomToast, WaitElapsed) => BottomDispense,
            (BottomDispense, WaitElapsed) => TopDetectButton,

            // Top bun
            (TopDrop, WaitElapsed) => TopButter,
            (TopButter, WaitElapsed) => TopToast,
            (TopToast, WaitElapsed) => TopDispense,
            (TopDispense, WaitElapsed) => BottomDetectButton,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let mut state = ToastState::BottomDetectButton;
        state = state.transition(ToastEvent::ButtonPressed);
        assert_eq!(state, ToastState::BottomDrop);

        for expected in [
            ToastState::BottomButter,
            ToastState::BottomToast,
            ToastState::BottomDispense,
            ToastState::TopDetectButton,
        ] {
            state = state.transition(ToastEvent::WaitElapsed);
            assert_eq!(state, expected);
        }

        state = state.transition(ToastEvent::ButtonPressed);
        assert_eq!(state, ToastState::TopDrop);

        for expected in [
            ToastState::TopButter,
            ToastState::TopToast,
            ToastState::TopDispense,
            ToastState::BottomDetectButton,
        ] {
            state = state.transition(ToastEvent::WaitElapsed);
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn test_press_ignored_while_running() {
        for state in ToastState::ALL {
            if state.is_waiting_for_button() {
                continue;
            }
            assert_eq!(state.transition(ToastEvent::ButtonPressed), state);
        }
    }

    #[test]
    fn test_wait_ignored_in_button_states() {
        assert_eq!(
            ToastState::BottomDetectButton.transition(ToastEvent::WaitElapsed),
            ToastState::BottomDetectButton
        );
        assert_eq!(
            ToastState::TopDetectButton.transition(ToastEvent::WaitElapsed),
            ToastState::TopDetectButton
        );
    }

    #[test]
    fn test_index_matches_order() {
        for (i, state) in ToastState::ALL.iter().enumerate() {
            assert_eq!(state.index() as usize, i);
            assert_eq!(ToastState::from_index(i as u8), Some(*state));
        }
        assert_eq!(ToastState::from_index(10), None);
    }

    #[test]
    fn test_bun_halves() {
        assert_eq!(ToastState::BottomDispense.bun(), Bun::Bottom);
        assert_eq!(ToastState::TopDetectButton.bun(), Bun::Top);
        assert_eq!(ToastState::TopDispense.bun(), Bun::Top);
    }

    #[test]
    fn test_default_wait_times() {
        let timings = SequenceTimings::default();
        assert_eq!(ToastState::BottomDetectButton.wait_ms(&timings), None);
        assert_eq!(ToastState::BottomDrop.wait_ms(&timings), Some(5000));
        assert_eq!(ToastState::BottomButter.wait_ms(&timings), Some(4000));
        assert_eq!(ToastState::TopToast.wait_ms(&timings), Some(7000));
        assert_eq!(ToastState::TopDispense.wait_ms(&timings), Some(3000));
    }
}
