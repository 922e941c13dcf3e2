//! Toaster sequencer
//!
//! Drives [`ToastState`] with a millisecond clock supplied by the caller.
//! The clock is a wrapping `u32` (the same shape as Arduino `millis()`),
//! so every comparison uses wrapping subtraction.

use crate::config::SequenceTimings;
use crate::state::{ToastEvent, ToastState};

/// A state change caused by [`Sequencer::press`] or [`Sequencer::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: ToastState,
    pub to: ToastState,
    /// Clock value at which the new state was entered
    pub at_ms: u32,
}

/// Timed toaster sequence
#[derive(Debug, Clone)]
pub struct Sequencer {
    timings: SequenceTimings,
    state: ToastState,
    entered_ms: u32,
    last_announce_ms: Option<u32>,
    announce_pending: bool,
}

impl Sequencer {
    /// Create a sequencer waiting for the first press
    pub fn new(timings: SequenceTimings) -> Self {
        Self {
            timings,
            state: ToastState::BottomDetectButton,
            entered_ms: 0,
            last_announce_ms: None,
            announce_pending: false,
        }
    }

    /// Current state
    pub fn state(&self) -> ToastState {
        self.state
    }

    /// Clock value at which the current state was entered
    pub fn entered_ms(&self) -> u32 {
        self.entered_ms
    }

    /// Check if a sequence is running (any timed state)
    pub fn is_active(&self) -> bool {
        !self.state.is_waiting_for_button()
    }

    /// Time left in the current state, `None` for the button states
    pub fn remaining_ms(&self, now_ms: u32) -> Option<u32> {
        let wait = self.state.wait_ms(&self.timings)?;
        Some(wait.saturating_sub(now_ms.wrapping_sub(self.entered_ms)))
    }

    /// Feed a registered button press
    ///
    /// Returns the transition if the press started a bun; presses while a
    /// sequence runs change nothing.
    pub fn press(&mut self, now_ms: u32) -> Option<Transition> {
        self.apply(ToastEvent::ButtonPressed, now_ms)
    }

    /// Advance the timer
    ///
    /// Fires at most one transition per call.
    pub fn tick(&mut self, now_ms: u32) -> Option<Transition> {
        let wait = self.state.wait_ms(&self.timings)?;
        if now_ms.wrapping_sub(self.entered_ms) >= wait {
            self.apply(ToastEvent::WaitElapsed, now_ms)
        } else {
            None
        }
    }

    /// State to announce now, if an announcement is due
    ///
    /// A state change is announced on the next call. While a sequence runs
    /// the state is also repeated every `broadcast_interval_ms`, so a
    /// follower that missed a packet catches up.
    pub fn announce_due(&mut self, now_ms: u32) -> Option<ToastState> {
        let interval_elapsed = match self.last_announce_ms {
            Some(last) => now_ms.wrapping_sub(last) >= self.timings.broadcast_interval_ms,
            None => true,
        };

        if self.announce_pending || (self.is_active() && interval_elapsed) {
            self.announce_pending = false;
            self.last_announce_ms = Some(now_ms);
            Some(self.state)
        } else {
            None
        }
    }

    fn apply(&mut self, event: ToastEvent, now_ms: u32) -> Option<Transition> {
        let from = self.state;
        let to = from.transition(event);
        if to == from {
            return None;
        }

        self.state = to;
        self.entered_ms = now_ms;
        self.announce_pending = true;

        Some(Transition {
            from,
            to,
            at_ms: now_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequencer() -> Sequencer {
        Sequencer::new(SequenceTimings::default())
    }

    #[test]
    fn test_idle_until_press() {
        let mut seq = sequencer();
        assert_eq!(seq.tick(100_000), None);
        assert!(!seq.is_active());
        assert_eq!(seq.remaining_ms(0), None);
    }

    #[test]
    fn test_press_starts_bottom_bun() {
        let mut seq = sequencer();
        let t = seq.press(1000).unwrap();
        assert_eq!(t.from, ToastState::BottomDetectButton);
        assert_eq!(t.to, ToastState::BottomDrop);
        assert_eq!(t.at_ms, 1000);
        assert!(seq.is_active());
        assert_eq!(seq.remaining_ms(3000), Some(3000));
    }

    #[test]
    fn test_press_ignored_mid_sequence() {
        let mut seq = sequencer();
        seq.press(0);
        assert_eq!(seq.press(2000), None);
        assert_eq!(seq.state(), ToastState::BottomDrop);
        // Timer was not re-armed by the ignored press
        assert_eq!(seq.entered_ms(), 0);
    }

    #[test]
    fn test_waits_exact_duration() {
        let mut seq = sequencer();
        seq.press(0);
        assert_eq!(seq.tick(4999), None);
        let t = seq.tick(5000).unwrap();
        assert_eq!(t.to, ToastState::BottomButter);
        assert_eq!(seq.entered_ms(), 5000);
    }

    #[test]
    fn test_full_run_reaches_top_button() {
        let mut seq = sequencer();
        seq.press(0);
        let mut now = 0;
        for wait in [5000, 4000, 7000, 3000] {
            now += wait;
            assert!(seq.tick(now).is_some());
        }
        assert_eq!(seq.state(), ToastState::TopDetectButton);
        assert!(!seq.is_active());

        // Stays there without a press
        assert_eq!(seq.tick(now + 60_000), None);
        assert_eq!(seq.press(now + 60_000).unwrap().to, ToastState::TopDrop);
    }

    #[test]
    fn test_one_transition_per_tick() {
        let mut seq = sequencer();
        seq.press(0);
        // Long after both drop and butter waits
        assert_eq!(seq.tick(20_000).unwrap().to, ToastState::BottomButter);
        assert_eq!(seq.tick(20_000), None);
    }

    #[test]
    fn test_clock_wraparound() {
        let mut seq = sequencer();
        let start = u32::MAX - 1000;
        seq.press(start);
        assert_eq!(seq.tick(start.wrapping_add(4999)), None);
        assert_eq!(
            seq.tick(start.wrapping_add(5000)).unwrap().to,
            ToastState::BottomButter
        );
    }

    #[test]
    fn test_announce_interval() {
        let mut seq = sequencer();
        // Idle: nothing to announce
        assert_eq!(seq.announce_due(0), None);

        seq.press(100);
        // Change is announced immediately
        assert_eq!(seq.announce_due(100), Some(ToastState::BottomDrop));
        assert_eq!(seq.announce_due(300), None);
        assert_eq!(seq.announce_due(600), Some(ToastState::BottomDrop));
        assert_eq!(seq.announce_due(1000), None);
        assert_eq!(seq.announce_due(1100), Some(ToastState::BottomDrop));
    }

    #[test]
    fn test_return_to_button_state_is_announced_once() {
        let mut seq = sequencer();
        seq.press(0);
        let mut now = 0;
        for wait in [5000, 4000, 7000, 3000] {
            now += wait;
            seq.tick(now);
        }
        assert_eq!(seq.announce_due(now), Some(ToastState::TopDetectButton));
        assert_eq!(seq.announce_due(now + 500), None);
        assert_eq!(seq.announce_due(now + 5000), None);
    }
}
