//! Flipper state machine
//!
//! Each trigger alternates between lowering the arm (load) and throwing
//! the bun (throw). The flipper board also drives the toast door, and
//! reacts to the Chef's announced state.

use super::machine::ToastState;
use crate::motion::{MotionPlan, LOAD, THROW};

/// Flipper arm states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlipperState {
    /// Arm raised, ready to load
    #[default]
    Idle,
    /// Arm lowered with a bun in it
    Loaded,
}

impl FlipperState {
    /// Handle a trigger: the plan to run and the state after it
    pub fn trigger(self) -> (MotionPlan, FlipperState) {
        match self {
            FlipperState::Idle => (LOAD, FlipperState::Loaded),
            FlipperState::Loaded => (THROW, FlipperState::Idle),
        }
    }
}

/// What the flipper board does for an announced toaster state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlipperReaction {
    /// Close the toast door
    CloseDoor,
    /// Open the toast door
    OpenDoor,
    /// Run the next flipper plan
    Trigger,
}

impl FlipperReaction {
    /// Reaction to an announced state, if any
    pub fn for_state(state: ToastState) -> Option<Self> {
        if state.is_drop() {
            Some(Self::CloseDoor)
        } else if state.is_toasting() {
            Some(Self::OpenDoor)
        } else if state.is_dispense() {
            Some(Self::Trigger)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_alternates() {
        let (plan, state) = FlipperState::Idle.trigger();
        assert_eq!(plan.name, "load");
        assert_eq!(state, FlipperState::Loaded);

        let (plan, state) = state.trigger();
        assert_eq!(plan.name, "throw");
        assert_eq!(state, FlipperState::Idle);
    }

    #[test]
    fn test_reactions() {
        use ToastState::*;

        assert_eq!(FlipperReaction::for_state(BottomDrop), Some(FlipperReaction::CloseDoor));
        assert_eq!(FlipperReaction::for_state(TopDrop), Some(FlipperReaction::CloseDoor));
        assert_eq!(FlipperReaction::for_state(BottomToast), Some(FlipperReaction::OpenDoor));
        assert_eq!(FlipperReaction::for_state(TopToast), Some(FlipperReaction::OpenDoor));
        assert_eq!(FlipperReaction::for_state(BottomDispense), Some(FlipperReaction::Trigger));
        assert_eq!(FlipperReaction::for_state(TopDispense), Some(FlipperReaction::Trigger));
        assert_eq!(FlipperReaction::for_state(BottomButter), None);
        assert_eq!(FlipperReaction::for_state(TopDetectButton), None);
    }
}
