//! Front gate follower
//!
//! The gate board drives two continuous-rotation servos. A drop state
//! bounces its gate open and shut; the butter state after it parks the
//! gate at neutral.

use super::machine::ToastState;

/// Frames spent turning each way during a bounce
pub const BOUNCE_FRAMES: i32 = 100;

/// Neutral hold between the two halves of a bounce
pub const BOUNCE_PAUSE_MS: u32 = 1000;

/// Gate servos on the gate board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gate {
    /// Bottom bun gate (OUT1)
    One,
    /// Top bun gate (OUT2)
    Two,
}

/// What the gate board does for an announced toaster state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GateAction {
    /// Right for [`BOUNCE_FRAMES`], neutral for [`BOUNCE_PAUSE_MS`], left again
    Bounce(Gate),
    /// Hold neutral
    Halt(Gate),
}

impl GateAction {
    /// Action for an announced state, if any
    pub fn for_state(state: ToastState) -> Option<Self> {
        match state {
            ToastState::BottomDrop => Some(Self::Bounce(Gate::One)),
            ToastState::BottomButter => Some(Self::Halt(Gate::One)),
            ToastState::TopDrop => Some(Self::Bounce(Gate::Two)),
            ToastState::TopButter => Some(Self::Halt(Gate::Two)),
            _ => None,
        }
    }

    /// Gate this action drives
    pub fn gate(&self) -> Gate {
        match *self {
            Self::Bounce(gate) | Self::Halt(gate) => gate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions() {
        assert_eq!(
            GateAction::for_state(ToastState::BottomDrop),
            Some(GateAction::Bounce(Gate::One))
        );
        assert_eq!(
            GateAction::for_state(ToastState::BottomButter),
            Some(GateAction::Halt(Gate::One))
        );
        assert_eq!(
            GateAction::for_state(ToastState::TopDrop),
            Some(GateAction::Bounce(Gate::Two))
        );
        assert_eq!(
            GateAction::for_state(ToastState::TopButter),
            Some(GateAction::Halt(Gate::Two))
        );
    }

    #[test]
    fn test_other_states_do_nothing() {
        for state in ToastState::ALL {
            let action = GateAction::for_state(state);
            if action.is_none() {
                assert!(!state.is_drop());
            }
        }
        assert_eq!(GateAction::for_state(ToastState::BottomToast), None);
        assert_eq!(GateAction::for_state(ToastState::TopDispense), None);
    }

    #[test]
    fn test_gate_of_action() {
        assert_eq!(GateAction::Bounce(Gate::Two).gate(), Gate::Two);
        assert_eq!(GateAction::Halt(Gate::One).gate(), Gate::One);
    }
}
