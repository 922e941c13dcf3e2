//! Events that trigger toaster state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToastEvent {
    /// A debounced press was registered
    ButtonPressed,
    /// The current state's wait time has passed
    WaitElapsed,
}
