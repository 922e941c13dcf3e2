//! Inter-task communication channels
//!
//! Static embassy-sync primitives shared by the board tasks. The print
//! queue is the only bounded channel; everything else is a latest-value
//! hand-off.

use core::cell::{Cell, RefCell};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use bunbot_core::console::PrintLine;
use bunbot_core::state::ToastState;
use bunbot_core::timing::Health;
use bunbot_protocol::{BroadcastMessage, MacAddress};

/// Console lines waiting for the UART
pub const PRINT_QUEUE_DEPTH: usize = 10;

/// Console input lines waiting for the board logic
pub const COMMAND_QUEUE_DEPTH: usize = 4;

/// Console output queue; producers drop lines when it is full
pub static PRINT_QUEUE: Channel<CriticalSectionRawMutex, PrintLine, PRINT_QUEUE_DEPTH> =
    Channel::new();

/// Trimmed, non-empty lines typed on the console
pub static COMMANDS: Channel<CriticalSectionRawMutex, PrintLine, COMMAND_QUEUE_DEPTH> =
    Channel::new();

/// Message the broadcast task sends every period, `None` until first set
pub static OUTGOING: Mutex<CriticalSectionRawMutex, RefCell<Option<BroadcastMessage>>> =
    Mutex::new(RefCell::new(None));

/// Last message received over ESP-NOW, with its sender
pub static INCOMING: Signal<CriticalSectionRawMutex, (MacAddress, BroadcastMessage)> =
    Signal::new();

/// A debounced start-button press
pub static BUTTON_PRESSED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Current toaster state on the Chef board
pub static TOAST_STATE: Mutex<CriticalSectionRawMutex, Cell<ToastState>> =
    Mutex::new(Cell::new(ToastState::BottomDetectButton));

/// Heater PWM source selected from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum HeaterMode {
    /// PWM follows the sound gauge while toasting
    Audio,
    /// PWM set from the console, raw 8-bit duty
    Manual(u8),
}

/// Heater mode changes for the Chef's sound task
pub static HEATER_MODE: Signal<CriticalSectionRawMutex, HeaterMode> = Signal::new();

/// Status LED health
pub static HEALTH: Signal<CriticalSectionRawMutex, Health> = Signal::new();

/// Replace the outgoing broadcast text
///
/// Returns false if the text does not fit the message.
pub fn set_outgoing_text(text: &str) -> bool {
    OUTGOING.lock(|msg| {
        msg.borrow_mut()
            .get_or_insert_with(BroadcastMessage::default)
            .set_text(text)
            .is_ok()
    })
}

/// Snapshot of the outgoing message
pub fn outgoing() -> BroadcastMessage {
    OUTGOING.lock(|msg| msg.borrow().clone().unwrap_or_default())
}

/// Publish the Chef's current state
pub fn set_toast_state(state: ToastState) {
    TOAST_STATE.lock(|cell| cell.set(state));
}

/// The Chef's current state
pub fn toast_state() -> ToastState {
    TOAST_STATE.lock(|cell| cell.get())
}
