//! State machines
//!
//! The Chef board owns the toaster state machine. Follower boards (flipper,
//! gates) turn announced toaster states into their own actions.

pub mod events;
pub mod flipper;
pub mod follower;
pub mod gates;
pub mod machine;

pub use events::ToastEvent;
pub use flipper::{FlipperReaction, FlipperState};
pub use follower::AnnouncementFilter;
pub use gates::{Gate, GateAction};
pub use machine::{Bun, ToastState};
