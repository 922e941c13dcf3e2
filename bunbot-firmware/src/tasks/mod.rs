//! Embassy tasks shared by the board binaries
//!
//! Board-specific loops live next to their `main` in `src/bin`.

pub mod button;
pub mod console;
pub mod radio;
pub mod status;
pub mod wifi;

pub use button::button_task;
pub use console::{console_rx_task, console_tx_task, wait_for_start};
pub use radio::{broadcast_task, receive_task, AckTarget};
pub use status::status_task;
pub use wifi::{start_wifi, wait_for_address, Credentials};
