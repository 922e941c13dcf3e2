//! Start button task
//!
//! Replaces the edge interrupt handler: every level change is fed to a
//! [`PressDetector`], and a press held long enough is signalled to the
//! sequencer.

use defmt::*;

use bunbot_core::config::ButtonConfig;
use bunbot_core::input::PressDetector;
use bunbot_hal::InputPin;
use bunbot_hal_esp32::EspInput;

use crate::board::now_ms;
use crate::channels::BUTTON_PRESSED;
use crate::console_println;

/// Button task - debounces an active-low button
#[embassy_executor::task]
pub async fn button_task(mut button: EspInput<'static>, config: ButtonConfig) {
    info!("Button task started");

    let mut detector = PressDetector::new(config);

    loop {
        button.wait_for_any_edge().await;
        let now = now_ms();
        detector.on_edge(button.is_high(), now);

        if detector.take_press() {
            console_println!("Press registered after min time at {} ms", now);
            BUTTON_PRESSED.signal(());
        }
    }
}
