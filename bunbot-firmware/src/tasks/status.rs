//! Status LED and heartbeat task

use defmt::*;
use embassy_time::{Duration, Ticker};

use bunbot_core::config::StatusConfig;
use bunbot_core::timing::{Blinker, Heartbeat};
use bunbot_hal::OutputPin;
use bunbot_hal_esp32::EspOutput;

use crate::board::now_ms;
use crate::channels::HEALTH;
use crate::console_println;

/// Poll interval for the blinker
const STATUS_TICK_MS: u64 = 10;

/// Blinks the status LED; optionally prints the uptime heartbeat
#[embassy_executor::task]
pub async fn status_task(mut led: EspOutput<'static>, config: StatusConfig, heartbeat: bool) {
    info!("Status task started");

    let now = now_ms();
    let mut blinker = Blinker::new(&config, now);
    let mut hello = heartbeat.then(|| Heartbeat::new(&config, now));
    let mut ticker = Ticker::every(Duration::from_millis(STATUS_TICK_MS));

    loop {
        ticker.next().await;
        let now = now_ms();

        if let Some(health) = HEALTH.try_take() {
            info!("Status LED health: {:?}", health);
            blinker.set_health(health);
        }

        if let Some(lit) = blinker.poll(now) {
            led.set_state(lit);
        }

        if let Some(uptime) = hello.as_mut().and_then(|h| h.poll(now)) {
            console_println!("Hello! Time since boot: {} ms", uptime);
        }
    }
}
