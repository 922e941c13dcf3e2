//! Board bring-up helpers
//!
//! Clock, console bring-up, LEDC timer/channel setup and the
//! park-on-failure path shared by every binary.

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Instant, Timer};
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::ledc::channel::{self, ChannelIFace};
use esp_hal::ledc::timer::{self, LSClockSource, TimerIFace};
use esp_hal::ledc::{Ledc, LowSpeed};
use esp_hal::peripherals::{GPIO1, GPIO3, UART0};
use esp_hal::time::Rate;
use esp_hal::uart::{Config as UartConfig, Uart};

use bunbot_core::timing::Health;
use bunbot_hal_esp32::{ledc_duty, LedcPwm, LedcServo, SERVO_FREQUENCY_HZ, SERVO_RESOLUTION_BITS};

use crate::channels::HEALTH;
use crate::tasks;

/// Board initialization failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum BoardError {
    /// UART could not be configured
    Uart,
    /// LEDC timer or channel rejected its configuration
    Ledc,
    /// LEDC resolution not supported by the timer
    Resolution,
    /// RMT peripheral for the NeoPixel strip did not start
    Rmt,
    /// Radio controller or ESP-NOW failed to start
    Radio,
    /// SPI bus could not be configured
    Spi,
}

/// Milliseconds since boot, wrapping like Arduino `millis()`
pub fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

/// Whole seconds since boot
pub fn uptime_secs() -> i32 {
    Instant::now().as_secs() as i32
}

/// Log a fatal init error, switch the status LED to the error blink and
/// stop this task
pub async fn halt(err: BoardError) -> ! {
    error!("Initialization failed: {:?}", err);
    HEALTH.signal(Health::Error);
    loop {
        Timer::after_secs(60).await;
    }
}

/// Configure a low-speed LEDC timer
pub fn pwm_timer(
    ledc: &Ledc<'static>,
    number: timer::Number,
    frequency_hz: u32,
    resolution_bits: u8,
) -> Result<timer::Timer<'static, LowSpeed>, BoardError> {
    let duty = ledc_duty(resolution_bits).ok_or(BoardError::Resolution)?;
    let mut t = ledc.timer::<LowSpeed>(number);
    t.configure(timer::config::Config {
        duty,
        clock_source: LSClockSource::APBClk,
        frequency: Rate::from_hz(frequency_hz),
    })
    .map_err(|_| BoardError::Ledc)?;
    Ok(t)
}

/// Configure a 50 Hz servo timer
pub fn servo_timer(
    ledc: &Ledc<'static>,
    number: timer::Number,
) -> Result<timer::Timer<'static, LowSpeed>, BoardError> {
    pwm_timer(ledc, number, SERVO_FREQUENCY_HZ, SERVO_RESOLUTION_BITS)
}

fn configured_channel(
    ledc: &Ledc<'static>,
    timer: &'static timer::Timer<'static, LowSpeed>,
    number: channel::Number,
    pin: impl PeripheralOutput<'static>,
) -> Result<channel::Channel<'static, LowSpeed>, BoardError> {
    let mut ch = ledc.channel(number, pin);
    ch.configure(channel::config::Config {
        timer,
        duty_pct: 0,
        drive_mode: esp_hal::gpio::DriveMode::PushPull,
    })
    .map_err(|_| BoardError::Ledc)?;
    Ok(ch)
}

/// PWM output on a configured timer, starting at 0% duty
pub fn pwm_channel(
    ledc: &Ledc<'static>,
    timer: &'static timer::Timer<'static, LowSpeed>,
    resolution_bits: u8,
    number: channel::Number,
    pin: impl PeripheralOutput<'static>,
) -> Result<LedcPwm<'static>, BoardError> {
    let ch = configured_channel(ledc, timer, number, pin)?;
    Ok(LedcPwm::new(ch, resolution_bits))
}

/// Servo output on a timer from [`servo_timer`], released until written
pub fn servo_channel(
    ledc: &Ledc<'static>,
    timer: &'static timer::Timer<'static, LowSpeed>,
    number: channel::Number,
    pin: impl PeripheralOutput<'static>,
) -> Result<LedcServo<'static>, BoardError> {
    let ch = configured_channel(ledc, timer, number, pin)?;
    Ok(LedcServo::new(ch, SERVO_RESOLUTION_BITS))
}

/// Open UART0 on the USB bridge pins and spawn the console tasks
pub fn start_console(
    spawner: &Spawner,
    uart: UART0<'static>,
    tx: GPIO1<'static>,
    rx: GPIO3<'static>,
    baud: u32,
) -> Result<(), BoardError> {
    // esp-println also writes its defmt frames to UART0 (the ESP32 has no
    // USB-JTAG port), so binary log frames can land between console lines.
    // Decode with `espflash monitor` to see both.
    let uart = Uart::new(uart, UartConfig::default().with_baudrate(baud))
        .map_err(|_| BoardError::Uart)?
        .with_tx(tx)
        .with_rx(rx)
        .into_async();
    let (rx, tx) = uart.split();

    spawner.spawn(tasks::console_tx_task(tx)).unwrap();
    spawner.spawn(tasks::console_rx_task(rx)).unwrap();
    info!("Console on UART0 at {} baud", baud);
    Ok(())
}
