//! Sound meter board
//!
//! The plain sound-reactive strip: the microphone level is averaged, the
//! noise floor cut off, and the rest shown as a green-to-red bar. The
//! console switches the output pin.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Duration, Ticker};
use esp_backtrace as _;
use esp_hal::analog::adc::{Adc, AdcConfig, Attenuation};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::rmt::Rmt;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal_smartled::{smart_led_buffer, SmartLedsAdapter};
use esp_println as _;
use smart_leds::{SmartLedsWrite, RGB8};

use bunbot_drivers::led::{gradient, LinearMeter, MAX_PIXELS};
use bunbot_hal::{AnalogInput, OutputPin};
use bunbot_hal_esp32::{EspAnalog, EspOutput};
use bunbot_protocol::{CommandSet, ConsoleCommand, StartGate};

use bunbot_firmware::board::{self, halt, BoardError};
use bunbot_firmware::channels::COMMANDS;
use bunbot_firmware::config::load_board_config;
use bunbot_firmware::console_println;
use bunbot_firmware::tasks;

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    // board.toml parsing needs a heap
    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Sound meter starting...");
    let config = load_board_config();

    if let Err(e) = board::start_console(
        &spawner,
        peripherals.UART0,
        peripherals.GPIO1,
        peripherals.GPIO3,
        config.console.baud,
    ) {
        halt(e).await;
    }

    let mut out = EspOutput::new(Output::new(
        peripherals.GPIO19,
        Level::Low,
        OutputConfig::default(),
    ));

    let mut adc_config = AdcConfig::new();
    let mic_pin = adc_config.enable_pin(peripherals.GPIO34, Attenuation::_11dB);
    let mut mic = EspAnalog::new(Adc::new(peripherals.ADC1, adc_config), mic_pin);

    let rmt = match Rmt::new(peripherals.RMT, Rate::from_mhz(80)) {
        Ok(rmt) => rmt,
        Err(_) => halt(BoardError::Rmt).await,
    };
    let mut rmt_buffer = smart_led_buffer!(MAX_PIXELS);
    let mut strip = SmartLedsAdapter::new(rmt.channel0, peripherals.GPIO14, &mut rmt_buffer);
    let pixel_count = usize::from(config.sound.pixel_count).clamp(1, MAX_PIXELS);
    let mut pixels = [RGB8::default(); MAX_PIXELS];
    if strip.write(pixels[..pixel_count].iter().copied()).is_err() {
        warn!("NeoPixel clear failed");
    }

    tasks::wait_for_start(StartGate::GO).await;
    console_println!("Starting main loop...");

    let led = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    spawner
        .spawn(tasks::status_task(EspOutput::new(led), config.status, true))
        .unwrap();

    let mut meter = LinearMeter::new();
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(
        config.sound.sample_interval_ms,
    )));

    info!("Sound meter running");

    loop {
        ticker.next().await;

        match mic.read_raw() {
            Ok(raw) => {
                let level = meter.sample(raw);
                console_println!("Sound intensity: {}", level);
            }
            Err(e) => warn!("Sound read failed: {:?}", e),
        }

        let bar = &mut pixels[..pixel_count];
        gradient(meter.step(pixel_count), bar);
        if strip.write(bar.iter().copied()).is_err() {
            warn!("NeoPixel write failed");
        }

        while let Ok(line) = COMMANDS.try_receive() {
            match ConsoleCommand::parse(&line, CommandSet::HEATER) {
                ConsoleCommand::Output(on) => {
                    out.set_state(on);
                    console_println!("OUT_PIN turned {}", if on { "ON" } else { "OFF" });
                }
                _ => console_println!("Unknown command. Use ON or OFF."),
            }
        }
    }
}
