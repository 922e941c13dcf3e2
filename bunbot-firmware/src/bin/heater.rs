//! Heater bench board
//!
//! A standalone heater driver: the console switches the output pin and
//! sets the heater PWM in percent. The status LED blinks and a heartbeat
//! line is printed while it runs.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::ledc::channel::Number as ChannelNumber;
use esp_hal::ledc::timer::{Number as TimerNumber, Timer as LedcTimer};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use static_cell::StaticCell;

use bunbot_hal::{OutputPin, PwmOutput};
use bunbot_hal_esp32::{EspOutput, LedcPwm};
use bunbot_protocol::{percent_to_duty, CommandSet, ConsoleCommand, StartGate};

use bunbot_firmware::board::{self, halt};
use bunbot_firmware::channels::COMMANDS;
use bunbot_firmware::config::load_board_config;
use bunbot_firmware::console_println;
use bunbot_firmware::tasks;

esp_bootloader_esp_idf::esp_app_desc!();

static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
static HEATER_TIMER: StaticCell<LedcTimer<'static, LowSpeed>> = StaticCell::new();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    // board.toml parsing needs a heap
    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Heater board starting...");
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

    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let ledc: &'static Ledc<'static> = LEDC.init(ledc);

    let pwm = config.pwm;
    let timer = match board::pwm_timer(ledc, TimerNumber::Timer0, pwm.frequency_hz, pwm.resolution_bits) {
        Ok(t) => HEATER_TIMER.init(t),
        Err(e) => halt(e).await,
    };
    let mut heater: LedcPwm<'static> = match board::pwm_channel(
        ledc,
        timer,
        pwm.resolution_bits,
        ChannelNumber::Channel0,
        peripherals.GPIO12,
    ) {
        Ok(ch) => ch,
        Err(e) => halt(e).await,
    };
    if let Err(e) = heater.set_duty(pwm.default_duty) {
        warn!("Default duty {} rejected: {:?}", pwm.default_duty, e);
    }

    tasks::wait_for_start(StartGate::GO).await;
    console_println!("Starting main loop...");
    console_println!("You can enter 'ON', 'OFF', or a PWM value (0–100).");

    let led = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    spawner
        .spawn(tasks::status_task(EspOutput::new(led), config.status, true))
        .unwrap();

    info!("Heater running");

    loop {
        let line = COMMANDS.receive().await;
        match ConsoleCommand::parse(&line, CommandSet::HEATER) {
            ConsoleCommand::Output(on) => {
                out.set_state(on);
                console_println!("OUT_PIN turned {}", if on { "ON" } else { "OFF" });
            }
            ConsoleCommand::Duty(percent) => {
                let duty = percent_to_duty(percent, pwm.resolution_bits);
                match heater.set_duty(duty) {
                    Ok(()) => console_println!("PWM duty cycle set to {}%", percent),
                    Err(e) => warn!("Heater duty {} rejected: {:?}", duty, e),
                }
            }
            _ => console_println!("Unknown command. Use ON, OFF, or a number (0–100)."),
        }
    }
}
