//! Motorized fader board
//!
//! Swings a motorized fader between two positions every two seconds. The
//! wiper is read on ADC2 and the motor sits on two LEDC channels, one per
//! direction.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Duration, Ticker, Timer};
use esp_backtrace as _;
use esp_hal::analog::adc::{Adc, AdcConfig, Attenuation};
use esp_hal::clock::CpuClock;
use esp_hal::ledc::channel::Number as ChannelNumber;
use esp_hal::ledc::timer::{Number as TimerNumber, Timer as LedcTimer};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use static_cell::StaticCell;

use bunbot_core::traits::{MotorDrive, MotorDriver};
use bunbot_drivers::motor::fader::position_from_adc;
use bunbot_drivers::motor::{DualPwmMotor, FaderConfig, FaderController, FaderReport, TargetOscillator};
use bunbot_hal::AnalogInput;
use bunbot_hal_esp32::EspAnalog;

use bunbot_firmware::board::{self, halt, now_ms};
use bunbot_firmware::config::load_board_config;
use bunbot_firmware::console_println;

esp_bootloader_esp_idf::esp_app_desc!();

/// Motor PWM frequency
const MOTOR_FREQUENCY_HZ: u32 = 100;

/// Motor PWM resolution, matching the 8-bit speeds
const MOTOR_RESOLUTION_BITS: u8 = 8;

/// Control loop period
const CONTROL_TICK_MS: u64 = 5;

static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
static MOTOR_TIMER: StaticCell<LedcTimer<'static, LowSpeed>> = StaticCell::new();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    // board.toml parsing needs a heap
    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Fader board starting...");
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

    Timer::after_secs(1).await;
    console_println!("Motorized Fader - Oscillating Mode");
    console_println!(
        "Oscillating between position {} and {} every {} seconds",
        TargetOscillator::HIGH,
        TargetOscillator::LOW,
        TargetOscillator::PERIOD_MS / 1000
    );

    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let ledc: &'static Ledc<'static> = LEDC.init(ledc);

    let timer = match board::pwm_timer(
        ledc,
        TimerNumber::Timer0,
        MOTOR_FREQUENCY_HZ,
        MOTOR_RESOLUTION_BITS,
    ) {
        Ok(t) => MOTOR_TIMER.init(t),
        Err(e) => halt(e).await,
    };
    let channels = (
        board::pwm_channel(ledc, timer, MOTOR_RESOLUTION_BITS, ChannelNumber::Channel0, peripherals.GPIO32),
        board::pwm_channel(ledc, timer, MOTOR_RESOLUTION_BITS, ChannelNumber::Channel1, peripherals.GPIO33),
    );
    let mut motor = match channels {
        (Ok(a), Ok(b)) => DualPwmMotor::new(a, b),
        (Err(e), _) | (_, Err(e)) => halt(e).await,
    };

    let mut adc_config = AdcConfig::new();
    let wiper_pin = adc_config.enable_pin(peripherals.GPIO26, Attenuation::_11dB);
    let mut wiper = EspAnalog::new(Adc::new(peripherals.ADC2, adc_config), wiper_pin);

    let mut oscillator = TargetOscillator::new(
        TargetOscillator::HIGH,
        TargetOscillator::LOW,
        TargetOscillator::PERIOD_MS,
        now_ms(),
    );
    let mut fader = FaderController::new(FaderConfig::default(), oscillator.current());
    let mut ticker = Ticker::every(Duration::from_millis(CONTROL_TICK_MS));

    info!("Fader running");

    loop {
        ticker.next().await;
        let now = now_ms();

        if let Some(target) = oscillator.poll(now) {
            console_println!("\r\n=== Switching to position {} ===", target);
            fader.set_target(target);
        }

        let position = match wiper.read_raw() {
            Ok(raw) => position_from_adc(raw),
            Err(e) => {
                warn!("Fader read failed: {:?}", e);
                continue;
            }
        };

        let drive = fader.update(position);
        if let Err(e) = motor.drive(drive) {
            warn!("Motor drive failed: {:?}", e);
        }

        match fader.report(position, now) {
            Some(FaderReport::Moving(pos)) => {
                let speed = match drive {
                    MotorDrive::Down(s) | MotorDrive::Up(s) => s,
                    MotorDrive::Stop => 0,
                };
                console_println!("Current position: {} (PWM: {})", pos, speed);
            }
            Some(FaderReport::Stopped(pos)) => {
                console_println!("Current position: {} (STOPPED)", pos);
            }
            None => {}
        }
    }
}
