//! Servo bench board
//!
//! Drives the gate servos from the console for bench testing. The default
//! build drives the DS positional servos on OUT1/OUT2: type `open`,
//! `close` or an angle. With the `continuous-bench` feature a continuous
//! rotation servo on OUT1 takes `r`, `l`, `s` or a bounce cycle count.
//! With `tower-pro-bench` a TowerPro MG995 on OUT1 takes a number that is
//! sent as a pulse of twice that many microseconds.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Timer;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::ledc::channel::Number as ChannelNumber;
use esp_hal::ledc::timer::{Number as TimerNumber, Timer as LedcTimer};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use static_cell::StaticCell;

use bunbot_hal::OutputPin;
use bunbot_hal_esp32::EspOutput;
use bunbot_protocol::StartGate;

use bunbot_firmware::board::{self, halt};
use bunbot_firmware::config::load_board_config;
use bunbot_firmware::console_println;
use bunbot_firmware::tasks;

esp_bootloader_esp_idf::esp_app_desc!();

#[cfg(all(feature = "continuous-bench", feature = "tower-pro-bench"))]
compile_error!("enable at most one of `continuous-bench` and `tower-pro-bench`");

/// The bench talks at the Arduino IDE default rate
const BENCH_BAUD: u32 = 9600;

static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
static SERVO_TIMER: StaticCell<LedcTimer<'static, LowSpeed>> = StaticCell::new();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    // board.toml parsing needs a heap
    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Servo bench starting...");
    let config = load_board_config();

    if let Err(e) = board::start_console(
        &spawner,
        peripherals.UART0,
        peripherals.GPIO1,
        peripherals.GPIO3,
        BENCH_BAUD,
    ) {
        halt(e).await;
    }
    Timer::after_secs(1).await;

    // One slow blink says the board is alive
    let mut led = EspOutput::new(Output::new(
        peripherals.GPIO2,
        Level::Low,
        OutputConfig::default(),
    ));
    Timer::after_secs(1).await;
    led.set_high();
    Timer::after_secs(1).await;
    spawner
        .spawn(tasks::status_task(led, config.status, false))
        .unwrap();

    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let ledc: &'static Ledc<'static> = LEDC.init(ledc);
    let timer = match board::servo_timer(ledc, TimerNumber::Timer0) {
        Ok(t) => SERVO_TIMER.init(t),
        Err(e) => halt(e).await,
    };

    let out1 = board::servo_channel(ledc, timer, ChannelNumber::Channel0, peripherals.GPIO13);
    #[cfg(not(any(feature = "continuous-bench", feature = "tower-pro-bench")))]
    let out2 = board::servo_channel(ledc, timer, ChannelNumber::Channel1, peripherals.GPIO14);

    tasks::wait_for_start(StartGate::YES).await;
    console_println!("Starting main loop...");

    #[cfg(not(any(feature = "continuous-bench", feature = "tower-pro-bench")))]
    let bench = match (out1, out2) {
        (Ok(a), Ok(b)) => positional::Bench::new(a, b),
        (Err(e), _) | (_, Err(e)) => halt(e).await,
    };
    #[cfg(feature = "continuous-bench")]
    let bench = match out1 {
        Ok(out) => continuous::Bench::new(out),
        Err(e) => halt(e).await,
    };
    #[cfg(feature = "tower-pro-bench")]
    let bench = match out1 {
        Ok(out) => tower_pro::Bench::new(out),
        Err(e) => halt(e).await,
    };

    bench.run().await
}

#[cfg(not(any(feature = "continuous-bench", feature = "tower-pro-bench")))]
mod positional {
    use defmt::*;

    use bunbot_core::traits::AngleServo;
    use bunbot_drivers::servo::{AngleMapping, PositionalServo, BOTTOM_BUN, TOP_BUN};
    use bunbot_hal_esp32::LedcServo;
    use bunbot_protocol::command::{BenchMode, GatePreset};
    use bunbot_protocol::ServoBenchCommand;

    use bunbot_firmware::channels::COMMANDS;
    use bunbot_firmware::console_println;

    type Servo = PositionalServo<LedcServo<'static>>;

    /// DS gate servos: OUT1 holds the top bun, OUT2 the bottom bun
    pub struct Bench {
        top: Servo,
        bottom: Servo,
    }

    impl Bench {
        pub fn new(out1: LedcServo<'static>, out2: LedcServo<'static>) -> Self {
            Self {
                top: PositionalServo::new(out1, AngleMapping::Ds),
                bottom: PositionalServo::new(out2, AngleMapping::Ds),
            }
        }

        pub async fn run(mut self) -> ! {
            loop {
                console_println!("Please enter value from 0 to 180...: ");
                let line = COMMANDS.receive().await;

                match ServoBenchCommand::parse(&line, BenchMode::Positional) {
                    ServoBenchCommand::Preset(preset) => {
                        console_println!("Driving gates to {:?}", preset);
                        let moved = match preset {
                            GatePreset::Open => self
                                .top
                                .open(TOP_BUN)
                                .and_then(|_| self.bottom.open(BOTTOM_BUN)),
                            GatePreset::Closed => self
                                .top
                                .close(TOP_BUN)
                                .and_then(|_| self.bottom.close(BOTTOM_BUN)),
                        };
                        if let Err(e) = moved {
                            warn!("Gate preset {:?} failed: {:?}", preset, e);
                        }
                    }
                    ServoBenchCommand::Angle(degrees) => {
                        console_println!("Driving motor to {} degrees...", degrees);
                        let angle = i16::try_from(degrees).unwrap_or(i16::MAX);
                        if let Err(e) = self.top.set_angle(angle) {
                            warn!("Angle {} rejected: {:?}", degrees, e);
                        }
                    }
                    _ => console_println!("Unknown command: {}", line.as_str()),
                }
            }
        }
    }
}

#[cfg(feature = "continuous-bench")]
mod continuous {
    use defmt::*;
    use embassy_time::Delay;

    use bunbot_core::traits::{ContinuousServo, Spin};
    use bunbot_drivers::servo::ContinuousServoDriver;
    use bunbot_hal_esp32::LedcServo;
    use bunbot_protocol::command::BenchMode;
    use bunbot_protocol::ServoBenchCommand;

    use bunbot_firmware::channels::COMMANDS;
    use bunbot_firmware::console_println;

    /// Continuous rotation servo on OUT1
    pub struct Bench {
        servo: ContinuousServoDriver<LedcServo<'static>>,
    }

    impl Bench {
        pub fn new(out1: LedcServo<'static>) -> Self {
            Self {
                servo: ContinuousServoDriver::new(out1),
            }
        }

        pub async fn run(mut self) -> ! {
            if let Err(e) = self.servo.halt() {
                warn!("Servo halt failed: {:?}", e);
            }

            loop {
                console_println!("Please enter value 'r', 'l', or 's' for right, left, stop...: ");
                console_println!("Or, please enter number for BOUNCE");
                let line = COMMANDS.receive().await;

                let result = match ServoBenchCommand::parse(&line, BenchMode::Continuous) {
                    ServoBenchCommand::Right => {
                        console_println!("Drive motor to RIGHT");
                        self.servo.set_spin(Spin::Right)
                    }
                    ServoBenchCommand::Left => {
                        console_println!("Drive motor to LEFT");
                        self.servo.set_spin(Spin::Left)
                    }
                    ServoBenchCommand::Stop => {
                        console_println!("Drive motor to HALT");
                        self.servo.halt()
                    }
                    ServoBenchCommand::Bounce(cycles) => {
                        console_println!("Bounce motor by {} cycles", cycles);
                        self.servo.bounce(&mut Delay, cycles, 0).await
                    }
                    _ => Ok(()),
                };
                if let Err(e) = result {
                    warn!("Servo command failed: {:?}", e);
                }
            }
        }
    }
}

#[cfg(feature = "tower-pro-bench")]
mod tower_pro {
    use defmt::*;

    use bunbot_core::traits::{ContinuousServo, Spin};
    use bunbot_drivers::servo::TowerPro;
    use bunbot_hal_esp32::LedcServo;
    use bunbot_protocol::command::BenchMode;
    use bunbot_protocol::ServoBenchCommand;

    use bunbot_firmware::channels::COMMANDS;
    use bunbot_firmware::console_println;

    /// TowerPro MG995 on OUT1
    pub struct Bench {
        motor: TowerPro<LedcServo<'static>>,
    }

    impl Bench {
        pub fn new(out1: LedcServo<'static>) -> Self {
            Self {
                motor: TowerPro::new(out1),
            }
        }

        pub async fn run(mut self) -> ! {
            if let Err(e) = self.motor.set_spin(Spin::Halt) {
                warn!("Servo halt failed: {:?}", e);
            }

            loop {
                console_println!("Please enter value from 0 to 180...: ");
                let line = COMMANDS.receive().await;

                match ServoBenchCommand::parse(&line, BenchMode::Positional) {
                    ServoBenchCommand::Angle(value) => {
                        console_println!("Driving motor to {} degrees...", value);
                        match self.motor.drive_bench(value) {
                            Ok(pulse) => debug!("MG995 pulse {} us", pulse),
                            Err(e) => warn!("Pulse for {} rejected: {:?}", value, e),
                        }
                    }
                    _ => console_println!("Unknown command: {}", line.as_str()),
                }
            }
        }
    }
}
