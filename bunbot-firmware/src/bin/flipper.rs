//! Flipper board
//!
//! Two mirrored servos swing the flipper arm and a third opens the toast
//! door. The arm alternates between load and throw on every trigger,
//! either from the local button or from the Chef's dispense announcement.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Duration, Ticker, Timer};
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::ledc::channel::Number as ChannelNumber;
use esp_hal::ledc::timer::{Number as TimerNumber, Timer as LedcTimer};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use static_cell::StaticCell;

use bunbot_core::input::EdgeDetector;
use bunbot_core::motion::{mirrored_angles, MotionPlan, HOME, TOAST_DOOR_CLOSED, TOAST_DOOR_OPEN};
use bunbot_core::state::{AnnouncementFilter, FlipperReaction, FlipperState};
use bunbot_core::traits::{AngleServo, ServoError};
use bunbot_drivers::servo::{AngleMapping, PositionalServo};
use bunbot_hal::InputPin;
use bunbot_hal_esp32::{EspInput, LedcServo};
use bunbot_protocol::MacAddress;

use bunbot_firmware::board::{self, halt, BoardError};
use bunbot_firmware::channels::INCOMING;
use bunbot_firmware::config::load_board_config;
use bunbot_firmware::console_println;
use bunbot_firmware::tasks::{self, radio, AckTarget};

esp_bootloader_esp_idf::esp_app_desc!();

/// Button poll period
const POLL_MS: u64 = 10;

/// Door moves at boot, each held this long
const DOOR_SETTLE_MS: u64 = 1000;

type Servo = PositionalServo<LedcServo<'static>>;

static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
static SERVO_TIMER: StaticCell<LedcTimer<'static, LowSpeed>> = StaticCell::new();

/// The flipper arm: left servo mirrored, right servo direct
struct Arm {
    left: Servo,
    right: Servo,
}

impl Arm {
    fn go_to(&mut self, angle: i16) -> Result<(), ServoError> {
        let (left, right) = mirrored_angles(angle);
        self.left.set_angle(left as i16)?;
        self.right.set_angle(right as i16)
    }

    async fn run(&mut self, plan: MotionPlan) {
        debug!("Running plan {} ({} ms)", plan.name, plan.duration_ms());
        for step in plan.steps() {
            if let Some(angle) = step.angle {
                if let Err(e) = self.go_to(angle) {
                    warn!("Arm move to {} failed: {:?}", angle, e);
                }
            }
            Timer::after_millis(u64::from(step.hold_ms)).await;
        }
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 72 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Flipper board starting...");
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

    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let ledc: &'static Ledc<'static> = LEDC.init(ledc);

    let timer = match board::servo_timer(ledc, TimerNumber::Timer0) {
        Ok(t) => SERVO_TIMER.init(t),
        Err(e) => halt(e).await,
    };
    let servos = (
        positional(ledc, timer, ChannelNumber::Channel0, peripherals.GPIO21),
        positional(ledc, timer, ChannelNumber::Channel1, peripherals.GPIO22),
        positional(ledc, timer, ChannelNumber::Channel2, peripherals.GPIO18),
    );
    let (mut arm, mut door) = match servos {
        (Ok(left), Ok(right), Ok(door)) => (Arm { left, right }, door),
        (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => halt(e).await,
    };

    let button = Input::new(
        peripherals.GPIO23,
        InputConfig::default().with_pull(Pull::Up),
    );
    let button = EspInput::new(button);

    // Door open then closed, then bring the arm home
    Timer::after_millis(DOOR_SETTLE_MS).await;
    set_door(&mut door, TOAST_DOOR_OPEN);
    Timer::after_millis(DOOR_SETTLE_MS).await;
    set_door(&mut door, TOAST_DOOR_CLOSED);
    Timer::after_millis(DOOR_SETTLE_MS).await;
    arm.run(HOME).await;

    let master = config.master_mac().unwrap_or(MacAddress::DEFAULT_MASTER);
    match radio::start_esp_now(peripherals.WIFI) {
        Ok(link) => {
            console_println!("MAC Address: {}", link.mac);
            for peer in [MacAddress::BROADCAST, master] {
                if let Err(e) = radio::add_peer(&link.manager, peer) {
                    warn!("Peer {} not added: {:?}", peer, e);
                    console_println!("Failed to add peer");
                }
            }
            let ack = AckTarget {
                sender: link.sender,
                master,
            };
            spawner
                .spawn(tasks::receive_task(link.receiver, Some(ack)))
                .unwrap();
        }
        Err(e) => {
            error!("Error initializing ESP-NOW: {:?}", e);
            console_println!("Error initializing ESP-NOW");
        }
    }

    info!("Flipper ready");

    let mut state = FlipperState::default();
    let mut filter = AnnouncementFilter::new();
    let mut edge = EdgeDetector::new();
    let mut ticker = Ticker::every(Duration::from_millis(POLL_MS));

    loop {
        ticker.next().await;

        let mut trigger = edge.rising(button.is_high());

        if let Some((_, msg)) = INCOMING.try_take() {
            if let Some(announced) = filter.accept_text(msg.text()) {
                console_println!("Received State {}", announced.index());
                match FlipperReaction::for_state(announced) {
                    Some(FlipperReaction::CloseDoor) => set_door(&mut door, TOAST_DOOR_CLOSED),
                    Some(FlipperReaction::OpenDoor) => set_door(&mut door, TOAST_DOOR_OPEN),
                    Some(FlipperReaction::Trigger) => trigger = true,
                    None => {}
                }
            }
        }

        if trigger {
            let (plan, next) = state.trigger();
            info!("Flipper {:?} -> {:?}", state, next);
            arm.run(plan).await;
            state = next;
        }
    }
}

fn positional(
    ledc: &'static Ledc<'static>,
    timer: &'static LedcTimer<'static, LowSpeed>,
    number: ChannelNumber,
    pin: impl PeripheralOutput<'static>,
) -> Result<Servo, BoardError> {
    let out = board::servo_channel(ledc, timer, number, pin)?;
    Ok(PositionalServo::new(out, AngleMapping::Library))
}

fn set_door(door: &mut Servo, angle: i16) {
    if let Err(e) = door.set_angle(angle) {
        warn!("Toast door move failed: {:?}", e);
    }
}
