//! Front gates board
//!
//! Two continuous-rotation servos hold the bun gates. A drop announcement
//! bounces the matching gate open and shut; the butter state after it
//! parks the gate at neutral.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::interconnect::PeripheralOutput;
use esp_hal::ledc::channel::Number as ChannelNumber;
use esp_hal::ledc::timer::{Number as TimerNumber, Timer as LedcTimer};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use static_cell::StaticCell;

use bunbot_core::state::gates::{BOUNCE_FRAMES, BOUNCE_PAUSE_MS};
use bunbot_core::state::{AnnouncementFilter, Gate, GateAction};
use bunbot_core::traits::{ContinuousServo, ServoError};
use bunbot_drivers::servo::ContinuousServoDriver;
use bunbot_hal_esp32::LedcServo;
use bunbot_protocol::MacAddress;

use bunbot_firmware::board::{self, halt, BoardError};
use bunbot_firmware::channels::INCOMING;
use bunbot_firmware::config::load_board_config;
use bunbot_firmware::console_println;
use bunbot_firmware::tasks::{self, radio, AckTarget};

esp_bootloader_esp_idf::esp_app_desc!();

type GateServo = ContinuousServoDriver<LedcServo<'static>>;

static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
static SERVO_TIMER: StaticCell<LedcTimer<'static, LowSpeed>> = StaticCell::new();

struct Gates {
    one: GateServo,
    two: GateServo,
}

impl Gates {
    fn servo(&mut self, gate: Gate) -> &mut GateServo {
        match gate {
            Gate::One => &mut self.one,
            Gate::Two => &mut self.two,
        }
    }

    async fn apply(&mut self, action: GateAction) -> Result<(), ServoError> {
        let servo = self.servo(action.gate());
        match action {
            GateAction::Bounce(_) => servo.bounce(&mut Delay, BOUNCE_FRAMES, BOUNCE_PAUSE_MS).await,
            GateAction::Halt(_) => servo.halt(),
        }
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 72 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Gates board starting...");
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
    let mut gates = match (
        continuous(ledc, timer, ChannelNumber::Channel0, peripherals.GPIO13),
        continuous(ledc, timer, ChannelNumber::Channel1, peripherals.GPIO14),
    ) {
        (Ok(one), Ok(two)) => Gates { one, two },
        (Err(e), _) | (_, Err(e)) => halt(e).await,
    };

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

    console_println!("Waiting for FSM states from master...");

    let mut filter = AnnouncementFilter::new();

    loop {
        let (_, msg) = INCOMING.wait().await;
        let Some(state) = filter.accept_text(msg.text()) else {
            continue;
        };
        console_println!("Received State {}", state.index());

        if let Some(action) = GateAction::for_state(state) {
            info!("Gate action {:?}", action);
            if let Err(e) = gates.apply(action).await {
                warn!("Gate {:?} failed: {:?}", action.gate(), e);
            }
        }
    }
}

fn continuous(
    ledc: &'static Ledc<'static>,
    timer: &'static LedcTimer<'static, LowSpeed>,
    number: ChannelNumber,
    pin: impl PeripheralOutput<'static>,
) -> Result<GateServo, BoardError> {
    let out = board::servo_channel(ledc, timer, number, pin)?;
    Ok(ContinuousServoDriver::new(out))
}
