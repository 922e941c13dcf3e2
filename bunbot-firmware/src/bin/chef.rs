//! Chef board
//!
//! Runs the toaster sequence. The start button advances the bottom and top
//! bun halves, every state change is announced over ESP-NOW, and the
//! heater PWM follows either the console or the sound gauge. The sound
//! gauge also drives the NeoPixel bar.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Duration, Ticker};
use esp_backtrace as _;
use esp_hal::analog::adc::{Adc, AdcConfig, Attenuation};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::ledc::channel::Number as ChannelNumber;
use esp_hal::ledc::timer::{Number as TimerNumber, Timer as LedcTimer};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::peripherals::GPIO12;
use esp_hal::rmt::Rmt;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal_smartled::{smart_led_buffer, SmartLedsAdapter};
use esp_println as _;
use smart_leds::{SmartLedsWrite, RGB8};
use static_cell::StaticCell;

use bunbot_core::config::{PwmConfig, SequenceTimings};
use bunbot_core::sequencer::{Sequencer, Transition};
use bunbot_core::timing::Health;
use bunbot_drivers::led::{audio_heater_duty, gradient, PwmSmoother, SoundGauge, MAX_PIXELS};
use bunbot_hal::{AnalogInput, PwmOutput};
use bunbot_hal_esp32::{EspAnalog, EspInput, EspOutput, LedcPwm};
use bunbot_protocol::{
    format_announcement, percent_to_duty, CommandSet, ConsoleCommand, MacAddress, StartGate,
};

use bunbot_firmware::board::{self, halt, now_ms, BoardError};
use bunbot_firmware::channels::{self, HeaterMode, BUTTON_PRESSED, COMMANDS, HEALTH, HEATER_MODE};
use bunbot_firmware::config::load_board_config;
use bunbot_firmware::console_println;
use bunbot_firmware::tasks::{self, radio};

esp_bootloader_esp_idf::esp_app_desc!();

/// FSM loop period
const FSM_TICK_MS: u64 = 20;

static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
static HEATER_TIMER: StaticCell<LedcTimer<'static, LowSpeed>> = StaticCell::new();

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 72 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Chef board starting...");
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

    let led = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    spawner
        .spawn(tasks::status_task(EspOutput::new(led), config.status, true))
        .unwrap();

    let button = Input::new(
        peripherals.GPIO26,
        InputConfig::default().with_pull(Pull::Up),
    );
    spawner
        .spawn(tasks::button_task(EspInput::new(button), config.button))
        .unwrap();

    match radio::start_esp_now(peripherals.WIFI) {
        Ok(link) => {
            console_println!("MAC Address: {}", link.mac);
            if let Err(e) = radio::add_peer(&link.manager, MacAddress::BROADCAST) {
                warn!("Broadcast peer not added: {:?}", e);
            }
            spawner
                .spawn(tasks::broadcast_task(link.sender, config.radio.broadcast_period_ms))
                .unwrap();
            spawner
                .spawn(tasks::receive_task(link.receiver, None))
                .unwrap();
        }
        Err(e) => {
            error!("Error initializing ESP-NOW: {:?}", e);
            console_println!("Error initializing ESP-NOW");
            HEALTH.signal(Health::Error);
        }
    }

    let mut ledc = Ledc::new(peripherals.LEDC);
    ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);
    let ledc = LEDC.init(ledc);
    let mut heater = match heater_pwm(ledc, &config.pwm, peripherals.GPIO12) {
        Ok(pwm) => pwm,
        Err(e) => halt(e).await,
    };

    let mut adc_config = AdcConfig::new();
    let mic_pin = adc_config.enable_pin(peripherals.GPIO34, Attenuation::_11dB);
    let mut mic = EspAnalog::new(Adc::new(peripherals.ADC1, adc_config), mic_pin);

    let rmt = match Rmt::new(peripherals.RMT, Rate::from_mhz(80)) {
        Ok(rmt) => rmt,
        Err(_) => halt(BoardError::Rmt).await,
    };
    let mut rmt_buffer = smart_led_buffer!(MAX_PIXELS);
    let mut strip = SmartLedsAdapter::new(rmt.channel0, peripherals.GPIO14, &mut rmt_buffer);

    tasks::wait_for_start(StartGate::GO).await;
    console_println!("Starting main loop...");
    console_println!("You can enter 'A', 'M', a PWM value (0-100), or a message to send.");

    let initial_duty = to_8bit(config.pwm.default_duty, heater.max_duty());
    spawner
        .spawn(fsm_task(config.sequence, initial_duty))
        .unwrap();

    info!("All tasks spawned, Chef running");

    // Sound gauge, NeoPixel bar and heater PWM
    let pixel_count = usize::from(config.sound.pixel_count).clamp(1, MAX_PIXELS);
    let mut pixels = [RGB8::default(); MAX_PIXELS];
    let mut gauge = SoundGauge::new();
    let mut smoother = PwmSmoother::new();
    let mut mode = HeaterMode::Manual(initial_duty);
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(
        config.sound.sample_interval_ms,
    )));

    loop {
        ticker.next().await;

        if let Some(new_mode) = HEATER_MODE.try_take() {
            debug!("Heater mode {:?}", new_mode);
            mode = new_mode;
        }

        match mic.read_raw() {
            Ok(raw) => gauge.sample(raw),
            Err(e) => warn!("Sound read failed: {:?}", e),
        }

        let bar = &mut pixels[..pixel_count];
        gradient(gauge.step(pixel_count), bar);
        if strip.write(bar.iter().copied()).is_err() {
            warn!("NeoPixel write failed");
        }

        let smoothed = smoother.update(gauge.pwm_target());
        let duty = match mode {
            HeaterMode::Audio => audio_heater_duty(channels::toast_state().is_toasting(), smoothed),
            HeaterMode::Manual(duty) => duty,
        };
        if let Err(e) = heater.set_duty(from_8bit(duty, heater.max_duty())) {
            warn!("Heater PWM update failed: {:?}", e);
        }
    }
}

fn heater_pwm(
    ledc: &'static Ledc<'static>,
    pwm: &PwmConfig,
    pin: GPIO12<'static>,
) -> Result<LedcPwm<'static>, BoardError> {
    let timer = board::pwm_timer(ledc, TimerNumber::Timer0, pwm.frequency_hz, pwm.resolution_bits)?;
    let timer = HEATER_TIMER.init(timer);
    board::pwm_channel(ledc, timer, pwm.resolution_bits, ChannelNumber::Channel0, pin)
}

/// Heater duties travel as 8-bit values whatever the timer resolution
fn to_8bit(raw: u32, max_duty: u32) -> u8 {
    (u64::from(raw.min(max_duty)) * 255 / u64::from(max_duty.max(1))) as u8
}

fn from_8bit(duty: u8, max_duty: u32) -> u32 {
    (u64::from(duty) * u64::from(max_duty) / 255) as u32
}

/// FSM task - button presses, wait timers, announcements and console commands
#[embassy_executor::task]
async fn fsm_task(timings: SequenceTimings, initial_duty: u8) {
    info!("FSM task started");

    let mut sequencer = Sequencer::new(timings);
    let mut mode = HeaterMode::Manual(initial_duty);
    let mut manual_duty = initial_duty;
    let mut ticker = Ticker::every(Duration::from_millis(FSM_TICK_MS));

    loop {
        ticker.next().await;
        let now = now_ms();

        while let Ok(line) = COMMANDS.try_receive() {
            handle_command(&line, &mut mode, &mut manual_duty);
        }

        if BUTTON_PRESSED.try_take().is_some() {
            match sequencer.press(now) {
                Some(t) => report(t),
                None => debug!("Press ignored in {:?}", sequencer.state()),
            }
        }

        if let Some(t) = sequencer.tick(now) {
            report(t);
        }

        if let Some(state) = sequencer.announce_due(now) {
            let text = format_announcement(state.index());
            if !channels::set_outgoing_text(&text) {
                warn!("Announcement does not fit the message");
            }
        }
    }
}

fn report(t: Transition) {
    channels::set_toast_state(t.to);
    info!("{:?} -> {:?}", t.from, t.to);
    console_println!("FSM transitioned to state {} at {} ms", t.to.index(), t.at_ms);
}

fn handle_command(line: &str, mode: &mut HeaterMode, manual_duty: &mut u8) {
    match ConsoleCommand::parse(line, CommandSet::CHEF) {
        ConsoleCommand::AudioMode => {
            *mode = HeaterMode::Audio;
            HEATER_MODE.signal(*mode);
            console_println!("Switched to AUDIO mode (PWM follows sound input).");
        }
        ConsoleCommand::ManualMode => {
            *mode = HeaterMode::Manual(*manual_duty);
            HEATER_MODE.signal(*mode);
            console_println!("Switched to MANUAL mode (PWM set via serial).");
        }
        ConsoleCommand::Duty(percent) if *mode == HeaterMode::Audio => {
            console_println!("Ignoring {}%: PWM follows sound in AUDIO mode. Type 'M' first.", percent);
        }
        ConsoleCommand::Duty(percent) => {
            *manual_duty = percent_to_duty(percent, 8) as u8;
            *mode = HeaterMode::Manual(*manual_duty);
            HEATER_MODE.signal(*mode);
            console_println!("Manual PWM set to {}%", percent);
        }
        ConsoleCommand::Message(text) => {
            if channels::set_outgoing_text(&text) {
                console_println!("Updated message to send: {}", text.as_str());
            }
        }
        ConsoleCommand::Output(_) | ConsoleCommand::Unknown => {
            console_println!(
                "Unknown command or message too long. Use PWM (0-100) or shorter text message."
            );
        }
    }
}
