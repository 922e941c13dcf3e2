//! SD clip player board
//!
//! Plays a random clip from the `AUDIO` directory of an SD card whenever
//! the analog proximity sensor reads high. Clips are raw 8-bit samples at
//! 16 kHz pushed straight into the speaker PWM.

#![no_std]
#![no_main]

use core::fmt::Write as _;

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::{Duration, Ticker};
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_sdmmc::{Mode, SdCard, SdCardError, TimeSource, Timestamp, VolumeIdx, VolumeManager};
use esp_backtrace as _;
use esp_hal::analog::adc::{Adc, AdcConfig, Attenuation};
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::ledc::channel::Number as ChannelNumber;
use esp_hal::ledc::timer::{Number as TimerNumber, Timer as LedcTimer};
use esp_hal::ledc::{LSGlobalClkSource, Ledc, LowSpeed};
use esp_hal::rng::Rng;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use esp_hal::spi::Mode as SpiMode;
use esp_hal::time::Rate;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::Blocking;
use esp_println as _;
use heapless::String;
use static_cell::StaticCell;

use bunbot_drivers::audio::clips::{ClipName, SAMPLE_PERIOD_US};
use bunbot_drivers::audio::{
    CardSession, CardStep, ClipLibrary, PlaybackTrigger, CLIP_DIR, SD_INIT_KHZ,
};
use bunbot_hal::{AnalogInput, PwmOutput};
use bunbot_hal_esp32::{EspAnalog, LedcPwm};

use bunbot_firmware::board::{self, halt, now_ms, BoardError};
use bunbot_firmware::config::load_board_config;
use bunbot_firmware::console_println;

esp_bootloader_esp_idf::esp_app_desc!();

/// Trigger poll period
const POLL_MS: u64 = 10;

/// Speaker PWM carrier, well above the audio band
const SPEAKER_FREQUENCY_HZ: u32 = 40_000;

/// One sample is one 8-bit duty
const SPEAKER_RESOLUTION_BITS: u8 = 8;

/// Bytes read from the card per chunk
const CHUNK_LEN: usize = 512;

type SdSpi = ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, Delay>;
type Volumes = VolumeManager<SdCard<SdSpi, Delay>, BootClock, 4, 4, 1>;
type FsError = embedded_sdmmc::Error<SdCardError>;

static LEDC: StaticCell<Ledc<'static>> = StaticCell::new();
static SPEAKER_TIMER: StaticCell<LedcTimer<'static, LowSpeed>> = StaticCell::new();

/// The board has no RTC; files are never written so any time will do
struct BootClock;

impl TimeSource for BootClock {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    // board.toml parsing needs a heap
    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Sound player starting...");
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
    let timer = match board::pwm_timer(
        ledc,
        TimerNumber::Timer0,
        SPEAKER_FREQUENCY_HZ,
        SPEAKER_RESOLUTION_BITS,
    ) {
        Ok(t) => SPEAKER_TIMER.init(t),
        Err(e) => halt(e).await,
    };
    let speaker = match board::pwm_channel(
        ledc,
        timer,
        SPEAKER_RESOLUTION_BITS,
        ChannelNumber::Channel0,
        peripherals.GPIO25,
    ) {
        Ok(ch) => ch,
        Err(e) => halt(e).await,
    };

    let spi = match Spi::new(peripherals.SPI2, sd_spi_config(SD_INIT_KHZ)) {
        Ok(spi) => spi
            .with_sck(peripherals.GPIO18)
            .with_mosi(peripherals.GPIO23)
            .with_miso(peripherals.GPIO19),
        Err(_) => halt(BoardError::Spi).await,
    };
    let cs = Output::new(peripherals.GPIO5, Level::High, OutputConfig::default());
    let sd_spi = match ExclusiveDevice::new(spi, cs, Delay::new()) {
        Ok(dev) => dev,
        Err(_) => halt(BoardError::Spi).await,
    };
    let card = SdCard::new(sd_spi, Delay::new());

    let mut adc_config = AdcConfig::new();
    let sensor_pin = adc_config.enable_pin(peripherals.GPIO34, Attenuation::_11dB);
    let mut sensor = EspAnalog::new(Adc::new(peripherals.ADC1, adc_config), sensor_pin);

    let mut player = Player {
        volumes: VolumeManager::new(card, BootClock),
        library: ClipLibrary::new(),
        speaker,
        session: CardSession::new(),
    };
    player.prepare();

    let rng = Rng::new();
    let mut trigger = PlaybackTrigger::default();
    let mut ticker = Ticker::every(Duration::from_millis(POLL_MS));

    info!("Sound player running");

    loop {
        ticker.next().await;

        let reading = match sensor.read_raw() {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Sensor read failed: {:?}", e);
                continue;
            }
        };

        if trigger.update(reading, now_ms()) {
            debug!("Triggered at {}", reading);
            if player.prepare() {
                player.play_random(rng.random()).await;
            }
        }
    }
}

fn sd_spi_config(khz: u32) -> SpiConfig {
    SpiConfig::default()
        .with_frequency(Rate::from_khz(khz))
        .with_mode(SpiMode::_0)
}

struct Player {
    volumes: Volumes,
    library: ClipLibrary,
    speaker: LedcPwm<'static>,
    session: CardSession,
}

impl Player {
    /// Get the card ready for a clip; false if it is not usable
    fn prepare(&mut self) -> bool {
        match self.session.next_step() {
            CardStep::Play => true,
            CardStep::Mount => self.mount(),
            CardStep::Reinit => {
                info!("Re-initialising SD card");
                self.volumes.device(|card| card.mark_card_uninit());
                self.mount()
            }
        }
    }

    /// Initialise the card at the slow clock, open the volume, speed the
    /// bus up and scan for clips
    fn mount(&mut self) -> bool {
        self.set_bus_khz(self.session.bus_khz());
        let opened = self.volumes.open_volume(VolumeIdx(0)).map(|_volume| ());
        match opened {
            Ok(()) => {
                self.session.mounted();
                self.set_bus_khz(self.session.bus_khz());
                info!("SD card mounted");
                self.load_clips();
                true
            }
            Err(e) => {
                warn!("SD mount error: {:?}", e);
                console_println!("SD mount failed.");
                self.session.failed();
                false
            }
        }
    }

    fn set_bus_khz(&self, khz: u32) {
        let config = sd_spi_config(khz);
        let applied = self
            .volumes
            .device(|card| card.spi(|dev| dev.bus_mut().apply_config(&config)));
        if applied.is_err() {
            warn!("SPI clock {} kHz rejected", khz);
        }
    }

    /// Rescan the clip directory, returns true if any clip was found
    fn load_clips(&mut self) -> bool {
        self.library.clear();
        match self.scan() {
            Ok(()) => {
                console_println!("Clips found: {}", self.library.len());
                !self.library.is_empty()
            }
            Err(e) => {
                warn!("Clip scan failed: {:?}", e);
                console_println!("Put clips inside /audio on the SD card.");
                false
            }
        }
    }

    fn scan(&mut self) -> Result<(), FsError> {
        let volume = self.volumes.open_volume(VolumeIdx(0))?;
        let root = volume.open_root_dir()?;
        let dir = root.open_dir(CLIP_DIR)?;

        let library = &mut self.library;
        dir.iterate_dir(|entry| {
            if entry.attributes.is_directory() {
                return;
            }
            let mut name: ClipName = String::new();
            if write!(name, "{}", entry.name).is_ok() && library.offer(&name) {
                debug!("Clip {}", name.as_str());
            }
        })
    }

    async fn play_random(&mut self, random: u32) {
        if self.library.is_empty() && !self.load_clips() {
            return;
        }
        let Some(name) = self.library.pick(random).cloned() else {
            return;
        };

        console_println!("Playing: /audio/{}", name.as_str());
        if let Err(e) = self.play(&name).await {
            warn!("Playback of {} failed: {:?}", name.as_str(), e);
            console_println!("Could not open clip.");
            // The card may have been pulled; re-initialise on the next trigger
            self.session.failed();
            self.library.clear();
        }
        if let Err(e) = self.speaker.off() {
            warn!("Speaker off failed: {:?}", e);
        }
    }

    async fn play(&mut self, name: &str) -> Result<(), FsError> {
        let volume = self.volumes.open_volume(VolumeIdx(0))?;
        let root = volume.open_root_dir()?;
        let dir = root.open_dir(CLIP_DIR)?;
        let file = dir.open_file_in_dir(name, Mode::ReadOnly)?;

        let mut chunk = [0u8; CHUNK_LEN];
        let mut ticker = Ticker::every(Duration::from_micros(u64::from(SAMPLE_PERIOD_US)));

        loop {
            let n = file.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            for &sample in &chunk[..n] {
                if self.speaker.set_duty(u32::from(sample)).is_err() {
                    trace!("Speaker duty rejected");
                }
                ticker.next().await;
            }
        }
        Ok(())
    }
}
