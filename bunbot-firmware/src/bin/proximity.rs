//! Proximity trigger board
//!
//! An HC-SR04 ultrasonic sensor watches the counter. When something comes
//! closer than 20 cm the board sends `GET /trigger` to the taunt server
//! over WiFi; a cooldown keeps it from firing twice in a row.

#![no_std]
#![no_main]

extern crate alloc;

use core::net::Ipv4Addr;

use defmt::*;
use embassy_executor::Spawner;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, Stack};
use embassy_time::{with_timeout, Duration, Instant, Ticker, Timer};
use embedded_io_async::Write;
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull};
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;

use bunbot_drivers::sensor::ultrasonic::{ECHO_TIMEOUT_US, NEAR_CM};
use bunbot_drivers::sensor::{echo_to_cm, is_near, ProximityTrigger, TriggerDecision};
use bunbot_protocol::http::DEFAULT_PORT;
use bunbot_protocol::{StatusLine, TriggerRequest};

use bunbot_firmware::board::{halt, now_ms};
use bunbot_firmware::config::{self, load_board_config};
use bunbot_firmware::tasks::{self, Credentials};
use bunbot_firmware::{board, console_println};

esp_bootloader_esp_idf::esp_app_desc!();

/// Sensor poll period
const POLL_MS: u64 = 50;

/// How long to wait for the server's reply
const RESPONSE_TIMEOUT_SECS: u64 = 5;

/// Largest response kept for printing
const RESPONSE_BUF_LEN: usize = 512;

/// Blinks after a successful trigger
const SUCCESS_BLINKS: usize = 3;

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 72 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Proximity board starting...");
    let board_config = load_board_config();

    if let Err(e) = board::start_console(
        &spawner,
        peripherals.UART0,
        peripherals.GPIO1,
        peripherals.GPIO3,
        board_config.console.baud,
    ) {
        halt(e).await;
    }

    console_println!("=== ESP32 - Proximity Trigger ===");

    let mut sensor = Ultrasonic {
        trig: Output::new(peripherals.GPIO5, Level::Low, OutputConfig::default()),
        echo: Input::new(peripherals.GPIO18, InputConfig::default().with_pull(Pull::None)),
    };
    console_println!("Ultrasonic sensor initialized - Trig: Pin 5, Echo: Pin 18");
    console_println!("Distance threshold: {} cm", NEAR_CM);

    let mut led = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    console_println!("LED indicator initialized");

    let credentials = Credentials {
        ssid: config::WIFI_SSID,
        password: config::WIFI_PASSWORD,
    };
    if credentials.ssid.is_empty() {
        warn!("BUNBOT_WIFI_SSID was empty at build time");
    }
    let stack = match tasks::start_wifi(&spawner, peripherals.WIFI, credentials) {
        Ok(stack) => stack,
        Err(e) => {
            console_println!("ERROR: Communication with WiFi module failed!");
            halt(e).await
        }
    };
    tasks::wait_for_address(stack, credentials.ssid).await;

    let server = Server {
        host: config::TRIGGER_HOST,
        port: config::TRIGGER_PORT.parse().unwrap_or(DEFAULT_PORT),
    };

    let mut trigger = ProximityTrigger::default();
    let mut ticker = Ticker::every(Duration::from_millis(POLL_MS));

    info!("Proximity trigger running");

    loop {
        ticker.next().await;

        let cm = sensor.measure_cm().await;
        match trigger.update(is_near(cm), now_ms()) {
            TriggerDecision::Fire => {
                console_println!("");
                console_println!(">>> PROXIMITY DETECTED! <<<");
                led.set_high();
                let ok = server.send_trigger(stack).await;
                if ok {
                    for _ in 0..SUCCESS_BLINKS {
                        led.set_low();
                        Timer::after_millis(100).await;
                        led.set_high();
                        Timer::after_millis(100).await;
                    }
                }
                led.set_low();
            }
            TriggerDecision::CooledDown => console_println!("Trigger ignored (cooldown active)"),
            TriggerDecision::None => {}
        }
    }
}

/// HC-SR04 on a trigger and an echo pin
struct Ultrasonic {
    trig: Output<'static>,
    echo: Input<'static>,
}

impl Ultrasonic {
    /// Distance in cm, or 0 when no echo came back in time
    async fn measure_cm(&mut self) -> u32 {
        let delay = Delay::new();
        self.trig.set_low();
        delay.delay_micros(2);
        self.trig.set_high();
        delay.delay_micros(10);
        self.trig.set_low();

        let timeout = Duration::from_micros(u64::from(ECHO_TIMEOUT_US));
        if with_timeout(timeout, self.echo.wait_for_high()).await.is_err() {
            return 0;
        }
        let start = Instant::now();
        if with_timeout(timeout, self.echo.wait_for_low()).await.is_err() {
            return 0;
        }
        let echo_us = start.elapsed().as_micros().min(u64::from(u32::MAX)) as u32;
        echo_to_cm(echo_us)
    }
}

/// The taunt server
struct Server {
    host: &'static str,
    port: u16,
}

impl Server {
    async fn resolve(&self, stack: Stack<'static>) -> Option<IpAddress> {
        if let Ok(ip) = self.host.parse::<Ipv4Addr>() {
            return Some(IpAddress::Ipv4(ip));
        }
        match stack.dns_query(self.host, DnsQueryType::A).await {
            Ok(addrs) => addrs.first().copied(),
            Err(e) => {
                warn!("DNS lookup of {} failed: {:?}", self.host, e);
                None
            }
        }
    }

    /// Send one trigger request; true when the server answered 2xx
    async fn send_trigger(&self, stack: Stack<'static>) -> bool {
        console_println!("========================================");
        console_println!(">>> SENDING TRIGGER REQUEST <<<");
        console_println!("========================================");

        if !stack.is_config_up() {
            console_println!("WiFi Status: NOT CONNECTED!");
            return false;
        }
        console_println!("WiFi Status: CONNECTED");
        if let Some(config) = stack.config_v4() {
            console_println!("Local IP: {}", config.address.address());
        }

        let request = TriggerRequest::new(self.host);
        console_println!("Target Server: {}:{}", self.host, self.port);
        console_println!("Endpoint: {}", request.path);
        console_println!("Attempting TCP connection to {}:{}...", self.host, self.port);

        let Some(address) = self.resolve(stack).await else {
            self.print_connect_help();
            return false;
        };

        let mut rx_buffer = [0u8; 1024];
        let mut tx_buffer = [0u8; 512];
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(RESPONSE_TIMEOUT_SECS)));

        if let Err(e) = socket.connect((address, self.port)).await {
            warn!("TCP connect failed: {:?}", e);
            self.print_connect_help();
            return false;
        }
        console_println!("TCP connection established!");

        let request = match request.render() {
            Ok(text) => text,
            Err(e) => {
                error!("Request does not fit: {:?}", e);
                socket.close();
                return false;
            }
        };
        if let Err(e) = socket.write_all(request.as_bytes()).await {
            warn!("Request write failed: {:?}", e);
            socket.close();
            return false;
        }
        console_println!("Request sent!");

        let mut response = [0u8; RESPONSE_BUF_LEN];
        let mut len = 0;
        while len < response.len() {
            match socket.read(&mut response[len..]).await {
                Ok(0) => break,
                Ok(n) => len += n,
                Err(e) => {
                    debug!("Response read ended: {:?}", e);
                    break;
                }
            }
        }
        socket.close();

        if len == 0 {
            console_println!(">>> Timeout waiting for response!");
            return false;
        }

        console_println!("");
        console_println!("--- Server Response ---");
        if let Ok(text) = core::str::from_utf8(&response[..len]) {
            for line in text.lines() {
                console_println!("{}", line);
            }
        }
        console_println!("-----------------------");
        console_println!("Connection closed.");

        match StatusLine::parse(&response[..len]) {
            Ok(status) => {
                info!("Trigger answered {}", status.code);
                status.is_success()
            }
            Err(e) => {
                warn!("Bad status line: {:?}", e);
                false
            }
        }
    }

    fn print_connect_help(&self) {
        console_println!("ERROR: Failed to connect to server!");
        console_println!("Check that:");
        console_println!("  1. Server is running on the computer");
        console_println!("  2. BUNBOT_TRIGGER_HOST address is correct");
        console_println!("  3. BUNBOT_TRIGGER_PORT matches the server configuration");
        console_println!("  4. Firewall allows incoming connections");
    }
}
