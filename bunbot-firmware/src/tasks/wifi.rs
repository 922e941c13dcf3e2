//! WiFi station and network stack
//!
//! The connection task keeps the station associated, retrying every
//! [`WIFI_RETRY_SECS`] seconds; the net task runs the embassy-net stack
//! with DHCP.

use alloc::string::String;

use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Runner, Stack, StackResources};
use embassy_time::Timer;
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_radio::wifi::{
    ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState,
};
use esp_radio::Controller;
use static_cell::StaticCell;

use crate::board::BoardError;
use crate::console_println;

/// Delay between association attempts
pub const WIFI_RETRY_SECS: u64 = 10;

/// Sockets the stack can hold
const SOCKET_COUNT: usize = 3;

static RADIO: StaticCell<Controller<'static>> = StaticCell::new();
static RESOURCES: StaticCell<StackResources<SOCKET_COUNT>> = StaticCell::new();

/// Station credentials
#[derive(Clone, Copy)]
pub struct Credentials {
    pub ssid: &'static str,
    pub password: &'static str,
}

/// Bring up the radio in station mode, spawn the connection and net
/// tasks, and return the stack
pub fn start_wifi(
    spawner: &Spawner,
    wifi: WIFI<'static>,
    credentials: Credentials,
) -> Result<Stack<'static>, BoardError> {
    let radio = RADIO.init(esp_radio::init().map_err(|_| BoardError::Radio)?);
    let (controller, interfaces) =
        esp_radio::wifi::new(radio, wifi, Default::default()).map_err(|_| BoardError::Radio)?;

    let rng = Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());

    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        NetConfig::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        seed,
    );

    spawner
        .spawn(connection_task(controller, credentials))
        .unwrap();
    spawner.spawn(net_task(runner)).unwrap();
    Ok(stack)
}

/// Wait until DHCP has handed out an address and print it
pub async fn wait_for_address(stack: Stack<'static>, ssid: &str) {
    stack.wait_config_up().await;

    console_println!("");
    console_println!("--- WiFi Status ---");
    console_println!("SSID: {}", ssid);
    if let Some(config) = stack.config_v4() {
        console_println!("IP Address: {}", config.address.address());
        info!("DHCP address {}", config.address);
    }
    console_println!("-------------------");
}

/// Connection task - associates and reassociates the station
#[embassy_executor::task]
async fn connection_task(mut controller: WifiController<'static>, credentials: Credentials) {
    info!("WiFi connection task started");

    console_println!("");
    console_println!("--- Connecting to WiFi ---");
    console_println!("SSID: {}", credentials.ssid);

    loop {
        if esp_radio::wifi::sta_state() == WifiStaState::Connected {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            console_println!("WiFi connection lost. Reconnecting...");
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(String::from(credentials.ssid))
                    .with_password(String::from(credentials.password)),
            );
            if let Err(e) = controller.set_config(&config) {
                error!("WiFi config rejected: {:?}", e);
            }
            if let Err(e) = controller.start_async().await {
                error!("WiFi start failed: {:?}", e);
            }
        }

        match controller.connect_async().await {
            Ok(()) => console_println!("Attempting connection... SUCCESS!"),
            Err(e) => {
                warn!("WiFi connect failed: {:?}", e);
                console_println!("Attempting connection... FAILED");
                console_println!("Retrying in {} seconds...", WIFI_RETRY_SECS);
                Timer::after_secs(WIFI_RETRY_SECS).await;
            }
        }
    }
}

/// Net task - runs the embassy-net stack
#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}
