//! ESP-NOW tasks
//!
//! The Chef broadcasts the outgoing message every period; every board
//! decodes what it receives and publishes it on [`INCOMING`]. Followers
//! answer each message with an acknowledgment to the Chef.

use defmt::*;
use embassy_time::{Duration, Ticker};
use esp_hal::peripherals::WIFI;
use esp_radio::esp_now::{
    EspNowManager, EspNowReceiver, EspNowSender, EspNowWifiInterface, PeerInfo,
};
use esp_radio::wifi::{WifiController, WifiMode};
use esp_radio::Controller;
use static_cell::StaticCell;

use bunbot_protocol::message::ACK_TEXT;
use bunbot_protocol::{BroadcastMessage, MacAddress};

use crate::board::{uptime_secs, BoardError};
use crate::channels::{outgoing, INCOMING};
use crate::console_println;

static RADIO: StaticCell<Controller<'static>> = StaticCell::new();
static WIFI_CONTROLLER: StaticCell<WifiController<'static>> = StaticCell::new();

/// A started ESP-NOW interface
pub struct EspNowLink {
    pub manager: EspNowManager<'static>,
    pub sender: EspNowSender<'static>,
    pub receiver: EspNowReceiver<'static>,
    /// This board's station address
    pub mac: MacAddress,
}

/// Where followers send their acknowledgments
pub struct AckTarget {
    pub sender: EspNowSender<'static>,
    pub master: MacAddress,
}

/// Bring the radio up in station mode and open ESP-NOW
pub fn start_esp_now(wifi: WIFI<'static>) -> Result<EspNowLink, BoardError> {
    let radio = RADIO.init(esp_radio::init().map_err(|_| BoardError::Radio)?);
    let (mut controller, interfaces) =
        esp_radio::wifi::new(radio, wifi, Default::default()).map_err(|_| BoardError::Radio)?;

    controller
        .set_mode(WifiMode::Sta)
        .map_err(|_| BoardError::Radio)?;
    controller.start().map_err(|_| BoardError::Radio)?;
    WIFI_CONTROLLER.init(controller);

    let mac = MacAddress(interfaces.sta.mac_address());
    let (manager, sender, receiver) = interfaces.esp_now.split();
    info!("ESP-NOW started, station address {}", mac);

    Ok(EspNowLink {
        manager,
        sender,
        receiver,
        mac,
    })
}

/// Register a unicast or broadcast peer if it is not known yet
pub fn add_peer(manager: &EspNowManager<'static>, peer: MacAddress) -> Result<(), BoardError> {
    if manager.peer_exists(&peer.octets()) {
        return Ok(());
    }
    manager
        .add_peer(PeerInfo {
            interface: EspNowWifiInterface::Sta,
            peer_address: peer.octets(),
            lmk: None,
            channel: None,
            encrypt: false,
        })
        .map_err(|_| BoardError::Radio)
}

/// Broadcast task - sends the outgoing message every period
#[embassy_executor::task]
pub async fn broadcast_task(mut sender: EspNowSender<'static>, period_ms: u32) {
    info!("Broadcast task started");

    let mut ticker = Ticker::every(Duration::from_millis(u64::from(period_ms)));

    loop {
        ticker.next().await;

        let mut msg = outgoing();
        msg.value = uptime_secs();

        match sender
            .send_async(&MacAddress::BROADCAST.octets(), &msg.encode())
            .await
        {
            Ok(()) => trace!("Broadcast \"{}\" value {}", msg.text(), msg.value),
            Err(e) => {
                warn!("ESP-NOW send failed: {:?}", e);
                console_println!("Error sending the data");
            }
        }
    }
}

/// Receive task - decodes messages, publishes them and optionally acks
#[embassy_executor::task]
pub async fn receive_task(mut receiver: EspNowReceiver<'static>, mut ack: Option<AckTarget>) {
    info!("Receive task started");

    loop {
        let received = receiver.receive_async().await;
        let src = MacAddress(received.info.src_address);

        let msg = match BroadcastMessage::decode(received.data()) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Dropping malformed message from {}: {:?}", src, e);
                continue;
            }
        };

        match ack.as_mut() {
            None => console_println!("Received data: {}", msg.text()),
            Some(target) => {
                console_println!("Received from {}: {}, value: {}", src, msg.text(), msg.value);
                send_ack(target).await;
            }
        }

        INCOMING.signal((src, msg));
    }
}

async fn send_ack(target: &mut AckTarget) {
    let Ok(reply) = BroadcastMessage::new(ACK_TEXT, uptime_secs()) else {
        return;
    };

    match target
        .sender
        .send_async(&target.master.octets(), &reply.encode())
        .await
    {
        Ok(()) => console_println!("Ack sent back to master"),
        Err(e) => {
            warn!("Ack to {} failed: {:?}", target.master, e);
            console_println!("Failed to send ack");
        }
    }
}
