//! Device connection and GATT characteristic resolution.

use std::time::Duration;

use btleplug::api::{Characteristic, Peripheral as _};
use btleplug::platform::Peripheral;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::settings::Settings;
use crate::error::ControllerError;
use crate::infrastructure::bluetooth::protocol;

/// Connection parameters, resolved from [`Settings`] strings at connect time.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub service_uuid: Uuid,
    pub analog_char_uuid: Uuid,
    pub led_char_uuid: Uuid,
    pub scan_timeout: Duration,
    pub connect_timeout: Duration,
    pub idle_release: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            service_uuid: protocol::SERVICE_UUID,
            analog_char_uuid: protocol::ANALOG_CHAR_UUID,
            led_char_uuid: protocol::LED_CHAR_UUID,
            scan_timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(10),
            idle_release: Duration::from_millis(50),
        }
    }
}

impl ConnectionConfig {
    /// Parse the UUID strings out of persisted settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ControllerError> {
        let parse = |s: &str| {
            Uuid::parse_str(s).map_err(|_| ControllerError::InvalidUuid(s.to_string()))
        };
        Ok(Self {
            service_uuid: parse(&settings.ble_service_uuid)?,
            analog_char_uuid: parse(&settings.ble_analog_char_uuid)?,
            led_char_uuid: parse(&settings.ble_led_char_uuid)?,
            scan_timeout: Duration::from_secs(settings.scan_timeout_secs),
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            idle_release: Duration::from_millis(settings.idle_release_ms),
        })
    }
}

/// Characteristics resolved on a connected peripheral.
pub struct ConnectionResult {
    pub peripheral: Peripheral,
    pub analog_characteristic: Characteristic,
    pub led_characteristic: Characteristic,
}

/// One-shot connection handler. No automatic retry: transport failures
/// propagate to the caller, and reconnection is the caller's decision.
pub struct BleConnection {
    config: ConnectionConfig,
}

impl BleConnection {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    /// Connect to the peripheral and resolve both garment characteristics.
    ///
    /// `connect()` can block indefinitely on some BLE stacks when the device
    /// drops out of range mid-handshake, so both it and service discovery
    /// run under hard timeouts.
    pub async fn establish(&self, peripheral: Peripheral) -> Result<ConnectionResult, ControllerError> {
        tokio::time::timeout(self.config.connect_timeout, peripheral.connect())
            .await
            .map_err(|_| ControllerError::ConnectTimeout(self.config.connect_timeout))??;

        // BlueZ signals connection completion before its GATT cache is
        // populated; discovering too early yields an empty characteristic set.
        #[cfg(target_os = "linux")]
        tokio::time::sleep(Duration::from_millis(400)).await;

        tokio::time::timeout(self.config.connect_timeout, peripheral.discover_services())
            .await
            .map_err(|_| ControllerError::DiscoveryTimeout(self.config.connect_timeout))??;
        info!("connected, services discovered");

        let analog = self.find_characteristic(&peripheral, self.config.analog_char_uuid)?;
        let led = self.find_characteristic(&peripheral, self.config.led_char_uuid)?;

        Ok(ConnectionResult {
            peripheral,
            analog_characteristic: analog,
            led_characteristic: led,
        })
    }

    fn find_characteristic(
        &self,
        peripheral: &Peripheral,
        uuid: Uuid,
    ) -> Result<Characteristic, ControllerError> {
        peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
            .ok_or_else(|| {
                warn!(%uuid, "characteristic missing after discovery");
                ControllerError::CharacteristicNotFound(uuid)
            })
    }
}
