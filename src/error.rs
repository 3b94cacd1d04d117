//! Library error type.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the controller facade and the BLE transport.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// No Bluetooth adapter is available on this host.
    #[error("no Bluetooth adapter available")]
    AdapterUnavailable,

    /// No garment advertising the expected service was found in time.
    #[error("no device advertising service {service} found within {timeout:?}")]
    DeviceNotFound { service: Uuid, timeout: Duration },

    /// The BLE connection attempt did not complete in time.
    #[error("connection attempt timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// GATT service discovery did not complete in time.
    #[error("service discovery timed out after {0:?}")]
    DiscoveryTimeout(Duration),

    /// The device is missing an expected characteristic.
    #[error("characteristic {0} not found on device")]
    CharacteristicNotFound(Uuid),

    /// An operation requiring an active connection was attempted without one.
    #[error("not connected to a garment")]
    NotConnected,

    /// A configured UUID string could not be parsed.
    #[error("invalid UUID in configuration: {0}")]
    InvalidUuid(String),

    /// Underlying BLE stack failure.
    #[error(transparent)]
    Ble(#[from] btleplug::Error),
}
