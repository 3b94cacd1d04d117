//! Host-facing adapters: logging setup and the BLE transport.

pub mod bluetooth;
pub mod logging;
