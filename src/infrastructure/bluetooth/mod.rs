//! Bluetooth Module
//!
//! Provides BLE communication with the touch-sensing garment.
//!
//! ## Modules
//!
//! - [`protocol`] - service/characteristic UUIDs and payload layout notes
//! - [`scanner`] - BLE device discovery
//! - [`connection`] - device connection and characteristic resolution
//! - [`service`] - the public controller facade
//!
//! The decode pipeline itself lives in [`crate::domain`]; this module is
//! the thin I/O glue that feeds it.

pub mod connection;
pub mod protocol;
pub mod scanner;
pub mod service;

pub use connection::ConnectionConfig;
pub use service::WearController;
