//! Host-side controller for a BLE capacitive touch-sensing garment.
//!
//! The garment streams a 15-line capacitive frame plus a proximity byte as
//! a fragmented, run-length-compressed notification stream and accepts
//! 3-byte LED pattern commands. This crate reconstructs frames from the
//! fragment stream, smooths held touches with a quadratic decay filter,
//! emits an explicit release frame when the stream goes idle, and exposes a
//! connect/command/subscribe facade over the whole thing.
//!
//! ```no_run
//! use weartouch::{ConnectionConfig, LedPattern, WearController};
//!
//! # async fn demo() -> Result<(), weartouch::ControllerError> {
//! let mut controller = WearController::new(ConnectionConfig::default());
//! controller.on_analog_input(|frame| {
//!     println!("proximity {} lines {:?}", frame.proximity, frame.lines);
//! });
//! controller.connect().await?;
//! controller.set_led_pattern(LedPattern::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::models::{LedPattern, SensorFrame, LINE_COUNT, PRESSURE_CEILING};
pub use domain::settings::{Settings, SettingsService};
pub use error::ControllerError;
pub use infrastructure::bluetooth::{ConnectionConfig, WearController};
