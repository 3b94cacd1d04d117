//! Garment BLE protocol surface.
//!
//! One vendor service exposes two characteristics: the analog notify
//! characteristic streaming the fragmented sensor telemetry decoded in
//! [`crate::domain`], and a write-only characteristic accepting 3-byte LED
//! pattern commands (see [`crate::domain::models::LedPattern`]).
//!
//! # Notification payload layout
//!
//! ```text
//! [0-1]  : sequence index (u16 little-endian, even, 0 restarts a frame)
//! index 0:
//!   [2-17] : uncompressed 16-byte frame snapshot
//! otherwise:
//!   [2-9]  : first compressed half-frame delta
//!   [10-17]: second compressed half-frame delta
//! ```
//!
//! Byte 0 of the reconstructed frame is the proximity reading; bytes 1-15
//! are the per-line accumulated raw values.

use uuid::Uuid;

/// Primary GATT service advertised by the garment.
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0xd45c2000_4270_a125_a25d_ee458c085001);

/// Analog sensor characteristic (notify): fragmented telemetry stream.
pub const ANALOG_CHAR_UUID: Uuid = Uuid::from_u128(0xd45c2010_4270_a125_a25d_ee458c085001);

/// LED pattern characteristic (write): 3-byte `[type, duration, brightness]`.
pub const LED_CHAR_UUID: Uuid = Uuid::from_u128(0xd45c2080_4270_a125_a25d_ee458c085001);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuids_render_lowercase_vendor_namespace() {
        assert_eq!(SERVICE_UUID.to_string(), "d45c2000-4270-a125-a25d-ee458c085001");
        assert_eq!(ANALOG_CHAR_UUID.to_string(), "d45c2010-4270-a125-a25d-ee458c085001");
        assert_eq!(LED_CHAR_UUID.to_string(), "d45c2080-4270-a125-a25d-ee458c085001");
    }
}
