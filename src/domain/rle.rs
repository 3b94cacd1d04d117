//! Run-length nibble decoder for compressed half-frame deltas.
//!
//! Continuation notifications carry per-channel *deltas*, not absolute
//! values: each compressed byte splits into two 4-bit nibbles, each nibble
//! maps through a fixed expansion table, and the looked-up magnitude is
//! added to the channel slot the nibble covers. The accumulation buffer
//! therefore always holds the running frame state between notifications.

use crate::domain::models::{FRAME_LEN, HALF_FRAME_LEN};

/// Nibble-to-magnitude expansion table.
///
/// Nonlinear quantization: fine steps at low magnitudes, coarse steps near
/// saturation, approximating a log-like response curve for capacitive
/// sensing. Must match the garment firmware's encoder table exactly.
pub const EXPANSION_TABLE: [u8; 16] = [
    0, 1, 2, 4, 8, 16, 32, 64, 128, 192, 224, 240, 248, 252, 254, 255,
];

/// Expand one 8-byte compressed half-frame into `buffer`, in place.
///
/// Byte `i` covers buffer slots `2i` (high nibble) and `2i + 1` (low
/// nibble). Additions wrap per two's-complement byte arithmetic: the
/// device's encoder relies on wraparound, so clamping here would corrupt
/// the accumulated state. Range clamping is the smoothing filter's job.
pub fn apply_delta(compressed: &[u8; HALF_FRAME_LEN], buffer: &mut [u8; FRAME_LEN]) {
    for (i, byte) in compressed.iter().enumerate() {
        let hi = EXPANSION_TABLE[(byte >> 4) as usize];
        let lo = EXPANSION_TABLE[(byte & 0x0F) as usize];
        buffer[2 * i] = buffer[2 * i].wrapping_add(hi);
        buffer[2 * i + 1] = buffer[2 * i + 1].wrapping_add(lo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_byte_value_expands_per_table() {
        for b in 0u8..=255 {
            let mut buffer = [0u8; FRAME_LEN];
            let compressed = [b, 0, 0, 0, 0, 0, 0, 0];
            apply_delta(&compressed, &mut buffer);
            assert_eq!(buffer[0], EXPANSION_TABLE[(b >> 4) as usize]);
            assert_eq!(buffer[1], EXPANSION_TABLE[(b & 0x0F) as usize]);
        }
    }

    #[test]
    fn deltas_accumulate_into_prior_state() {
        let mut buffer = [10u8; FRAME_LEN];
        // Nibble 0x3 -> +4 on every slot.
        apply_delta(&[0x33; HALF_FRAME_LEN], &mut buffer);
        assert_eq!(buffer, [14u8; FRAME_LEN]);
        apply_delta(&[0x33; HALF_FRAME_LEN], &mut buffer);
        assert_eq!(buffer, [18u8; FRAME_LEN]);
    }

    #[test]
    fn overflow_wraps_instead_of_clamping() {
        let mut buffer = [200u8; FRAME_LEN];
        // Nibble 0xF -> +255, i.e. wrapping subtraction of 1.
        apply_delta(&[0xFF; HALF_FRAME_LEN], &mut buffer);
        assert_eq!(buffer, [199u8; FRAME_LEN]);
    }

    #[test]
    fn each_input_byte_targets_its_own_slot_pair() {
        let mut buffer = [0u8; FRAME_LEN];
        let mut compressed = [0u8; HALF_FRAME_LEN];
        compressed[3] = 0x81; // slot 6 += 128, slot 7 += 1
        apply_delta(&compressed, &mut buffer);
        let mut expected = [0u8; FRAME_LEN];
        expected[6] = 128;
        expected[7] = 1;
        assert_eq!(buffer, expected);
    }
}
