//! Core data model for the garment sensor stream.

/// Number of capacitive touch lines woven into the garment.
pub const LINE_COUNT: usize = 15;

/// Length of one fully reconstructed frame: proximity byte + 15 line bytes.
pub const FRAME_LEN: usize = 16;

/// Length of one compressed half-frame delta block.
pub const HALF_FRAME_LEN: usize = 8;

/// Length of the little-endian sequence index prefixing every notification.
pub const SEQ_HEADER_LEN: usize = 2;

/// Full notification payload length for both wire branches:
/// header + uncompressed frame, or header + two half-frames.
pub const NOTIFICATION_LEN: usize = SEQ_HEADER_LEN + FRAME_LEN;

/// Upper bound of the smoothed per-line pressure reading.
pub const PRESSURE_CEILING: u8 = 128;

/// One processed sensor reading delivered to subscribers.
///
/// `proximity` is the raw, unclamped proximity byte; `lines` holds the
/// smoothed per-line pressure values, each in `0..=128`. A frame is a
/// snapshot: it is freshly constructed for every emission and never
/// mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorFrame {
    pub proximity: u8,
    pub lines: [u8; LINE_COUNT],
}

impl SensorFrame {
    /// The synthetic all-zero frame emitted when the stream goes idle,
    /// so subscribers see an explicit "released" state instead of a stale
    /// last reading.
    pub fn released() -> Self {
        Self::default()
    }
}

/// Highest pattern identifier the garment firmware accepts.
pub const LED_PATTERN_MAX: u8 = 0x21;

/// An LED animation command.
///
/// The firmware's original host library substituted defaults for falsy
/// arguments; here every field is explicit and zero is a meaningful value.
/// Use `LedPattern::default()` (pattern `0x10`, duration `0x08`, full
/// brightness) and override fields as needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedPattern {
    /// Pattern identifier, `0x00..=0x21`.
    pub kind: u8,
    /// Pattern duration in firmware ticks.
    pub duration: u8,
    /// LED brightness, `0x00` (off) to `0xFF` (full).
    pub brightness: u8,
}

impl Default for LedPattern {
    fn default() -> Self {
        Self {
            kind: 0x10,
            duration: 0x08,
            brightness: 0xFF,
        }
    }
}

impl LedPattern {
    /// Encode as the 3-byte payload written to the LED characteristic.
    ///
    /// The pattern identifier is clamped to the firmware's known range.
    pub fn encode(&self) -> [u8; 3] {
        [self.kind.min(LED_PATTERN_MAX), self.duration, self.brightness]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_encodes_firmware_defaults() {
        assert_eq!(LedPattern::default().encode(), [0x10, 0x08, 0xFF]);
    }

    #[test]
    fn zero_fields_are_preserved_not_defaulted() {
        let p = LedPattern {
            kind: 0x00,
            duration: 0x00,
            brightness: 0x00,
        };
        assert_eq!(p.encode(), [0x00, 0x00, 0x00]);
    }

    #[test]
    fn out_of_range_pattern_is_clamped() {
        let p = LedPattern {
            kind: 0x7F,
            ..Default::default()
        };
        assert_eq!(p.encode()[0], LED_PATTERN_MAX);
    }

    #[test]
    fn released_frame_is_all_zero() {
        let f = SensorFrame::released();
        assert_eq!(f.proximity, 0);
        assert_eq!(f.lines, [0u8; LINE_COUNT]);
    }
}
