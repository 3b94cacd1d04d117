//! Temporal smoothing filter: raw channel bytes to stable pressure values.
//!
//! Capacitive lines saturate while a touch is held, and the additive delta
//! encoding can leave a channel parked at the same byte for many frames.
//! Rather than cutting off abruptly, a held channel decays quadratically
//! with the length of its unchanged run, producing a gradual fade-out that
//! mimics the touch being released.

use crate::domain::models::{SensorFrame, FRAME_LEN, LINE_COUNT, PRESSURE_CEILING};

/// Per-frame decay rate multiplier applied to `run²`.
const DECAY_RATE: f64 = 0.025;

/// Number of unchanged frames a fully saturated channel is allowed to hold
/// before decay kicks in. Sub-saturation channels decay from the first
/// repeat.
const SATURATION_GRACE: u32 = 10;

/// Stateful smoothing stage.
///
/// Owns the per-channel history (last raw byte and unchanged-run counter).
/// History is reset only when the filter is constructed, at subscription
/// start, never mid-session.
pub struct TouchFilter {
    last_raw: [u8; LINE_COUNT],
    unchanged_run: [u32; LINE_COUNT],
}

impl TouchFilter {
    pub fn new() -> Self {
        Self {
            last_raw: [0; LINE_COUNT],
            unchanged_run: [0; LINE_COUNT],
        }
    }

    /// Convert one decode-ready buffer into a [`SensorFrame`].
    ///
    /// Byte 0 passes through as the raw proximity reading. Each of the 15
    /// line bytes is clamped to the pressure ceiling and then decayed by
    /// `run² × 0.025` if the device-reported byte is identical to the
    /// previous frame's. The history stores the *pre-decay* raw byte, so
    /// repeated-value detection compares what the device sent, not what the
    /// filter emitted: a value that wrapped around via two's-complement
    /// addition back to its old byte counts as unchanged, matching the
    /// firmware's own view of the channel.
    pub fn process(&mut self, buffer: &[u8; FRAME_LEN]) -> SensorFrame {
        let mut frame = SensorFrame {
            proximity: buffer[0],
            lines: [0; LINE_COUNT],
        };

        for i in 0..LINE_COUNT {
            let raw = buffer[i + 1];
            let mut val = raw.min(PRESSURE_CEILING);

            if raw == self.last_raw[i] {
                self.unchanged_run[i] += 1;
                let run = self.unchanged_run[i];
                if val < PRESSURE_CEILING || run >= SATURATION_GRACE {
                    let decayed = f64::from(val) - f64::from(run) * f64::from(run) * DECAY_RATE;
                    val = decayed.floor().max(0.0) as u8;
                }
            } else {
                self.unchanged_run[i] = 0;
            }

            frame.lines[i] = val;
            self.last_raw[i] = raw;
        }

        frame
    }
}

impl Default for TouchFilter {
    fn default() -> Self {
        Self::new()
    }
}
