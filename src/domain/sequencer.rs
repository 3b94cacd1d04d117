//! Fragment sequencer: classifies indexed notification payloads and
//! maintains the rolling decode buffer.
//!
//! The garment streams monotonically increasing *even* sequence indices.
//! Index 0 carries a full uncompressed frame snapshot; every later
//! notification carries two compressed half-frame deltas that accumulate
//! into the snapshot. Gaps signal loss, but the accumulator design degrades
//! gracefully by repeating the last known state rather than stalling.

use tracing::{debug, trace};

use crate::domain::models::{FRAME_LEN, HALF_FRAME_LEN, NOTIFICATION_LEN, SEQ_HEADER_LEN};
use crate::domain::rle;

/// Reassembles frames from the fragmented notification stream.
///
/// Owns the decode buffer exclusively; downstream stages only ever see the
/// snapshots returned by [`FragmentSequencer::accept`].
pub struct FragmentSequencer {
    buffer: Option<[u8; FRAME_LEN]>,
    last_index: u16,
}

impl FragmentSequencer {
    pub fn new() -> Self {
        Self {
            buffer: None,
            last_index: 0,
        }
    }

    /// Feed one raw notification payload.
    ///
    /// Returns zero, one, or two decode-ready buffer snapshots:
    /// - index 0: the buffer is replaced with the embedded snapshot and
    ///   emitted once;
    /// - the expected continuation index (`last + 2`, wrapping): each of the
    ///   two half-frame deltas is merged and the buffer emitted after each
    ///   merge, keeping the downstream frame cadence at two per notification;
    /// - anything else (duplicate, stale retransmit, gap): the current
    ///   buffer is re-emitted unchanged, or nothing if no frame has been
    ///   seen yet.
    ///
    /// BLE gives no payload-integrity guarantee beyond the transport
    /// checksum, so payloads shorter than their branch expects are skipped
    /// silently.
    pub fn accept(&mut self, payload: &[u8]) -> Vec<[u8; FRAME_LEN]> {
        if payload.len() < SEQ_HEADER_LEN {
            trace!(len = payload.len(), "payload too short for sequence header");
            return Vec::new();
        }
        let index = u16::from_le_bytes([payload[0], payload[1]]);

        if index == 0 {
            return self.accept_snapshot(payload);
        }
        if index == self.last_index.wrapping_add(2) {
            if let Some(snapshots) = self.accept_continuation(index, payload) {
                return snapshots;
            }
        }

        // Out-of-sequence: repeat the last known state to keep cadence.
        debug!(index, last_index = self.last_index, "out-of-sequence fragment");
        match self.buffer {
            Some(buf) => vec![buf],
            None => Vec::new(),
        }
    }

    fn accept_snapshot(&mut self, payload: &[u8]) -> Vec<[u8; FRAME_LEN]> {
        if payload.len() < NOTIFICATION_LEN {
            trace!(len = payload.len(), "truncated frame snapshot");
            return Vec::new();
        }
        let mut buf = [0u8; FRAME_LEN];
        buf.copy_from_slice(&payload[SEQ_HEADER_LEN..NOTIFICATION_LEN]);
        self.buffer = Some(buf);
        self.last_index = 0;
        vec![buf]
    }

    /// Returns `None` when no buffer exists yet for the delta to land in;
    /// the caller then falls through to the out-of-sequence path.
    fn accept_continuation(
        &mut self,
        index: u16,
        payload: &[u8],
    ) -> Option<Vec<[u8; FRAME_LEN]>> {
        if payload.len() < NOTIFICATION_LEN {
            trace!(len = payload.len(), "truncated continuation fragment");
            return Some(Vec::new());
        }
        let buf = self.buffer.as_mut()?;

        let mut snapshots = Vec::with_capacity(2);
        for half in 0..2 {
            let start = SEQ_HEADER_LEN + half * HALF_FRAME_LEN;
            let mut compressed = [0u8; HALF_FRAME_LEN];
            compressed.copy_from_slice(&payload[start..start + HALF_FRAME_LEN]);
            rle::apply_delta(&compressed, buf);
            snapshots.push(*buf);
        }
        self.last_index = index;
        Some(snapshots)
    }
}

impl Default for FragmentSequencer {
    fn default() -> Self {
        Self::new()
    }
}
