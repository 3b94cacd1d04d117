//! Wiring of the decode stages plus the idle-release deadline.
//!
//! One pump task per connection owns the whole pipeline, so the sequencer,
//! decoder, and filter run synchronously to completion for each payload.
//! No locking is needed and decode passes never overlap.

use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::domain::filter::TouchFilter;
use crate::domain::models::SensorFrame;
use crate::domain::sequencer::FragmentSequencer;

/// How long the stream may stay silent before subscribers get a synthetic
/// released frame.
pub const IDLE_RELEASE: Duration = Duration::from_millis(50);

/// Sequencer, decoder, and filter composed into one synchronous stage.
pub struct DecodePipeline {
    sequencer: FragmentSequencer,
    filter: TouchFilter,
}

impl DecodePipeline {
    pub fn new() -> Self {
        Self {
            sequencer: FragmentSequencer::new(),
            filter: TouchFilter::new(),
        }
    }

    /// Run one raw notification payload through the full pipeline.
    ///
    /// Returns the processed frames in emission order: zero for skipped
    /// payloads, one for a snapshot or a stale re-emit, two for a
    /// continuation notification.
    pub fn feed(&mut self, payload: &[u8]) -> Vec<SensorFrame> {
        self.sequencer
            .accept(payload)
            .iter()
            .map(|buffer| self.filter.process(buffer))
            .collect()
    }
}

impl Default for DecodePipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive a stream of raw notification payloads through a fresh pipeline,
/// emitting frames and enforcing the idle-release timeout.
///
/// Every processed frame re-arms a single deadline `idle_release` in the
/// future (cancel-and-reschedule, never more than one pending). When the
/// deadline fires, exactly one [`SensorFrame::released`] is emitted and the
/// deadline is disarmed until traffic resumes. Returns when the payload
/// stream ends; aborting the task that runs this future cancels the pending
/// deadline with it.
pub async fn pump<S, F>(mut payloads: S, idle_release: Duration, mut emit: F)
where
    S: Stream<Item = Vec<u8>> + Unpin,
    F: FnMut(SensorFrame),
{
    let mut pipeline = DecodePipeline::new();
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            payload = payloads.next() => {
                let Some(payload) = payload else {
                    debug!("payload stream ended, pump exiting");
                    break;
                };
                let frames = pipeline.feed(&payload);
                if !frames.is_empty() {
                    deadline = Some(Instant::now() + idle_release);
                }
                for frame in frames {
                    emit(frame);
                }
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(far_future)),
                if deadline.is_some() =>
            {
                trace!("idle timeout, emitting release frame");
                deadline = None;
                emit(SensorFrame::released());
            }
        }
    }
}

fn far_future() -> Instant {
    // Never polled; only keeps the disabled select branch well-formed.
    Instant::now() + Duration::from_secs(86400)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{FRAME_LEN, LINE_COUNT};
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::ReceiverStream;

    fn snapshot_payload(fill: u8) -> Vec<u8> {
        let mut payload = vec![0x00, 0x00];
        payload.extend_from_slice(&[fill; FRAME_LEN]);
        payload
    }

    #[test]
    fn feed_produces_two_frames_per_continuation() {
        let mut pipeline = DecodePipeline::new();
        assert_eq!(pipeline.feed(&snapshot_payload(0)).len(), 1);

        let mut continuation = vec![0x02, 0x00];
        continuation.extend_from_slice(&[0x11; 16]);
        let frames = pipeline.feed(&continuation);
        assert_eq!(frames.len(), 2);
        // Two accumulation passes over a zeroed snapshot: +1 per half.
        // Values change each pass, so no decay applies.
        assert_eq!(frames[0].lines, [1u8; LINE_COUNT]);
        assert_eq!(frames[1].lines, [2u8; LINE_COUNT]);
    }

    #[test]
    fn feed_skips_garbage() {
        let mut pipeline = DecodePipeline::new();
        assert!(pipeline.feed(&[0x09]).is_empty());
        assert!(pipeline.feed(&[0x02, 0x00, 0xAB]).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_gap_emits_exactly_one_release_frame() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(8);
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = emitted.clone();

        let task = tokio::spawn(pump(ReceiverStream::new(rx), IDLE_RELEASE, move |frame| {
            sink.lock().unwrap().push(frame);
        }));

        tx.send(snapshot_payload(5)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(emitted.lock().unwrap().len(), 1);

        // Cross the 50 ms idle threshold: one release frame, then silence.
        tokio::time::sleep(Duration::from_millis(60)).await;
        {
            let frames = emitted.lock().unwrap();
            assert_eq!(frames.len(), 2);
            assert_eq!(frames[1], SensorFrame::released());
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(emitted.lock().unwrap().len(), 2);

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn traffic_keeps_postponing_the_release() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(8);
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = emitted.clone();

        let task = tokio::spawn(pump(ReceiverStream::new(rx), IDLE_RELEASE, move |frame| {
            sink.lock().unwrap().push(frame);
        }));

        // Frames every 30 ms stay inside the window: no release fires.
        for _ in 0..5 {
            tx.send(snapshot_payload(9)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        assert_eq!(emitted.lock().unwrap().len(), 5);

        // A second idle gap after resumed traffic produces a second release.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(emitted.lock().unwrap().len(), 6);
        tx.send(snapshot_payload(9)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(emitted.lock().unwrap().len(), 8);

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn skipped_payloads_do_not_rearm_the_deadline() {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(8);
        let emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = emitted.clone();

        let task = tokio::spawn(pump(ReceiverStream::new(rx), IDLE_RELEASE, move |frame| {
            sink.lock().unwrap().push(frame);
        }));

        tx.send(snapshot_payload(5)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        // Garbage close to the deadline must not postpone the release.
        tx.send(vec![0x07]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let frames = emitted.lock().unwrap().clone();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1], SensorFrame::released());

        drop(tx);
        task.await.unwrap();
    }
}
