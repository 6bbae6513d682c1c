use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use frameslot_shm::ShmRegion;
use tracing::{debug, trace};

use crate::error::{ChannelError, Result};
use crate::poll::StopFlag;
use crate::slot::{FrameFormat, SlotState, FLAG_OFFSET, PAYLOAD_OFFSET};

/// Producer endpoint of the frame slot: the mirror image of
/// [`FrameConsumer`](crate::FrameConsumer).
///
/// Writes the payload only while the slot is EMPTY, then stores FULL.
/// There is no frame sequencing: if the consumer is slow the producer
/// simply waits for EMPTY and the skipped frames are silently dropped.
pub struct FrameProducer {
    region: ShmRegion,
    format: FrameFormat,
}

impl FrameProducer {
    /// Create the named slot and map it for writing. The producer owns the
    /// name; dropping this endpoint destroys it (on platforms where that is
    /// explicit) while existing consumer mappings stay valid.
    pub fn create(name: &str, format: FrameFormat) -> Result<FrameProducer> {
        let region = ShmRegion::create(name, format.region_bytes()).map_err(ChannelError::Mapping)?;
        let producer = FrameProducer { region, format };
        // Fresh or reused, the slot starts out owned by the producer.
        producer
            .flag()
            .store(SlotState::Empty.as_byte(), Ordering::Release);
        debug!(name, ?format, "created frame slot");
        Ok(producer)
    }

    /// Map an already-created slot for writing (producer restart).
    pub fn open(name: &str, format: FrameFormat) -> Result<FrameProducer> {
        let region = ShmRegion::open(name, format.region_bytes())?;
        debug!(name, ?format, "attached to frame slot as producer");
        Ok(FrameProducer { region, format })
    }

    fn flag(&self) -> &AtomicU8 {
        // SAFETY: the region is at least `region_bytes()` long and AtomicU8
        // has the same layout as u8.
        unsafe { AtomicU8::from_ptr(self.region.as_ptr().add(FLAG_OFFSET)) }
    }

    /// Whether the consumer has released the slot.
    pub fn slot_is_empty(&self) -> bool {
        self.flag().load(Ordering::Acquire) == SlotState::Empty.as_byte()
    }

    /// Publish one frame if the slot is free.
    ///
    /// Returns `Ok(false)` without touching the payload while the slot is
    /// still FULL. On `Ok(true)` the payload was copied in and the flag set
    /// to FULL, handing ownership to the consumer.
    pub fn try_publish(&mut self, frame: &[u8]) -> Result<bool> {
        if frame.len() != self.format.frame_bytes() {
            return Err(ChannelError::FrameSize {
                len: frame.len(),
                expected: self.format.frame_bytes(),
            });
        }
        if !self.slot_is_empty() {
            return Ok(false);
        }
        trace!("slot is empty, publishing frame");
        // SAFETY: EMPTY transfers payload ownership to this side; the
        // consumer will not read until the Release store below makes the
        // copied bytes visible together with FULL.
        unsafe {
            std::ptr::copy_nonoverlapping(
                frame.as_ptr(),
                self.region.as_ptr().add(PAYLOAD_OFFSET),
                frame.len(),
            );
        }
        self.flag()
            .store(SlotState::Full.as_byte(), Ordering::Release);
        Ok(true)
    }

    /// Publish one frame, polling for EMPTY at `interval`.
    ///
    /// Returns `Ok(false)` if `stop` fires before the slot frees up.
    pub fn publish_blocking(
        &mut self,
        frame: &[u8],
        interval: Duration,
        stop: &StopFlag,
    ) -> Result<bool> {
        loop {
            if stop.is_stopped() {
                return Ok(false);
            }
            if self.try_publish(frame)? {
                return Ok(true);
            }
            std::thread::sleep(interval);
        }
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn name(&self) -> &str {
        self.region.name()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn unique_name(tag: &str) -> String {
        format!(
            "/frameslot-producer-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        )
    }

    const SMALL: FrameFormat = FrameFormat::new(4, 2, 3);

    #[test]
    fn created_slot_starts_empty() {
        let name = unique_name("fresh");
        let producer = FrameProducer::create(&name, SMALL).expect("create should succeed");
        assert!(producer.slot_is_empty());
    }

    #[test]
    fn wrong_payload_length_is_rejected() {
        let name = unique_name("badlen");
        let mut producer = FrameProducer::create(&name, SMALL).expect("create should succeed");

        let short = vec![0u8; SMALL.frame_bytes() - 1];
        let result = producer.try_publish(&short);
        assert!(matches!(
            result,
            Err(ChannelError::FrameSize { expected, .. }) if expected == SMALL.frame_bytes()
        ));
        // A rejected publish leaves the slot untouched.
        assert!(producer.slot_is_empty());
    }

    #[test]
    fn publish_fills_slot_until_released() {
        let name = unique_name("fill");
        let mut producer = FrameProducer::create(&name, SMALL).expect("create should succeed");

        let frame = vec![0xC3; SMALL.frame_bytes()];
        assert!(producer.try_publish(&frame).expect("publish should succeed"));
        assert!(!producer.slot_is_empty());
        assert!(!producer
            .try_publish(&frame)
            .expect("second publish should not error"));
    }

    #[test]
    fn publish_blocking_honors_stop() {
        let name = unique_name("stop");
        let mut producer = FrameProducer::create(&name, SMALL).expect("create should succeed");

        let frame = vec![1u8; SMALL.frame_bytes()];
        assert!(producer.try_publish(&frame).expect("publish should succeed"));

        // Slot is full and nobody will release it; a stopped flag must get
        // the blocking publish out within one interval.
        let stop = StopFlag::new();
        stop.stop();
        let published = producer
            .publish_blocking(&frame, Duration::from_millis(1), &stop)
            .expect("blocking publish should not error");
        assert!(!published);
    }
}
