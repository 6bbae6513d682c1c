use std::sync::atomic::{AtomicU8, Ordering};

use frameslot_shm::ShmRegion;
use tracing::{debug, trace};

use crate::error::Result;
use crate::slot::{FrameFormat, SlotState, FLAG_OFFSET, PAYLOAD_OFFSET};

/// Consumer endpoint of the frame slot.
///
/// Exactly one consumer may be attached at a time; a second consumer would
/// race on the flag and corrupt the handshake.
///
/// The acquire/release discipline is enforced by the borrow checker: a
/// [`FrameView`] borrows the consumer, so the payload must be copied out
/// (the view dropped) before [`release`](FrameConsumer::release) can hand
/// the slot back to the producer, and release happens strictly before the
/// next acquire.
pub struct FrameConsumer {
    region: ShmRegion,
    format: FrameFormat,
}

impl FrameConsumer {
    /// Map the named slot for reading. A single attempt: while the producer
    /// has not created the name yet this fails with
    /// [`ChannelError::Unavailable`](crate::ChannelError::Unavailable) and
    /// the caller retries (see [`poll::attach`](crate::poll::attach)); any
    /// other mapping failure is fatal.
    pub fn connect(name: &str, format: FrameFormat) -> Result<FrameConsumer> {
        let region = ShmRegion::open(name, format.region_bytes())?;
        debug!(name, ?format, "attached to frame slot");
        Ok(FrameConsumer { region, format })
    }

    fn flag(&self) -> &AtomicU8 {
        // SAFETY: the region is at least `region_bytes()` long, so the flag
        // byte exists, and AtomicU8 has the same layout as u8. Atomic access
        // keeps the cross-process flag reads and writes race-free.
        unsafe { AtomicU8::from_ptr(self.region.as_ptr().add(FLAG_OFFSET)) }
    }

    /// Non-blocking flag check.
    ///
    /// Returns `None` while the slot is EMPTY. When the slot is FULL,
    /// returns a read-only view of the payload without copying and without
    /// clearing the flag. Waiting cadence is a policy layered on top, see
    /// [`poll::acquire_blocking`](crate::poll::acquire_blocking).
    pub fn try_acquire_frame(&self) -> Option<FrameView<'_>> {
        if self.flag().load(Ordering::Acquire) != SlotState::Full.as_byte() {
            return None;
        }
        trace!("slot is full, acquiring frame");
        // SAFETY: FULL transfers payload ownership to this side; the
        // producer will not write again until we store EMPTY, and the
        // Acquire load above orders this read after the producer's writes.
        let data = unsafe {
            std::slice::from_raw_parts(
                self.region.as_ptr().add(PAYLOAD_OFFSET),
                self.format.frame_bytes(),
            )
        };
        Some(FrameView {
            data,
            format: self.format,
        })
    }

    /// Store EMPTY, returning payload ownership to the producer.
    ///
    /// Call only after every byte needed from the current frame has been
    /// copied out; the producer may start overwriting the payload the
    /// moment the flag flips.
    pub fn release(&mut self) {
        trace!("releasing slot");
        self.flag()
            .store(SlotState::Empty.as_byte(), Ordering::Release);
    }

    /// Unmap the region. The named object itself stays alive; the producer
    /// owns its destruction.
    pub fn close(self) {
        debug!(name = self.region.name(), "closing frame slot consumer");
        drop(self);
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    pub fn name(&self) -> &str {
        self.region.name()
    }
}

/// A read-only view of the payload of an acquired frame.
///
/// Borrows the consumer; must be dropped (after copying out whatever the
/// caller needs) before the slot can be released.
#[derive(Debug)]
pub struct FrameView<'a> {
    data: &'a [u8],
    format: FrameFormat,
}

impl FrameView<'_> {
    /// The raw payload in source channel order, row-major, no padding.
    pub fn bytes(&self) -> &[u8] {
        self.data
    }

    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Copy the payload into process-local memory.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.to_vec()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ChannelError;
    use crate::producer::FrameProducer;

    fn unique_name(tag: &str) -> String {
        format!(
            "/frameslot-consumer-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        )
    }

    const SMALL: FrameFormat = FrameFormat::new(4, 2, 3);

    #[test]
    fn connect_before_producer_is_unavailable() {
        let name = unique_name("early");
        let result = FrameConsumer::connect(&name, SMALL);
        assert!(matches!(result, Err(ChannelError::Unavailable { .. })));
    }

    #[test]
    fn empty_slot_yields_no_frame() {
        let name = unique_name("empty");
        let _producer = FrameProducer::create(&name, SMALL).expect("producer should create slot");
        let consumer = FrameConsumer::connect(&name, SMALL).expect("consumer should connect");

        assert!(consumer.try_acquire_frame().is_none());
    }

    #[test]
    fn full_slot_is_read_exactly_once() {
        let name = unique_name("once");
        let mut producer =
            FrameProducer::create(&name, SMALL).expect("producer should create slot");
        let mut consumer = FrameConsumer::connect(&name, SMALL).expect("consumer should connect");

        let frame = vec![0x5A; SMALL.frame_bytes()];
        assert!(producer.try_publish(&frame).expect("publish should succeed"));

        let copied = {
            let view = consumer.try_acquire_frame().expect("slot should be full");
            assert_eq!(view.bytes(), frame.as_slice());
            assert_eq!(view.format(), SMALL);
            view.to_vec()
        };
        assert_eq!(copied, frame);

        // Until release, the same frame is still acquirable (the primitive
        // does not clear the flag)...
        assert!(consumer.try_acquire_frame().is_some());

        // ...but after release the slot is empty until the producer
        // publishes again.
        consumer.release();
        assert!(consumer.try_acquire_frame().is_none());
        assert!(producer.slot_is_empty());
    }

    #[test]
    fn release_lets_next_frame_through() {
        let name = unique_name("next");
        let mut producer =
            FrameProducer::create(&name, SMALL).expect("producer should create slot");
        let mut consumer = FrameConsumer::connect(&name, SMALL).expect("consumer should connect");

        let first = vec![0x11; SMALL.frame_bytes()];
        let second = vec![0x22; SMALL.frame_bytes()];

        assert!(producer.try_publish(&first).expect("publish should succeed"));
        // Slot is full: the producer must wait, not overwrite.
        assert!(!producer
            .try_publish(&second)
            .expect("publish attempt should not error"));

        {
            let view = consumer.try_acquire_frame().expect("slot should be full");
            assert_eq!(view.bytes(), first.as_slice());
        }
        consumer.release();

        assert!(producer.try_publish(&second).expect("publish should succeed"));
        let view = consumer.try_acquire_frame().expect("slot should be full");
        assert_eq!(view.bytes(), second.as_slice());
    }

    #[test]
    fn consumer_close_keeps_name_alive() {
        let name = unique_name("close");
        let _producer = FrameProducer::create(&name, SMALL).expect("producer should create slot");

        let consumer = FrameConsumer::connect(&name, SMALL).expect("consumer should connect");
        consumer.close();

        // The producer still owns the name; a fresh consumer can attach.
        let again = FrameConsumer::connect(&name, SMALL);
        assert!(again.is_ok());
    }
}
