//! Single-slot, flag-synchronized shared-memory frame channel.
//!
//! This is the core value-add layer of frameslot. A fixed-size named region
//! holds exactly one raw frame plus a one-byte ownership flag:
//! - Byte 0: slot state, `EMPTY(0)` or `FULL(1)`
//! - Bytes 1..: the frame payload, `height x width x channels` u8 samples,
//!   row-major, no padding
//!
//! The flag is the single source of truth for payload ownership. The
//! producer writes only while the slot is EMPTY and then stores FULL; the
//! consumer reads only while the slot is FULL and then stores EMPTY. No
//! other lock exists, so a frame is never read while being written, never
//! read twice, and the producer always learns when the slot is free.

pub mod consumer;
pub mod error;
pub mod poll;
pub mod producer;
pub mod slot;

pub use consumer::{FrameConsumer, FrameView};
pub use error::{ChannelError, Result};
pub use poll::{acquire_blocking, attach, PollConfig, StopFlag};
pub use producer::FrameProducer;
pub use slot::{FrameFormat, SlotState, DEFAULT_FORMAT, DEFAULT_NAME, FLAG_OFFSET, PAYLOAD_OFFSET};
