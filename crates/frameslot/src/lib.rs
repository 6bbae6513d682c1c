//! Single-slot shared-memory frame handoff with a minimal viewer.
//!
//! A producer process writes one raw video frame at a time into a named
//! shared-memory slot; this crate consumes it: attach to the slot, busy-poll
//! the ownership flag, copy the frame out, permute its channel order for the
//! display sink, and hand the slot back.
//!
//! # Crate structure
//!
//! - [`shm`] — Named shared-memory mapping (POSIX shm / Win32 file mapping)
//! - [`channel`] — The EMPTY/FULL flag handshake and polling policies
//! - [`convert`] — Channel-order permutation for the display sink
//! - [`sink`] — Display sink abstraction (minifb window behind `window`)
//! - [`display`] — The consumer loop: acquire, convert, release, present

pub mod convert;
pub mod display;
pub mod sink;

#[cfg(feature = "cli")]
pub mod logging;

/// Re-export shared-memory types.
pub mod shm {
    pub use frameslot_shm::*;
}

/// Re-export channel types.
pub mod channel {
    pub use frameslot_channel::*;
}

pub use display::{DisplayConfig, DisplayError, DisplayLoop};
pub use sink::DisplaySink;

#[cfg(feature = "window")]
pub use sink::WindowSink;
