//! Cross-platform named shared-memory mapping.
//!
//! Provides a unified interface over the platform primitives for a named,
//! fixed-size shared-memory object:
//! - POSIX `shm_open` + `mmap` (Linux/macOS)
//! - Win32 file mappings (Windows)
//!
//! This is the lowest layer of frameslot. Everything else builds on top of
//! the [`ShmRegion`] type provided here.

pub mod error;
pub mod region;

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

pub use error::{Result, ShmError};
pub use region::ShmRegion;
