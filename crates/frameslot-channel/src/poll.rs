//! Busy-wait policies composed on top of the non-blocking primitives.
//!
//! Two loops are deliberately unbounded: waiting for the producer to create
//! the slot (attach) and waiting for the next frame (acquire). Both trade
//! CPU for minimal latency instead of using a cross-process wait primitive,
//! and both observe a [`StopFlag`] within one polling interval. Callers who
//! need deterministic tests use the `_with` variants and inject the sleep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::consumer::{FrameConsumer, FrameView};
use crate::error::{ChannelError, Result};
use crate::slot::FrameFormat;

/// Cloneable cancellation signal for the polling loops.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the flag. Every loop holding a clone exits within one polling
    /// interval.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Polling cadence. The defaults match the reference deployment's
/// producer-side timing assumptions.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between flag checks while waiting for a frame.
    pub acquire_interval: Duration,
    /// Delay between connect attempts while the slot name does not exist.
    pub attach_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            acquire_interval: Duration::from_millis(1),
            attach_interval: Duration::from_millis(500),
        }
    }
}

/// Retry [`FrameConsumer::connect`] until the producer creates the slot.
///
/// Returns `Ok(None)` if `stop` fires first. Unavailability is recovered
/// locally and never escalated; any other mapping failure is returned as
/// the fatal error it is.
pub fn attach(
    name: &str,
    format: FrameFormat,
    config: &PollConfig,
    stop: &StopFlag,
) -> Result<Option<FrameConsumer>> {
    attach_with(name, format, config, stop, std::thread::sleep)
}

/// [`attach`] with an injected sleep, for tests that must not depend on
/// real timing.
pub fn attach_with(
    name: &str,
    format: FrameFormat,
    config: &PollConfig,
    stop: &StopFlag,
    mut sleep: impl FnMut(Duration),
) -> Result<Option<FrameConsumer>> {
    loop {
        if stop.is_stopped() {
            return Ok(None);
        }
        match FrameConsumer::connect(name, format) {
            Ok(consumer) => {
                info!(name, "frame slot available");
                return Ok(Some(consumer));
            }
            Err(ChannelError::Unavailable { .. }) => {
                debug!(name, "frame slot not created yet, retrying");
            }
            Err(err) => return Err(err),
        }
        sleep(config.attach_interval);
    }
}

/// Poll [`FrameConsumer::try_acquire_frame`] until a frame appears.
///
/// Returns `None` if `stop` fires first. There is no timeout: an idle
/// producer stalls the consumer without error, by design.
pub fn acquire_blocking<'a>(
    consumer: &'a FrameConsumer,
    config: &PollConfig,
    stop: &StopFlag,
) -> Option<FrameView<'a>> {
    acquire_blocking_with(consumer, config, stop, std::thread::sleep)
}

/// [`acquire_blocking`] with an injected sleep, for tests that must not
/// depend on real timing.
pub fn acquire_blocking_with<'a>(
    consumer: &'a FrameConsumer,
    config: &PollConfig,
    stop: &StopFlag,
    mut sleep: impl FnMut(Duration),
) -> Option<FrameView<'a>> {
    loop {
        if stop.is_stopped() {
            return None;
        }
        if let Some(view) = consumer.try_acquire_frame() {
            return Some(view);
        }
        sleep(config.acquire_interval);
    }
}
