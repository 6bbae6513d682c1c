use frameslot_channel::{poll, ChannelError, FrameFormat, PollConfig, StopFlag};
use tracing::{debug, info};

use crate::convert;
use crate::sink::DisplaySink;

/// Errors that terminate the display loop.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    /// The output surface could not be created or updated. Fatal.
    #[error("display sink failure: {0}")]
    Sink(String),

    /// A fatal channel error (transient unavailability is handled inside
    /// the attach loop and never reaches here).
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Configuration of the consumer loop.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Shared-memory name of the frame slot; must match the producer.
    pub name: String,
    /// Frame dimensions; must match the producer.
    pub format: FrameFormat,
    /// Busy-wait cadence for attach and acquire.
    pub poll: PollConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            name: frameslot_channel::DEFAULT_NAME.to_string(),
            format: frameslot_channel::DEFAULT_FORMAT,
            poll: PollConfig::default(),
        }
    }
}

/// The consumer cycle: acquire a frame, convert it, release the slot,
/// present the frame, check the stop condition, repeat.
pub struct DisplayLoop {
    config: DisplayConfig,
}

impl DisplayLoop {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    /// Run until `stop` fires or the sink asks to close.
    ///
    /// Attaches first (retrying while the producer has not created the
    /// slot), then cycles. The slot is released only after the conversion
    /// has copied every byte it needs out of the payload, and strictly
    /// before the next acquire, so the producer never overwrites bytes
    /// still being read.
    pub fn run(&self, sink: &mut impl DisplaySink, stop: &StopFlag) -> Result<(), DisplayError> {
        let config = &self.config;

        let Some(mut consumer) = poll::attach(&config.name, config.format, &config.poll, stop)?
        else {
            debug!("stopped while waiting for the producer");
            return Ok(());
        };

        let mut frames = 0u64;
        loop {
            if stop.is_stopped() || sink.wants_close() {
                break;
            }

            let pixels = {
                let Some(view) = poll::acquire_blocking(&consumer, &config.poll, stop) else {
                    break;
                };
                convert::rgb_to_argb(config.format, view.bytes())
            };
            // The view is gone and the pixels are local: hand the slot back
            // before the (slow) present call.
            consumer.release();

            sink.present(config.format, &pixels)?;
            frames += 1;
        }

        info!(frames, "display loop finished");
        consumer.close();
        Ok(())
    }
}
