use frameslot_channel::FrameFormat;

use crate::display::DisplayError;

/// One output surface for converted frames.
///
/// The display loop pushes one frame per cycle and polls for a quit signal
/// once per cycle. Implemented by the minifb window for real use and by
/// in-memory fakes in tests.
pub trait DisplaySink {
    /// Show one converted frame (`0x00RRGGBB` pixels, row-major).
    fn present(&mut self, format: FrameFormat, pixels: &[u32]) -> Result<(), DisplayError>;

    /// Non-blocking check of the user-initiated stop condition.
    fn wants_close(&self) -> bool;
}

#[cfg(feature = "window")]
pub use window::WindowSink;

#[cfg(feature = "window")]
mod window {
    use frameslot_channel::FrameFormat;
    use minifb::{Key, Window, WindowOptions};
    use tracing::debug;

    use super::DisplaySink;
    use crate::display::DisplayError;

    /// A minifb window sized to the frame format.
    pub struct WindowSink {
        window: Window,
    }

    impl WindowSink {
        pub fn new(title: &str, format: FrameFormat) -> Result<Self, DisplayError> {
            let window = Window::new(
                title,
                format.width,
                format.height,
                WindowOptions::default(),
            )
            .map_err(|err| DisplayError::Sink(err.to_string()))?;
            debug!(
                width = format.width,
                height = format.height,
                "opened display window"
            );
            Ok(Self { window })
        }
    }

    impl DisplaySink for WindowSink {
        fn present(&mut self, format: FrameFormat, pixels: &[u32]) -> Result<(), DisplayError> {
            self.window
                .update_with_buffer(pixels, format.width, format.height)
                .map_err(|err| DisplayError::Sink(err.to_string()))
        }

        fn wants_close(&self) -> bool {
            !self.window.is_open()
                || self.window.is_key_down(Key::Escape)
                || self.window.is_key_down(Key::Q)
        }
    }
}
