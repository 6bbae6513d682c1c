//! Slot layout: one flag byte followed by one raw frame.
//!
//! Both processes agree on the region name and the frame dimensions
//! out-of-band; nothing in the buffer is self-describing.

/// Offset of the ownership flag byte.
pub const FLAG_OFFSET: usize = 0;

/// Offset of the first payload byte.
pub const PAYLOAD_OFFSET: usize = 1;

/// Well-known region name shared with the producer.
#[cfg(windows)]
pub const DEFAULT_NAME: &str = "Local\\frameslot-frame";
#[cfg(not(windows))]
pub const DEFAULT_NAME: &str = "/frameslot-frame";

/// Frame dimensions of the reference deployment.
pub const DEFAULT_FORMAT: FrameFormat = FrameFormat::new(640, 640, 3);

/// Who owns the payload region, as encoded in the flag byte.
///
/// EMPTY: the producer owns the payload and may write it.
/// FULL: a complete frame is present; the consumer owns the payload for
/// reading and touches nothing but the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SlotState {
    Empty = 0,
    Full = 1,
}

impl SlotState {
    /// Decode a flag byte. Anything but 0 or 1 is not a valid state.
    pub fn from_byte(byte: u8) -> Option<SlotState> {
        match byte {
            0 => Some(SlotState::Empty),
            1 => Some(SlotState::Full),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Frame dimensions agreed out-of-band by producer and consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
    /// Samples per pixel (3 for RGB).
    pub channels: usize,
}

impl FrameFormat {
    pub const fn new(width: usize, height: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            channels,
        }
    }

    /// Payload size in bytes: `width * height * channels` u8 samples.
    pub const fn frame_bytes(&self) -> usize {
        self.width * self.height * self.channels
    }

    /// Total region size: flag byte plus payload.
    pub const fn region_bytes(&self) -> usize {
        PAYLOAD_OFFSET + self.frame_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_byte_roundtrip() {
        assert_eq!(SlotState::from_byte(0), Some(SlotState::Empty));
        assert_eq!(SlotState::from_byte(1), Some(SlotState::Full));
        assert_eq!(SlotState::from_byte(2), None);
        assert_eq!(SlotState::Empty.as_byte(), 0);
        assert_eq!(SlotState::Full.as_byte(), 1);
    }

    #[test]
    fn region_is_payload_plus_flag() {
        let format = FrameFormat::new(640, 640, 3);
        assert_eq!(format.frame_bytes(), 640 * 640 * 3);
        assert_eq!(format.region_bytes(), 640 * 640 * 3 + 1);
        assert_eq!(DEFAULT_FORMAT, format);
    }
}
