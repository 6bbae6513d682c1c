//! Channel-order conversion from the producer's layout to the sink's.
//!
//! Pure per-pixel permutations: no resampling, no color-space math. The
//! producer writes 3-channel RGB; the window sink wants `0x00RRGGBB` packed
//! u32 pixels, which on little-endian machines is byte order B,G,R,0 — the
//! classic RGB to BGR swap.

use frameslot_channel::FrameFormat;

/// Swap a 3-channel buffer between RGB and BGR orderings.
///
/// The permutation is its own inverse. Pixel values are untouched: an
/// all-red `[255, 0, 0]` pixel comes out as `[0, 0, 255]`.
pub fn rgb_to_bgr(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for px in data.chunks_exact(3) {
        out.extend_from_slice(&[px[2], px[1], px[0]]);
    }
    out
}

/// Pack a 3-channel RGB buffer into `0x00RRGGBB` u32 pixels for the window
/// buffer.
pub fn rgb_to_argb(format: FrameFormat, data: &[u8]) -> Vec<u32> {
    let mut buf = Vec::with_capacity(format.width * format.height);
    for px in data.chunks_exact(3) {
        buf.push(pack_argb(px[0], px[1], px[2]));
    }
    buf
}

fn pack_argb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_pixel_permutes_to_bgr() {
        let rgb = [255u8, 0, 0, 0, 255, 0, 0, 0, 255];
        let bgr = rgb_to_bgr(&rgb);
        assert_eq!(bgr, [0, 0, 255, 0, 255, 0, 255, 0, 0]);
    }

    #[test]
    fn permutation_is_involutive() {
        let rgb = [1u8, 2, 3, 200, 100, 50];
        assert_eq!(rgb_to_bgr(&rgb_to_bgr(&rgb)), rgb);
    }

    #[test]
    fn packs_rgb_into_argb_words() {
        let format = FrameFormat::new(2, 1, 3);
        let rgb = [255u8, 0, 0, 0x12, 0x34, 0x56];
        let packed = rgb_to_argb(format, &rgb);
        assert_eq!(packed, [0x00FF0000, 0x00123456]);
    }

    #[test]
    fn packed_words_match_bgr_byte_order() {
        // On little-endian, the u32 packing lays bytes out as B,G,R,0 —
        // the same permutation rgb_to_bgr performs.
        let rgb = [0xABu8, 0xCD, 0xEF];
        let packed = rgb_to_argb(FrameFormat::new(1, 1, 3), &rgb);
        assert_eq!(packed[0].to_le_bytes(), [0xEF, 0xCD, 0xAB, 0x00]);
        assert_eq!(&rgb_to_bgr(&rgb)[..], &packed[0].to_le_bytes()[..3]);
    }
}
