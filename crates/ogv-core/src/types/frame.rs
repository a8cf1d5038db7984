//! Decoded video frame types.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use bytes::Bytes;

use crate::{Error, Result};

/// Pixel layout requested from the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// Packed planar YUV 4:2:0 (Y, then U, then V in one buffer).
    #[default]
    Iyuv,
    /// Interleaved 8-bit RGBA.
    Rgba,
}

/// A decoded video frame in packed planar 4:2:0 layout.
///
/// The three planes live in one contiguous buffer:
///
/// | plane | offset                          | size                    |
/// |-------|---------------------------------|-------------------------|
/// | Y     | `0`                             | `width * height`        |
/// | U     | `width * height`                | `width/2 * height/2`    |
/// | V     | `width * height + width/2 * height/2` | `width/2 * height/2` |
///
/// This layout is dictated by the decoder's `Iyuv` output and must change
/// together with it.
///
/// Dropping the frame releases the decoder buffer it refers to.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    /// Nominal frame rate reported by the decoder.
    fps: f64,
    /// Presentation timestamp relative to playback start.
    pts_ms: u32,
    pixels: Bytes,
}

impl VideoFrame {
    /// Wrap a decoder-produced pixel buffer.
    ///
    /// Fails if `pixels` is shorter than the 4:2:0 layout for the given size.
    pub fn new(width: u32, height: u32, fps: f64, pts_ms: u32, pixels: Bytes) -> Result<Self> {
        let required = Self::required_len(width, height);
        if pixels.len() < required {
            return Err(Error::InvalidFrame(format!(
                "{width}x{height} frame needs {required} bytes, got {}",
                pixels.len()
            )));
        }

        Ok(Self {
            width,
            height,
            fps,
            pts_ms,
            pixels,
        })
    }

    /// Bytes needed to hold a `width`×`height` 4:2:0 frame.
    pub const fn required_len(width: u32, height: u32) -> usize {
        let luma = width as usize * height as usize;
        let chroma = (width / 2) as usize * (height / 2) as usize;
        luma + 2 * chroma
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn chroma_width(&self) -> u32 {
        self.width / 2
    }

    pub const fn chroma_height(&self) -> u32 {
        self.height / 2
    }

    pub const fn fps(&self) -> f64 {
        self.fps
    }

    /// Presentation timestamp in milliseconds.
    pub const fn pts_ms(&self) -> u32 {
        self.pts_ms
    }

    const fn luma_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    const fn chroma_len(&self) -> usize {
        self.chroma_width() as usize * self.chroma_height() as usize
    }

    /// The full-resolution luma (Y) plane.
    pub fn luma(&self) -> &[u8] {
        &self.pixels[..self.luma_len()]
    }

    /// The half-resolution Cb (U) plane.
    pub fn chroma_u(&self) -> &[u8] {
        let start = self.luma_len();
        &self.pixels[start..start + self.chroma_len()]
    }

    /// The half-resolution Cr (V) plane.
    pub fn chroma_v(&self) -> &[u8] {
        let start = self.luma_len() + self.chroma_len();
        &self.pixels[start..start + self.chroma_len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame_with_planes(width: u32, height: u32) -> VideoFrame {
        let luma = (width * height) as usize;
        let chroma = ((width / 2) * (height / 2)) as usize;
        let mut pixels = vec![1u8; luma];
        pixels.extend(std::iter::repeat(2u8).take(chroma));
        pixels.extend(std::iter::repeat(3u8).take(chroma));
        VideoFrame::new(width, height, 30.0, 0, Bytes::from(pixels)).unwrap()
    }

    #[test]
    fn test_plane_offsets() {
        let frame = frame_with_planes(8, 4);

        assert_eq!(frame.luma().len(), 32);
        assert_eq!(frame.chroma_u().len(), 8);
        assert_eq!(frame.chroma_v().len(), 8);
        assert!(frame.luma().iter().all(|&b| b == 1));
        assert!(frame.chroma_u().iter().all(|&b| b == 2));
        assert!(frame.chroma_v().iter().all(|&b| b == 3));
    }

    #[test]
    fn test_short_buffer_rejected() {
        let result = VideoFrame::new(4, 4, 30.0, 0, Bytes::from(vec![0u8; 10]));
        assert!(matches!(result, Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn test_chroma_geometry() {
        let frame = frame_with_planes(640, 360);
        assert_eq!(frame.chroma_width(), 320);
        assert_eq!(frame.chroma_height(), 180);
    }

    proptest! {
        #[test]
        fn planes_tile_the_layout(half_w in 1u32..64, half_h in 1u32..64) {
            let frame = frame_with_planes(half_w * 2, half_h * 2);
            let total = frame.luma().len() + frame.chroma_u().len() + frame.chroma_v().len();
            prop_assert_eq!(total, VideoFrame::required_len(half_w * 2, half_h * 2));
            prop_assert!(frame.chroma_v().iter().all(|&b| b == 3));
        }
    }
}
