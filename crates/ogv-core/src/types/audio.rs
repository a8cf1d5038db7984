//! Decoded audio packet types.

/// A packet of interleaved PCM samples produced by the decoder.
///
/// Dropping the packet releases it back to the decoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioPacket {
    /// Interleaved samples (e.g. L/R/L/R for stereo).
    pub samples: Vec<f32>,
    /// Number of sample frames (one sample per channel each).
    pub frames: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

impl AudioPacket {
    /// Build a packet from interleaved samples.
    pub fn new(samples: Vec<f32>, channels: u16) -> Self {
        let frames = if channels == 0 {
            0
        } else {
            (samples.len() / usize::from(channels)) as u32
        };
        Self {
            samples,
            frames,
            channels,
        }
    }

    /// Number of valid samples (`frames * channels`), clamped to the buffer.
    pub fn sample_count(&self) -> usize {
        (self.frames as usize * usize::from(self.channels)).min(self.samples.len())
    }

    /// The valid interleaved samples.
    pub fn as_slice(&self) -> &[f32] {
        &self.samples[..self.sample_count()]
    }
}
