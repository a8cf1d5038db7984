//! Bridges decoder push cadence to audio engine pull cadence.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use ogv_core::{AudioBackend, OutputFormat, Result};
use tracing::{debug, info, trace};

use crate::buffer::{shared_ring_buffer, RingBuffer, SharedRingBuffer};

/// Producer handle given to the decode thread.
#[derive(Clone)]
pub struct AudioSender {
    ring_buffer: SharedRingBuffer,
}

impl AudioSender {
    /// Push decoded samples; overwrites the oldest buffered audio on overflow.
    pub fn stream(&self, samples: &[f32]) {
        trace!("Streaming {} samples", samples.len());
        self.ring_buffer.put(samples);
    }
}

/// Owns the sample ring buffer and the engine's output voice.
///
/// The voice is created on the first [`initialize`](Self::initialize) and
/// reused for every later play/stop cycle.
pub struct AudioStreamer {
    ring_buffer: SharedRingBuffer,
    backend: Box<dyn AudioBackend>,
    format: OutputFormat,
    voice_created: bool,
}

impl AudioStreamer {
    pub fn new(backend: Box<dyn AudioBackend>, format: OutputFormat, capacity: usize) -> Self {
        Self {
            ring_buffer: shared_ring_buffer(capacity),
            backend,
            format,
            voice_created: false,
        }
    }

    /// Create the output voice if needed and start the engine pulling.
    pub fn initialize(&mut self) -> Result<()> {
        if !self.voice_created {
            let ring_buffer = self.ring_buffer.clone();
            self.backend.create_voice(
                self.format,
                Box::new(move |output: &mut [f32]| Self::pull(&ring_buffer, output)),
            )?;
            self.voice_created = true;
            info!(
                "Audio voice created: {} Hz, {} channels",
                self.format.sample_rate, self.format.channels
            );
        }

        self.backend.play()?;
        debug!("Audio output started");
        Ok(())
    }

    /// Push decoded samples into the ring buffer.
    pub fn stream(&self, samples: &[f32]) {
        self.ring_buffer.put(samples);
    }

    /// A cloneable producer handle for the decode thread.
    pub fn sender(&self) -> AudioSender {
        AudioSender {
            ring_buffer: self.ring_buffer.clone(),
        }
    }

    /// The pull callback body.
    ///
    /// Fills `output` from the front until the buffer runs dry; the remainder
    /// of `output` is left as the engine handed it over.
    pub fn pull(ring_buffer: &RingBuffer, output: &mut [f32]) -> usize {
        ring_buffer.read(output)
    }

    /// Stop the output voice and drop any audio still buffered.
    ///
    /// The voice itself is kept for the next [`initialize`](Self::initialize).
    pub fn stop(&mut self) -> Result<()> {
        self.ring_buffer.clear();
        self.backend.stop()?;
        debug!("Audio output stopped");
        Ok(())
    }

    /// Samples currently buffered.
    pub fn buffered(&self) -> usize {
        self.ring_buffer.size()
    }

    pub const fn is_voice_created(&self) -> bool {
        self.voice_created
    }

    pub const fn format(&self) -> OutputFormat {
        self.format
    }
}
