//! Interfaces of the external collaborators: the media decoder and the
//! audio output engine.

use std::path::Path;
use std::sync::Arc;

use crate::{AudioPacket, PixelFormat, Result, VideoFrame};

/// Factory for decode sessions (the external video/audio decoder).
pub trait MediaSource {
    /// Open a decode session. Decoding proceeds asynchronously; callers must
    /// wait for [`DecodeSession::is_initialized`] before pulling frames.
    fn start_decode(
        &self,
        path: &Path,
        frame_queue_depth: u32,
        format: PixelFormat,
    ) -> Result<Arc<dyn DecodeSession>>;

    /// Whether the decoder can run inside the current process.
    fn supports_current_architecture(&self) -> bool {
        true
    }
}

/// A running decode session.
///
/// Shared between the host thread (video) and the decode thread (audio), so
/// every method takes `&self`.
pub trait DecodeSession: Send + Sync {
    fn is_initialized(&self) -> bool;

    fn has_video_stream(&self) -> bool;

    /// A decoded video frame is ready to be taken.
    fn available_video(&self) -> bool;

    /// A decoded audio packet is ready to be taken.
    fn available_audio(&self) -> bool;

    /// False once the decoder has produced everything it ever will.
    fn is_decoding(&self) -> bool;

    fn next_video_frame(&self) -> Option<VideoFrame>;

    fn next_audio_packet(&self) -> Option<AudioPacket>;

    /// Stop decoding. Frames and packets already handed out stay valid.
    fn stop(&self);
}

/// Output format requested from the audio engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub channels: u16,
    pub sample_rate: u32,
}

/// Pull callback registered with the audio engine.
///
/// Fills the front of the slice with interleaved samples and returns how many
/// slots were written. Slots past the returned count are left untouched.
/// Must not block.
pub type PullCallback = Box<dyn FnMut(&mut [f32]) -> usize + Send>;

/// The external audio output engine.
pub trait AudioBackend {
    /// Create the output voice and register the pull callback.
    fn create_voice(&mut self, format: OutputFormat, callback: PullCallback) -> Result<()>;

    /// Start (or resume) pulling from the callback.
    fn play(&mut self) -> Result<()>;

    /// Stop pulling. The voice stays allocated.
    fn stop(&mut self) -> Result<()>;
}
