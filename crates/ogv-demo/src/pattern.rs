//! Synthetic media source: a scrolling luma gradient and a 440 Hz tone.

use std::f32::consts::TAU;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use ogv_core::{AudioPacket, DecodeSession, MediaSource, PixelFormat, Result, VideoFrame};
use parking_lot::Mutex;
use tracing::debug;

const TONE_HZ: f32 = 440.0;
const PACKET_FRAMES: u64 = 1024;

/// Produces test-pattern sessions regardless of the requested path.
pub struct TestPatternSource {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_ms: u32,
}

impl MediaSource for TestPatternSource {
    fn start_decode(
        &self,
        path: &Path,
        frame_queue_depth: u32,
        _format: PixelFormat,
    ) -> Result<Arc<dyn DecodeSession>> {
        debug!(
            "Test pattern for {} (queue depth {frame_queue_depth})",
            path.display()
        );

        let total_frames = (f64::from(self.duration_ms) * self.fps / 1000.0) as u32;
        let total_audio_frames = u64::from(self.duration_ms) * u64::from(self.sample_rate) / 1000;

        Ok(Arc::new(TestPatternSession {
            width: self.width,
            height: self.height,
            fps: self.fps,
            sample_rate: self.sample_rate,
            channels: self.channels,
            total_frames,
            total_audio_frames,
            progress: Mutex::new(Progress::default()),
            stopped: AtomicBool::new(false),
        }))
    }
}

#[derive(Default)]
struct Progress {
    frames: u32,
    audio_frames: u64,
}

struct TestPatternSession {
    width: u32,
    height: u32,
    fps: f64,
    sample_rate: u32,
    channels: u16,
    total_frames: u32,
    total_audio_frames: u64,
    progress: Mutex<Progress>,
    stopped: AtomicBool,
}

impl TestPatternSession {
    fn render(&self, index: u32) -> Option<VideoFrame> {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut pixels = vec![128u8; VideoFrame::required_len(self.width, self.height)];
        for (y, row) in pixels[..w * h].chunks_exact_mut(w).enumerate() {
            for (x, luma) in row.iter_mut().enumerate() {
                *luma = ((x + y + index as usize * 4) % 256) as u8;
            }
        }

        let pts_ms = (f64::from(index) * 1000.0 / self.fps).round() as u32;
        VideoFrame::new(self.width, self.height, self.fps, pts_ms, Bytes::from(pixels)).ok()
    }
}

impl DecodeSession for TestPatternSession {
    fn is_initialized(&self) -> bool {
        true
    }

    fn has_video_stream(&self) -> bool {
        true
    }

    fn available_video(&self) -> bool {
        !self.stopped.load(Ordering::Acquire) && self.progress.lock().frames < self.total_frames
    }

    fn available_audio(&self) -> bool {
        !self.stopped.load(Ordering::Acquire)
            && self.progress.lock().audio_frames < self.total_audio_frames
    }

    fn is_decoding(&self) -> bool {
        self.available_video() || self.available_audio()
    }

    fn next_video_frame(&self) -> Option<VideoFrame> {
        let index = {
            let mut progress = self.progress.lock();
            if progress.frames >= self.total_frames {
                return None;
            }
            progress.frames += 1;
            progress.frames - 1
        };
        self.render(index)
    }

    fn next_audio_packet(&self) -> Option<AudioPacket> {
        let start = {
            let mut progress = self.progress.lock();
            if progress.audio_frames >= self.total_audio_frames {
                return None;
            }
            let start = progress.audio_frames;
            progress.audio_frames = (start + PACKET_FRAMES).min(self.total_audio_frames);
            start
        };

        let end = (start + PACKET_FRAMES).min(self.total_audio_frames);
        let rate = self.sample_rate as f32;
        let samples = (start..end)
            .flat_map(|n| {
                let value = (TAU * TONE_HZ * n as f32 / rate).sin() * 0.2;
                std::iter::repeat(value).take(usize::from(self.channels))
            })
            .collect();
        Some(AudioPacket::new(samples, self.channels))
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}
