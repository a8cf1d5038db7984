//! Scripted decoder and recording audio backend for controller tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use bytes::Bytes;
use ogv_core::{
    AudioBackend, AudioPacket, DecodeSession, Error, MediaSource, OutputFormat, PixelFormat,
    PlayerConfig, PullCallback, Result, VideoFrame,
};
use parking_lot::Mutex;

pub const WIDTH: u32 = 4;
pub const HEIGHT: u32 = 2;

pub fn frame(pts_ms: u32, fps: f64) -> VideoFrame {
    let pixels = Bytes::from(vec![0u8; VideoFrame::required_len(WIDTH, HEIGHT)]);
    VideoFrame::new(WIDTH, HEIGHT, fps, pts_ms, pixels).unwrap()
}

/// `count` frames at `fps`, timestamps rounded to whole milliseconds.
pub fn frames_at(fps: f64, count: u32) -> Vec<VideoFrame> {
    (0..count)
        .map(|i| frame((f64::from(i) * 1000.0 / fps).round() as u32, fps))
        .collect()
}

/// Stereo packets whose samples count up from zero across the whole script.
pub fn counting_packets(packets: usize, samples_per_packet: usize) -> Vec<AudioPacket> {
    (0..packets)
        .map(|p| {
            let samples = (0..samples_per_packet)
                .map(|s| (p * samples_per_packet + s) as f32)
                .collect();
            AudioPacket::new(samples, 2)
        })
        .collect()
}

/// Fast timings so tests finish quickly.
pub fn test_config() -> PlayerConfig {
    PlayerConfig {
        ring_capacity: 1 << 16,
        grace_period_ms: 100,
        decoder_ready_timeout_ms: 500,
        decoder_poll_interval_ms: 1,
        join_timeout_ms: 2_000,
        ..PlayerConfig::default()
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

pub struct ScriptedSession {
    initialized: bool,
    has_video: bool,
    frames: Mutex<VecDeque<VideoFrame>>,
    audio: Mutex<VecDeque<AudioPacket>>,
    stopped: AtomicBool,
    frames_taken: AtomicUsize,
    audio_threads: Mutex<HashSet<ThreadId>>,
    hold_audio: Arc<AtomicBool>,
}

impl ScriptedSession {
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub fn frames_taken(&self) -> usize {
        self.frames_taken.load(Ordering::Acquire)
    }

    /// Distinct threads that polled for audio.
    pub fn audio_thread_count(&self) -> usize {
        self.audio_threads.lock().len()
    }

    pub fn audio_remaining(&self) -> usize {
        self.audio.lock().len()
    }
}

impl DecodeSession for ScriptedSession {
    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn has_video_stream(&self) -> bool {
        self.has_video
    }

    fn available_video(&self) -> bool {
        !self.is_stopped() && !self.frames.lock().is_empty()
    }

    fn available_audio(&self) -> bool {
        self.audio_threads.lock().insert(thread::current().id());
        while self.hold_audio.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(1));
        }
        !self.is_stopped() && !self.audio.lock().is_empty()
    }

    fn is_decoding(&self) -> bool {
        !self.is_stopped() && (!self.frames.lock().is_empty() || !self.audio.lock().is_empty())
    }

    fn next_video_frame(&self) -> Option<VideoFrame> {
        let frame = self.frames.lock().pop_front();
        if frame.is_some() {
            self.frames_taken.fetch_add(1, Ordering::AcqRel);
        }
        frame
    }

    fn next_audio_packet(&self) -> Option<AudioPacket> {
        self.audio.lock().pop_front()
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }
}

/// What every session started by a [`ScriptedSource`] will contain.
#[derive(Clone)]
pub struct Script {
    pub initialized: bool,
    pub has_video: bool,
    pub frames: Vec<VideoFrame>,
    pub audio: Vec<AudioPacket>,
    pub supports_architecture: bool,
    /// While set, `available_audio` blocks the calling thread.
    pub hold_audio: Arc<AtomicBool>,
}

impl Script {
    pub fn new(frames: Vec<VideoFrame>, audio: Vec<AudioPacket>) -> Self {
        Self {
            initialized: true,
            has_video: true,
            frames,
            audio,
            supports_architecture: true,
            hold_audio: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[derive(Default)]
pub struct SourceLog {
    pub sessions: Mutex<Vec<Arc<ScriptedSession>>>,
    pub paths: Mutex<Vec<PathBuf>>,
}

impl SourceLog {
    pub fn session(&self, index: usize) -> Arc<ScriptedSession> {
        self.sessions.lock()[index].clone()
    }

    pub fn started(&self) -> usize {
        self.sessions.lock().len()
    }

    /// References to a session held by anything other than this log.
    pub fn outside_refs(&self, index: usize) -> usize {
        Arc::strong_count(&self.sessions.lock()[index]) - 1
    }
}

pub struct ScriptedSource {
    script: Script,
    log: Arc<SourceLog>,
}

impl ScriptedSource {
    pub fn new(script: Script) -> (Self, Arc<SourceLog>) {
        let log = Arc::new(SourceLog::default());
        (
            Self {
                script,
                log: log.clone(),
            },
            log,
        )
    }
}

impl MediaSource for ScriptedSource {
    fn start_decode(
        &self,
        path: &Path,
        _frame_queue_depth: u32,
        format: PixelFormat,
    ) -> Result<Arc<dyn DecodeSession>> {
        assert_eq!(format, PixelFormat::Iyuv);

        let session = Arc::new(ScriptedSession {
            initialized: self.script.initialized,
            has_video: self.script.has_video,
            frames: Mutex::new(self.script.frames.iter().cloned().collect()),
            audio: Mutex::new(self.script.audio.iter().cloned().collect()),
            stopped: AtomicBool::new(false),
            frames_taken: AtomicUsize::new(0),
            audio_threads: Mutex::new(HashSet::new()),
            hold_audio: self.script.hold_audio.clone(),
        });

        self.log.sessions.lock().push(session.clone());
        self.log.paths.lock().push(path.to_path_buf());
        Ok(session)
    }

    fn supports_current_architecture(&self) -> bool {
        self.script.supports_architecture
    }
}

#[derive(Default)]
pub struct BackendLog {
    pub voices: usize,
    pub plays: usize,
    pub stops: usize,
    pub format: Option<OutputFormat>,
    pub callback: Option<PullCallback>,
}

pub struct RecordingBackend {
    log: Arc<Mutex<BackendLog>>,
    fail_create: bool,
}

impl RecordingBackend {
    pub fn new() -> (Self, Arc<Mutex<BackendLog>>) {
        Self::with_failure(false)
    }

    pub fn with_failure(fail_create: bool) -> (Self, Arc<Mutex<BackendLog>>) {
        let log = Arc::new(Mutex::new(BackendLog::default()));
        (
            Self {
                log: log.clone(),
                fail_create,
            },
            log,
        )
    }
}

impl AudioBackend for RecordingBackend {
    fn create_voice(&mut self, format: OutputFormat, callback: PullCallback) -> Result<()> {
        if self.fail_create {
            return Err(Error::AudioEngine("device unavailable".to_string()));
        }
        let mut log = self.log.lock();
        log.voices += 1;
        log.format = Some(format);
        log.callback = Some(callback);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.log.lock().plays += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.log.lock().stops += 1;
        Ok(())
    }
}
