//! Playback controller coordinating the decode thread, audio, and video.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use ogv_audio::{AudioSender, AudioStreamer};
use ogv_core::{
    AudioBackend, DecodeSession, Error, MediaSource, PixelFormat, PlaybackState, PlayerConfig,
    Result, VideoFrame,
};
use tracing::{debug, error, info, warn};

use crate::pacer::{FramePacer, PacerState};

/// A running decode-producer thread.
///
/// Kept after a join timeout so the thread can still be observed and reaped.
struct DecodeThread {
    handle: JoinHandle<()>,
    /// Dropping this sender cancels the thread.
    cancel_tx: Option<Sender<()>>,
    /// Disconnects once the thread has released its session.
    done_rx: Receiver<()>,
}

/// Plays one media file inside a host's update loop.
///
/// The host calls [`play`](Self::play) and [`stop`](Self::stop), feeds
/// [`on_host_tick`](Self::on_host_tick) once per update with the frame delta,
/// and uploads the three planes of the current frame when drawing.
pub struct PlaybackController {
    config: PlayerConfig,
    source: Box<dyn MediaSource>,
    path: PathBuf,
    audio: AudioStreamer,
    pacer: FramePacer,
    state: PlaybackState,
    decode_thread: Option<DecodeThread>,
    /// Set when the host object is torn down.
    disposed: Arc<AtomicBool>,
    /// Host time since the last `play()`, including the grace period.
    since_play_ms: f64,
    /// Playback position driving the pacer.
    elapsed_ms: f64,
}

impl PlaybackController {
    /// Create a stopped controller. No decoder or audio resources are opened
    /// until the first [`play`](Self::play).
    pub fn new(
        source: Box<dyn MediaSource>,
        backend: Box<dyn AudioBackend>,
        path: impl Into<PathBuf>,
        config: PlayerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let audio = AudioStreamer::new(backend, config.output_format(), config.ring_capacity);

        Ok(Self {
            config,
            source,
            path: path.into(),
            audio,
            pacer: FramePacer::new(),
            state: PlaybackState::Stopped,
            decode_thread: None,
            disposed: Arc::new(AtomicBool::new(false)),
            since_play_ms: 0.0,
            elapsed_ms: 0.0,
        })
    }

    /// Start playback. No-op while already playing.
    ///
    /// On failure every resource opened by this call is released again and
    /// the controller stays stopped.
    pub fn play(&mut self) -> Result<()> {
        if self.state.is_playing() {
            return Ok(());
        }

        if !self.source.supports_current_architecture() {
            warn!(
                "Can't play video on this architecture ({})",
                std::env::consts::ARCH
            );
            return Err(Error::ArchitectureUnsupported(
                std::env::consts::ARCH.to_string(),
            ));
        }

        if let Err(e) = self.start() {
            warn!("Video playback failed to start: {e}");
            self.release_resources();
            return Err(e);
        }

        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.join_decode_thread()?;

        if self.pacer.state() != PacerState::Ready {
            self.initialize()?;
        }

        let session = self
            .pacer
            .session()
            .ok_or_else(|| Error::InvalidState("no decode session after open".to_string()))?;
        self.spawn_decode_thread(session)?;

        self.state = PlaybackState::Playing;
        self.since_play_ms = 0.0;
        self.elapsed_ms = 0.0;

        info!("Playback started: {}", self.path.display());
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        self.audio.initialize()?;

        let session = self.source.start_decode(
            &self.path,
            self.config.frame_queue_depth,
            PixelFormat::Iyuv,
        )?;

        self.pacer.open(
            session,
            self.config.decoder_ready_timeout(),
            self.config.decoder_poll_interval(),
        )
    }

    fn spawn_decode_thread(&mut self, session: Arc<dyn DecodeSession>) -> Result<()> {
        let (cancel_tx, cancel_rx) = bounded(1);
        let (done_tx, done_rx) = bounded(1);

        let pump = AudioPump {
            session,
            sender: self.audio.sender(),
            cancel: cancel_rx,
            disposed: self.disposed.clone(),
            batch_samples: self.config.audio_batch_samples,
            poll_interval: self.config.audio_poll_interval(),
            _done: done_tx,
        };

        let handle = std::thread::Builder::new()
            .name("ogv-decode".to_string())
            .spawn(move || pump.run())
            .map_err(|e| Error::ResourceInit(format!("Failed to spawn decode thread: {e}")))?;

        self.decode_thread = Some(DecodeThread {
            handle,
            cancel_tx: Some(cancel_tx),
            done_rx,
        });
        Ok(())
    }

    /// Cancel the decode thread and wait for it to exit.
    ///
    /// On timeout the thread stays recorded as running and the next call
    /// waits for it again.
    fn join_decode_thread(&mut self) -> Result<()> {
        let Some(mut thread) = self.decode_thread.take() else {
            return Ok(());
        };

        thread.cancel_tx.take();

        let timeout = self.config.join_timeout();
        match thread.done_rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                self.decode_thread = Some(thread);
                Err(Error::ThreadJoinTimeout {
                    waited_ms: timeout.as_millis() as u64,
                })
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if thread.handle.join().is_err() {
                    error!("Decode thread panicked");
                }
                Ok(())
            }
        }
    }

    fn release_resources(&mut self) {
        if let Err(e) = self.audio.stop() {
            warn!("Failed to stop audio output: {e}");
        }
        self.pacer.close();
    }

    /// Advance playback by one host update. No-op unless playing.
    ///
    /// Frames hold still for the configured grace period after `play()` while
    /// audio pre-buffers. Stops playback once the last frame is due.
    pub fn on_host_tick(&mut self, delta_ms: f64) {
        if !self.state.is_playing() {
            return;
        }

        self.since_play_ms += delta_ms;
        if self.since_play_ms < self.config.grace_period_ms as f64 {
            return;
        }

        self.elapsed_ms += delta_ms;
        self.pacer.advance(self.elapsed_ms);

        if self.pacer.is_finished() {
            info!("Playback finished at {:.0} ms", self.elapsed_ms);
            if let Err(e) = self.stop() {
                warn!("Error stopping finished playback: {e}");
            }
        }
    }

    /// Stop playback and tear the session down. No-op while stopped.
    ///
    /// Blocks until the decode thread has exited, bounded by the configured
    /// join timeout. A thread that outlives the timeout is still reported by
    /// [`is_decode_thread_running`](Self::is_decode_thread_running) and is
    /// joined by the next `play()` or `dispose()`.
    pub fn stop(&mut self) -> Result<()> {
        if !self.state.is_playing() {
            return Ok(());
        }

        self.state = PlaybackState::Stopped;
        let joined = self.join_decode_thread();
        if let Err(e) = &joined {
            error!("{e}");
        }

        self.release_resources();
        debug!("Playback stopped");
        joined
    }

    /// Mark the host object as gone and stop playback.
    ///
    /// Also waits for a decode thread left over from a timed-out stop.
    pub fn dispose(&mut self) {
        self.disposed.store(true, Ordering::Release);
        let result = if self.state.is_playing() {
            self.stop()
        } else {
            self.join_decode_thread()
        };
        if let Err(e) = result {
            warn!("Error stopping disposed playback: {e}");
        }
    }

    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// True when there is nothing (left) to play.
    pub fn is_finished(&self) -> bool {
        self.pacer.state() != PacerState::Ready || self.pacer.is_finished()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Change the media file. Takes effect on the next session.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub const fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Playback position in milliseconds, excluding the grace period.
    pub const fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn is_decode_thread_running(&self) -> bool {
        self.decode_thread
            .as_ref()
            .is_some_and(|thread| !thread.handle.is_finished())
    }

    /// Audio samples waiting for the output engine.
    pub fn buffered_audio(&self) -> usize {
        self.audio.buffered()
    }

    pub const fn width(&self) -> u32 {
        self.pacer.width()
    }

    pub const fn height(&self) -> u32 {
        self.pacer.height()
    }

    pub const fn fps(&self) -> f64 {
        self.pacer.fps()
    }

    pub const fn current_frame(&self) -> Option<&VideoFrame> {
        self.pacer.current_frame()
    }

    pub fn luma_plane(&self) -> Option<&[u8]> {
        self.pacer.luma_plane()
    }

    pub fn chroma_u_plane(&self) -> Option<&[u8]> {
        self.pacer.chroma_u_plane()
    }

    pub fn chroma_v_plane(&self) -> Option<&[u8]> {
        self.pacer.chroma_v_plane()
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Body of the decode-producer thread: moves decoded audio into the streamer.
struct AudioPump {
    session: Arc<dyn DecodeSession>,
    sender: AudioSender,
    cancel: Receiver<()>,
    disposed: Arc<AtomicBool>,
    batch_samples: usize,
    poll_interval: Duration,
    /// Declared last so it disconnects after `session` is dropped.
    _done: Sender<()>,
}

impl AudioPump {
    fn run(self) {
        debug!("Decode thread started");

        let mut chunk = Vec::with_capacity(self.batch_samples);
        let mut pushed = 0u64;

        while self.wait_for_audio() {
            chunk.clear();
            while chunk.len() < self.batch_samples {
                let Some(packet) = self.session.next_audio_packet() else {
                    break;
                };
                chunk.extend_from_slice(packet.as_slice());
            }

            if self.is_cancelled() {
                break;
            }
            if !chunk.is_empty() {
                self.sender.stream(&chunk);
                pushed += chunk.len() as u64;
            }
        }

        debug!("Decode thread exiting after {pushed} samples");
    }

    /// Wait until audio is ready. Returns false when the thread should exit.
    fn wait_for_audio(&self) -> bool {
        loop {
            if self.is_cancelled() || self.disposed.load(Ordering::Acquire) {
                return false;
            }
            if self.session.available_audio() {
                return true;
            }
            if !self.session.is_decoding() && !self.session.available_audio() {
                debug!("Decoder has no more audio");
                return false;
            }
            match self.cancel.recv_timeout(self.poll_interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        !matches!(self.cancel.try_recv(), Err(TryRecvError::Empty))
    }
}
