//! Wall-clock driven video frame pacing.
//!
//! The pacer holds the frame being shown, one frame of lookahead from the
//! decoder, and the frame shown before the current one. Each `advance` moves
//! forward through every buffered frame whose presentation time has passed,
//! so a host that falls behind skips ahead instead of drifting.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ogv_core::{DecodeSession, Error, Result, VideoFrame};
use tracing::{debug, info, trace};

/// Lifecycle of a [`FramePacer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacerState {
    #[default]
    Unopened,
    /// Waiting for the decoder to initialize and produce a first frame.
    Opening,
    Ready,
    Closed,
}

/// Advances decoded video frames against elapsed playback time.
#[derive(Default)]
pub struct FramePacer {
    state: PacerState,
    session: Option<Arc<dyn DecodeSession>>,
    /// Frame shown before `current`, released on the next shift.
    previous: Option<VideoFrame>,
    current: Option<VideoFrame>,
    /// Lookahead frame already taken from the decoder.
    next: Option<VideoFrame>,
    width: u32,
    height: u32,
    fps: f64,
    position_ms: f64,
    released: u64,
}

impl FramePacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a decode session and wait until it yields a frame.
    ///
    /// Polls every `poll_interval` until the decoder reports itself
    /// initialized and hands over a first frame, or `timeout` elapses. On any
    /// failure the session is stopped and the pacer is left `Closed`.
    pub fn open(
        &mut self,
        session: Arc<dyn DecodeSession>,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<()> {
        if self.state == PacerState::Ready {
            return Err(Error::InvalidState(
                "frame pacer already open; close it first".to_string(),
            ));
        }

        self.state = PacerState::Opening;
        debug!("Waiting for decoder (timeout {timeout:?})");

        let first = match Self::wait_for_first_frame(session.as_ref(), timeout, poll_interval) {
            Ok(frame) => frame,
            Err(e) => {
                session.stop();
                self.state = PacerState::Closed;
                return Err(e);
            }
        };

        self.width = first.width();
        self.height = first.height();
        self.fps = first.fps();
        self.position_ms = 0.0;
        self.previous = None;
        self.next = None;
        self.current = Some(first);
        self.session = Some(session);
        self.state = PacerState::Ready;

        info!(
            "Video ready: {}x{} @ {:.2} fps",
            self.width, self.height, self.fps
        );
        Ok(())
    }

    fn wait_for_first_frame(
        session: &dyn DecodeSession,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<VideoFrame> {
        let started = Instant::now();
        let deadline = started + timeout;
        let timed_out = || Error::DecoderTimeout {
            waited_ms: started.elapsed().as_millis() as u64,
        };

        while !session.is_initialized() {
            if !sleep_until_next_poll(deadline, poll_interval) {
                return Err(timed_out());
            }
        }

        if !session.has_video_stream() {
            return Err(Error::NoVideoStream);
        }

        loop {
            if let Some(frame) = session.next_video_frame() {
                return Ok(frame);
            }
            if !session.is_decoding() && !session.available_video() {
                return Err(Error::ResourceInit(
                    "decoder finished without producing a video frame".to_string(),
                ));
            }
            if !sleep_until_next_poll(deadline, poll_interval) {
                return Err(timed_out());
            }
        }
    }

    /// Present the latest frame whose timestamp is at or before `elapsed_ms`.
    ///
    /// Frames the decoder has not produced yet are picked up on a later call;
    /// a stalled decoder simply keeps the current frame on screen.
    pub fn advance(&mut self, elapsed_ms: f64) {
        if self.state != PacerState::Ready {
            return;
        }
        let Some(session) = self.session.clone() else {
            return;
        };

        self.position_ms = elapsed_ms;

        loop {
            if self.next.is_none() && session.available_video() {
                self.next = session.next_video_frame();
            }

            let due = self
                .next
                .as_ref()
                .is_some_and(|next| f64::from(next.pts_ms()) <= elapsed_ms);
            if !due {
                break;
            }

            let shown = std::mem::replace(&mut self.current, self.next.take());
            if self.previous.take().is_some() {
                self.released += 1;
            }
            self.previous = shown;
        }

        trace!(
            "Advanced to {:?} ms at {elapsed_ms:.1} ms",
            self.current.as_ref().map(VideoFrame::pts_ms)
        );
    }

    /// True once the decoder is exhausted and the last frame is due.
    ///
    /// A closed pacer has nothing left to show and counts as finished.
    pub fn is_finished(&self) -> bool {
        match self.state {
            PacerState::Unopened | PacerState::Opening => false,
            PacerState::Closed => true,
            PacerState::Ready => {
                let Some(session) = &self.session else {
                    return true;
                };
                self.next.is_none()
                    && !session.available_video()
                    && !session.is_decoding()
                    && self
                        .current
                        .as_ref()
                        .map_or(true, |frame| self.position_ms >= f64::from(frame.pts_ms()))
            }
        }
    }

    /// Stop the decoder and release every frame held.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.stop();
        }

        let held = [self.previous.take(), self.current.take(), self.next.take()];
        self.released += held.iter().flatten().count() as u64;

        if self.state != PacerState::Closed {
            debug!("Frame pacer closed after releasing {} frames", self.released);
        }

        self.state = PacerState::Closed;
        self.width = 0;
        self.height = 0;
        self.fps = 0.0;
        self.position_ms = 0.0;
    }

    pub const fn state(&self) -> PacerState {
        self.state
    }

    /// The decode session, while open.
    pub fn session(&self) -> Option<Arc<dyn DecodeSession>> {
        self.session.clone()
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Nominal frame rate read from the first frame.
    pub const fn fps(&self) -> f64 {
        self.fps
    }

    /// Elapsed time passed to the last `advance`.
    pub const fn position_ms(&self) -> f64 {
        self.position_ms
    }

    pub const fn current_frame(&self) -> Option<&VideoFrame> {
        self.current.as_ref()
    }

    /// Frames handed back to the decoder so far.
    pub const fn released_frames(&self) -> u64 {
        self.released
    }

    pub fn luma_plane(&self) -> Option<&[u8]> {
        self.current.as_ref().map(VideoFrame::luma)
    }

    pub fn chroma_u_plane(&self) -> Option<&[u8]> {
        self.current.as_ref().map(VideoFrame::chroma_u)
    }

    pub fn chroma_v_plane(&self) -> Option<&[u8]> {
        self.current.as_ref().map(VideoFrame::chroma_v)
    }
}

impl Drop for FramePacer {
    fn drop(&mut self) {
        if self.session.is_some() {
            self.close();
        }
    }
}

/// Sleep one polling interval, clamped to the deadline.
///
/// Returns false if the deadline had already passed.
fn sleep_until_next_poll(deadline: Instant, poll_interval: Duration) -> bool {
    let now = Instant::now();
    if now >= deadline {
        return false;
    }
    thread::sleep(poll_interval.min(deadline - now));
    true
}
