//! # ogv-player
//!
//! Plays a decoded video+audio stream inside a host's per-frame update loop.
//!
//! Three clocks run independently: the audio engine pulls samples from a
//! ring buffer on its own thread, a decode thread pushes audio into it, and
//! the host's update tick advances video frames by elapsed time.

pub mod controller;
pub mod layout;
pub mod pacer;

pub use controller::PlaybackController;
pub use layout::{screen_rect, Rect, ScreenAspect};
pub use pacer::{FramePacer, PacerState};
