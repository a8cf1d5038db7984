//! # ogv-audio
//!
//! Audio side of the ogv-player playback core.
//!
//! Features:
//! - Fixed-capacity overwrite-on-full ring buffer between decode and output
//! - Streamer bridging decoder push cadence to engine pull cadence
//! - cpal-backed output voice

pub mod buffer;
pub mod output;
pub mod streamer;

pub use buffer::{shared_ring_buffer, RingBuffer, SharedRingBuffer};
pub use output::CpalBackend;
pub use streamer::{AudioSender, AudioStreamer};
