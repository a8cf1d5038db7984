//! Core domain types for ogv-player.

pub mod audio;
pub mod frame;
pub mod state;

pub use audio::AudioPacket;
pub use frame::{PixelFormat, VideoFrame};
pub use state::PlaybackState;
