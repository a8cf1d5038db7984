//! Sample buffers shared between the decode thread and the audio callback.

pub mod ring;

pub use ring::{shared_ring_buffer, RingBuffer, SharedRingBuffer};
