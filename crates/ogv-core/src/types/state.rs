//! Playback state.

/// Playback state of a controller.
///
/// There is no paused state. Stopping tears the session down and
/// the next play starts a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

impl PlaybackState {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}
