//! Error types for ogv-player.

use thiserror::Error;

/// Result type alias using the player's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ogv-player.
#[derive(Error, Debug)]
pub enum Error {
    // Initialization errors
    #[error("Failed to initialize resource: {0}")]
    ResourceInit(String),

    #[error("Audio engine failure: {0}")]
    AudioEngine(String),

    #[error("Decoder not ready after {waited_ms} ms")]
    DecoderTimeout { waited_ms: u64 },

    #[error("Media has no video stream")]
    NoVideoStream,

    #[error("Architecture unsupported: {0}")]
    ArchitectureUnsupported(String),

    // Lifecycle errors
    #[error("Decode thread did not exit within {waited_ms} ms")]
    ThreadJoinTimeout { waited_ms: u64 },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if calling `play()` again may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DecoderTimeout { .. } | Self::AudioEngine(_) | Self::ResourceInit(_)
        )
    }
}
