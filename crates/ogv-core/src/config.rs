//! Player configuration.
//!
//! Every timing constant and buffer size the playback core uses is a field
//! here, with defaults matching a 48 kHz stereo Theora stream at 30 fps.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, OutputFormat, Result};

/// Configuration for a playback controller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Audio ring buffer capacity in samples.
    pub ring_capacity: usize,
    /// Interleaved output channels.
    pub channels: u16,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Decoded frames the decoder may queue ahead (150 is ~5 s at 30 fps).
    pub frame_queue_depth: u32,
    /// Host time after `play()` before video frames start advancing, giving
    /// audio a head start to pre-buffer.
    pub grace_period_ms: u64,
    /// Samples the decode thread gathers before each push.
    pub audio_batch_samples: usize,
    /// Decode thread sleep while no audio is ready.
    pub audio_poll_interval_ms: u64,
    /// Deadline for the decoder to initialize and yield a first frame.
    pub decoder_ready_timeout_ms: u64,
    /// Polling interval while waiting for the decoder.
    pub decoder_poll_interval_ms: u64,
    /// Upper bound on `stop()` waiting for the decode thread.
    pub join_timeout_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            ring_capacity: 1_024_768,
            channels: 2,
            sample_rate: 48_000,
            frame_queue_depth: 150,
            grace_period_ms: 800,
            audio_batch_samples: 8_192,
            audio_poll_interval_ms: 1,
            decoder_ready_timeout_ms: 5_000,
            decoder_poll_interval_ms: 10,
            join_timeout_ms: 1_000,
        }
    }
}

impl PlayerConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        let non_zero = [
            ("ring_capacity", self.ring_capacity as u64),
            ("channels", u64::from(self.channels)),
            ("sample_rate", u64::from(self.sample_rate)),
            ("frame_queue_depth", u64::from(self.frame_queue_depth)),
            ("audio_batch_samples", self.audio_batch_samples as u64),
            ("audio_poll_interval_ms", self.audio_poll_interval_ms),
            ("decoder_poll_interval_ms", self.decoder_poll_interval_ms),
            ("join_timeout_ms", self.join_timeout_ms),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(Error::Config(format!("{name} must be greater than zero")));
        }

        if self.audio_batch_samples > self.ring_capacity {
            return Err(Error::Config(format!(
                "audio_batch_samples ({}) exceeds ring_capacity ({})",
                self.audio_batch_samples, self.ring_capacity
            )));
        }

        // The decode thread only notices cancellation between polls
        if self.join_timeout_ms < self.audio_poll_interval_ms {
            return Err(Error::Config(format!(
                "join_timeout_ms ({}) is shorter than audio_poll_interval_ms ({})",
                self.join_timeout_ms, self.audio_poll_interval_ms
            )));
        }

        Ok(())
    }

    pub const fn output_format(&self) -> OutputFormat {
        OutputFormat {
            channels: self.channels,
            sample_rate: self.sample_rate,
        }
    }

    pub const fn audio_poll_interval(&self) -> Duration {
        Duration::from_millis(self.audio_poll_interval_ms)
    }

    pub const fn decoder_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.decoder_ready_timeout_ms)
    }

    pub const fn decoder_poll_interval(&self) -> Duration {
        Duration::from_millis(self.decoder_poll_interval_ms)
    }

    pub const fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.join_timeout(), Duration::from_millis(1_000));
        assert_eq!(config.output_format().sample_rate, 48_000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PlayerConfig::from_toml_str(
            r"
            grace_period_ms = 250
            channels = 1
            ",
        )
        .unwrap();

        assert_eq!(config.grace_period_ms, 250);
        assert_eq!(config.channels, 1);
        assert_eq!(config.ring_capacity, 1_024_768);
    }

    #[test]
    fn test_zero_field_rejected() {
        let err = PlayerConfig::from_toml_str("sample_rate = 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: sample_rate must be greater than zero"
        );
    }

    #[test]
    fn test_batch_larger_than_ring_rejected() {
        let result = PlayerConfig::from_toml_str(
            r"
            ring_capacity = 1024
            audio_batch_samples = 2048
            ",
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = PlayerConfig::from_toml_str("grace_period_ms = \"soon\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_join_timeout_rejected() {
        let err = PlayerConfig::from_toml_str("join_timeout_ms = 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: join_timeout_ms must be greater than zero"
        );
    }

    #[test]
    fn test_join_timeout_shorter_than_poll_rejected() {
        let config = PlayerConfig {
            join_timeout_ms: 5,
            audio_poll_interval_ms: 10,
            ..PlayerConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = PlayerConfig {
            join_timeout_ms: 10,
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = PlayerConfig::load("/nonexistent/ogv-player.toml");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
