//! # ogv-core
//!
//! Core types, collaborator traits, configuration, and error handling for
//! the ogv-player video playback core.

pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use config::PlayerConfig;
pub use error::{Error, Result};
pub use source::{AudioBackend, DecodeSession, MediaSource, OutputFormat, PullCallback};
pub use types::*;
