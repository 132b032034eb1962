//! Error types for playback management

use std::path::PathBuf;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The native layer could not open the file or initialize output
    #[error("Failed to load {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// A transport request (play, pause, seek, stop) was rejected
    #[error("Audio backend error: {0}")]
    Backend(String),

    /// Audio session policy could not be applied
    #[error("Failed to initialize audio session: {0}")]
    SessionInit(String),
}

impl PlaybackError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a load error for `path`
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<PlaybackError> for tunebox_core::CoreError {
    fn from(err: PlaybackError) -> Self {
        tunebox_core::CoreError::audio(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
