//! Player Events
//!
//! Discrete notifications for front ends, emitted alongside the session
//! snapshot:
//! - State changes (loading/playing/paused/empty)
//! - Track changes and natural track ends
//! - Position updates (as reported by the native layer)
//! - Playlist changes and errors

use serde::{Deserialize, Serialize};

use crate::types::PlayerState;

/// Events emitted by the player state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Derived player state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// A new song was loaded
    TrackChanged {
        /// ID of the new (current) song
        song_id: String,
        /// ID of the song it replaced, if any
        previous_song_id: Option<String>,
    },

    /// The current song reached its natural end
    TrackFinished {
        /// ID of the finished song
        song_id: String,
    },

    /// Position update from the native layer
    PositionUpdate {
        /// Current position
        position_ms: u64,
        /// Total duration
        duration_ms: u64,
    },

    /// Playlist replaced or extended
    PlaylistChanged {
        /// New playlist length
        length: usize,
    },

    /// Load or playback failure
    Error {
        /// Error message
        message: String,
    },
}

impl PlayerEvent {
    /// Whether this event reports a failure
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
