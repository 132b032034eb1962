//! Collaborator traits consumed by the playback core and the front ends

use crate::error::Result;
use crate::types::{DownloadedSong, Track};
use async_trait::async_trait;
use std::path::Path;

/// Persistent catalog of downloaded songs
///
/// The store is the sole source of truth for `DownloadedSong` records.
/// The playback core only reads from it to seed the playlist.
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Get all downloaded songs in insertion order
    async fn list_downloaded(&self) -> Result<Vec<DownloadedSong>>;

    /// Save a song, replacing an existing record with the same id in place
    async fn save(&self, song: &DownloadedSong) -> Result<()>;

    /// Delete a song by id (no-op if absent)
    async fn delete(&self, id: &str) -> Result<()>;

    /// Whether any stored song was downloaded from the given source uri
    async fn is_downloaded(&self, uri: &str) -> Result<bool>;
}

/// Recent search terms, newest first
#[async_trait]
pub trait SearchHistory: Send + Sync {
    /// Record a search term
    ///
    /// Blank terms are ignored. A term already present (case-insensitive)
    /// moves to the front instead of being duplicated.
    async fn save_recent_search(&self, term: &str) -> Result<()>;

    /// Get recent search terms, newest first
    async fn recent_searches(&self) -> Result<Vec<String>>;

    /// Forget all recent search terms
    async fn clear_recent_searches(&self) -> Result<()>;
}

/// Remote search/download backend
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Search tracks by name
    async fn search(&self, term: &str) -> Result<Vec<Track>>;

    /// Download a track's audio into `songs_dir` and return the local record
    ///
    /// The returned song is not persisted; callers save it to a `SongStore`.
    async fn download(&self, track: &Track, songs_dir: &Path) -> Result<DownloadedSong>;
}
