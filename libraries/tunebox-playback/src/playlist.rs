//! Playlist navigation
//!
//! Ordered, duplicate-free sequence of songs with wraparound next/previous.
//! Identity is the song id; two records with the same id are the same song.

use tunebox_core::DownloadedSong;

/// Ordered playlist with relative navigation
#[derive(Debug, Clone, Default)]
pub struct PlaylistNavigator {
    songs: Vec<DownloadedSong>,
}

impl PlaylistNavigator {
    /// Create an empty playlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire sequence
    ///
    /// Later records sharing an id with an earlier one are dropped.
    pub fn replace(&mut self, songs: Vec<DownloadedSong>) {
        self.songs.clear();
        for song in songs {
            if !self.contains_id(&song.id) {
                self.songs.push(song);
            }
        }
    }

    /// Append `song` unless a song with its id is already present
    ///
    /// Returns `true` if the song was appended.
    pub fn ensure_member(&mut self, song: DownloadedSong) -> bool {
        if self.contains_id(&song.id) {
            return false;
        }
        self.songs.push(song);
        true
    }

    /// Position of `song` by id
    pub fn index_of(&self, song: &DownloadedSong) -> Option<usize> {
        self.index_of_id(&song.id)
    }

    /// Position of a song id
    pub fn index_of_id(&self, id: &str) -> Option<usize> {
        self.songs.iter().position(|s| s.id == id)
    }

    /// Whether a song with this id is present
    pub fn contains_id(&self, id: &str) -> bool {
        self.index_of_id(id).is_some()
    }

    /// Song after `current`, wrapping to the first
    ///
    /// `None` when the playlist is empty or `current` is not a member.
    pub fn next(&self, current: &DownloadedSong) -> Option<&DownloadedSong> {
        let index = self.index_of(current)?;
        self.songs.get((index + 1) % self.songs.len())
    }

    /// Song before `current`, wrapping to the last
    ///
    /// `None` when the playlist is empty or `current` is not a member.
    pub fn previous(&self, current: &DownloadedSong) -> Option<&DownloadedSong> {
        let index = self.index_of(current)?;
        let len = self.songs.len();
        self.songs.get((index + len - 1) % len)
    }

    /// Remove a song by id, returning it if it was present
    pub fn remove(&mut self, id: &str) -> Option<DownloadedSong> {
        let index = self.index_of_id(id)?;
        Some(self.songs.remove(index))
    }

    /// Songs in order
    pub fn songs(&self) -> &[DownloadedSong] {
        &self.songs
    }

    /// Number of songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Whether the playlist is empty
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
