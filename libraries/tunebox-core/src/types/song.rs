/// Locally downloaded, playable song record
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::track::{Track, TrackInfo};

/// A song whose audio lives on local disk
///
/// Created after a successful download and persisted by a
/// [`SongStore`](crate::traits::SongStore). The playback core only holds
/// transient clones of it.
///
/// Serialized with camelCase keys, the format the song catalog is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadedSong {
    /// Unique id: `{source uri}-{download timestamp in ms}`
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist display string
    pub artist: String,

    /// Album name
    pub album: String,

    /// Cover image URL
    pub cover_image: String,

    /// Local audio file
    pub file_path: PathBuf,

    /// Download time (RFC 3339, UTC)
    pub download_date: String,
}

impl DownloadedSong {
    /// Build the record for a finished download
    ///
    /// The id embeds the download timestamp, so downloading the same source
    /// track twice yields two distinct songs.
    pub fn from_download(
        track: &Track,
        info: TrackInfo,
        file_path: impl Into<PathBuf>,
        downloaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("{}-{}", track.uri, downloaded_at.timestamp_millis()),
            title: info.title,
            artist: info.artist,
            album: info.album,
            cover_image: track.cover_image.clone(),
            file_path: file_path.into(),
            download_date: downloaded_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Whether this song was downloaded from the given source uri
    pub fn is_download_of(&self, uri: &str) -> bool {
        self.id.starts_with(uri)
    }

    /// Whether a search result refers to this song
    ///
    /// Compares title, album and flattened artists case-insensitively.
    pub fn matches_track(&self, track: &Track) -> bool {
        self.title.to_lowercase() == track.name.to_lowercase()
            && self.album.to_lowercase() == track.album.to_lowercase()
            && self.artist.to_lowercase() == track.artists_display().to_lowercase()
    }
}
