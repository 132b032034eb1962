/// Remote track metadata returned by the search backend
use serde::{Deserialize, Serialize};

/// A search result from the remote backend
///
/// Immutable and never persisted directly; downloading it produces a
/// [`DownloadedSong`](crate::types::DownloadedSong).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Album name
    pub album: String,

    /// Artist names in credit order
    #[serde(default)]
    pub artists: Vec<String>,

    /// Cover image URL
    #[serde(default)]
    pub cover_image: String,

    /// Source URL sent to the download endpoint
    pub external_urls: String,

    /// Display name
    pub name: String,

    /// Unique source identifier
    pub uri: String,
}

impl Track {
    /// Artists flattened for display (`"A, B"`)
    pub fn artists_display(&self) -> String {
        self.artists.join(", ")
    }
}

/// Track metadata reported by the download endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Album name
    pub album: String,
    /// Artist display string
    pub artist: String,
    /// Track title
    pub title: String,
}
