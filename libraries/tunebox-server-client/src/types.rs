//! Types for music server requests and responses.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tunebox_core::{Track, TrackInfo};

/// Default pause between a download request and fetching the file
pub const DEFAULT_DOWNLOAD_DELAY: Duration = Duration::from_secs(2);

/// Default HTTP request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for connecting to a music server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the server (e.g., "http://localhost:11936")
    pub url: String,
    /// Wait between the download request and the file fetch, giving the
    /// server time to publish the file
    pub download_delay: Duration,
    /// Timeout for each HTTP request
    pub timeout: Duration,
}

impl ServerConfig {
    /// Create a new server config with default timings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            download_delay: DEFAULT_DOWNLOAD_DELAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = delay;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// =============================================================================
// Search
// =============================================================================

/// Response from `GET /search`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

// =============================================================================
// Download
// =============================================================================

/// Request body for `POST /download`.
#[derive(Debug, Serialize)]
pub struct DownloadRequest<'a> {
    pub spotify_url: &'a str,
}

/// Response from `POST /download`.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadResponse {
    /// `"success"` when the server accepted the request
    pub status: String,
    /// Missing on some rejections
    #[serde(default)]
    pub data: Option<DownloadData>,
}

impl DownloadResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Payload of an accepted download request.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadData {
    #[serde(default)]
    pub message: String,
    pub track_info: TrackInfo,
    /// Where the audio file can be fetched from
    pub upload_url: String,
}

/// Download progress information.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    /// Bytes written so far
    pub bytes_received: u64,
    /// Total bytes (if the server sent a length)
    pub bytes_total: Option<u64>,
    /// Progress fraction (0.0 - 1.0), 0.0 when the total is unknown
    pub progress: f32,
}
