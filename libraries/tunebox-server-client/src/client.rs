//! Main music server client.

use crate::download::DownloadClient;
use crate::error::{Result, ServerClientError};
use crate::types::{DownloadRequest, DownloadResponse, SearchResponse, ServerConfig};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use tunebox_core::{sanitize_file_stem, DownloadedSong, MusicService, Track};

/// Client for the search/download server.
///
/// # Example
///
/// ```no_run
/// use tunebox_server_client::{MusicServerClient, ServerConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MusicServerClient::new(ServerConfig::new("http://localhost:11936"))?;
///
/// let tracks = client.search("one more time").await?;
/// if let Some(track) = tracks.first() {
///     let song = client.download_song(track, std::path::Path::new("./songs")).await?;
///     println!("Saved {} to {}", song.title, song.file_path.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MusicServerClient {
    http: Client,
    base_url: String,
    download_delay: Duration,
}

impl MusicServerClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(ServerClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim().trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Tunebox/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: url,
            download_delay: config.download_delay,
        })
    }

    /// Get the normalized server URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Search tracks by name.
    ///
    /// A response without a `tracks` field is an empty result.
    pub async fn search(&self, song_name: &str) -> Result<Vec<Track>> {
        let url = format!("{}/search", self.base_url);
        debug!(url = %url, query = song_name, "Searching tracks");

        let response = self
            .http
            .get(&url)
            .query(&[("song_name", song_name)])
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        let response = ensure_success(response).await?;
        let body: SearchResponse = response.json().await.map_err(|e| {
            ServerClientError::ParseError(format!("Failed to parse search response: {}", e))
        })?;

        debug!(query = song_name, results = body.tracks.len(), "Search finished");
        Ok(body.tracks)
    }

    /// Ask the server to prepare a track for download.
    ///
    /// Returns `DownloadRejected` unless the response status is `"success"`.
    pub async fn request_download(&self, spotify_url: &str) -> Result<DownloadResponse> {
        let url = format!("{}/download", self.base_url);
        debug!(url = %url, spotify_url, "Requesting download");

        let response = self
            .http
            .post(&url)
            .json(&DownloadRequest { spotify_url })
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        let response = ensure_success(response).await?;
        let body: DownloadResponse = response.json().await.map_err(|e| {
            ServerClientError::ParseError(format!("Failed to parse download response: {}", e))
        })?;

        if !body.is_success() {
            return Err(ServerClientError::DownloadRejected {
                status: body.status,
                message: body.data.map(|d| d.message).unwrap_or_default(),
            });
        }

        Ok(body)
    }

    /// Stream `url` into `dest_path`.
    ///
    /// Relative URLs are resolved against the server URL.
    pub async fn download_file(&self, url: &str, dest_path: &Path) -> Result<u64> {
        let url = self.resolve(url);
        DownloadClient::new(&self.http)
            .download_file(&url, dest_path, |_| {})
            .await
    }

    /// Get a download client for fetching files with progress reporting.
    pub fn downloads(&self) -> DownloadClient<'_> {
        DownloadClient::new(&self.http)
    }

    /// Download a search result into `songs_dir`.
    ///
    /// The file is named `{sanitized title}_{timestamp ms}.mp3`. The returned
    /// record is not persisted.
    pub async fn download_song(&self, track: &Track, songs_dir: &Path) -> Result<DownloadedSong> {
        let response = self.request_download(&track.external_urls).await?;
        let data = response.data.ok_or_else(|| {
            ServerClientError::ParseError("Download response is missing data".into())
        })?;

        let downloaded_at = Utc::now();
        let file_name = format!(
            "{}_{}.mp3",
            sanitize_file_stem(&data.track_info.title),
            downloaded_at.timestamp_millis()
        );
        let dest_path = songs_dir.join(file_name);

        tokio::fs::create_dir_all(songs_dir).await?;

        // The server publishes the file shortly after accepting the request
        if !self.download_delay.is_zero() {
            tokio::time::sleep(self.download_delay).await;
        }

        self.download_file(&data.upload_url, &dest_path).await?;

        let song = DownloadedSong::from_download(track, data.track_info, dest_path, downloaded_at);
        info!(id = %song.id, title = %song.title, "Song downloaded");
        Ok(song)
    }

    fn resolve(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }
}

/// Turn a non-success HTTP status into `ServerError`
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let error_text = response.text().await.unwrap_or_default();
        Err(ServerClientError::ServerError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}

#[async_trait]
impl MusicService for MusicServerClient {
    async fn search(&self, term: &str) -> tunebox_core::Result<Vec<Track>> {
        Ok(MusicServerClient::search(self, term).await?)
    }

    async fn download(&self, track: &Track, songs_dir: &Path) -> tunebox_core::Result<DownloadedSong> {
        Ok(self.download_song(track, songs_dir).await?)
    }
}
