//! Tunebox Server Client
//!
//! HTTP client for the search/download server that feeds the local library.
//!
//! # Features
//!
//! - **Search**: `GET /search?song_name=...`
//! - **Download**: `POST /download`, then stream the published file to disk
//! - **`MusicService`**: [`MusicServerClient`] implements the core trait
//!
//! # Example
//!
//! ```no_run
//! use tunebox_server_client::{MusicServerClient, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MusicServerClient::new(ServerConfig::new("http://localhost:11936"))?;
//! for track in client.search("get lucky").await? {
//!     println!("{} - {}", track.artists_display(), track.name);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod download;
mod error;
mod types;

pub use client::MusicServerClient;
pub use download::DownloadClient;
pub use error::{Result, ServerClientError};
pub use types::{
    DownloadData, DownloadProgress, DownloadRequest, DownloadResponse, SearchResponse,
    ServerConfig, DEFAULT_DOWNLOAD_DELAY, DEFAULT_TIMEOUT,
};
