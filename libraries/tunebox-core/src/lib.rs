//! Tunebox Core
//!
//! Platform-agnostic core types, traits, and error handling for Tunebox.
//!
//! This crate provides the building blocks shared by the playback core,
//! the storage layer, the server client, and the front ends.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track` (remote search result), `DownloadedSong`
//!   (local playable record), `TrackInfo`
//! - **Collaborator Traits**: `SongStore`, `SearchHistory`, `MusicService`
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use tunebox_core::types::{DownloadedSong, Track, TrackInfo};
//!
//! let track = Track {
//!     album: "Discovery".to_string(),
//!     artists: vec!["Daft Punk".to_string()],
//!     cover_image: "https://img.example.com/discovery.jpg".to_string(),
//!     external_urls: "https://open.spotify.com/track/abc".to_string(),
//!     name: "One More Time".to_string(),
//!     uri: "spotify:track:abc".to_string(),
//! };
//!
//! let info = TrackInfo {
//!     album: "Discovery".to_string(),
//!     artist: "Daft Punk".to_string(),
//!     title: "One More Time".to_string(),
//! };
//!
//! let downloaded_at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
//! let song = DownloadedSong::from_download(&track, info, "/songs/one_more_time.mp3", downloaded_at);
//! assert_eq!(song.id, "spotify:track:abc-1700000000000");
//! assert!(song.matches_track(&track));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CoreError, Result};
pub use traits::{MusicService, SearchHistory, SongStore};
pub use types::{format_position, sanitize_file_stem, DownloadedSong, Track, TrackInfo};
