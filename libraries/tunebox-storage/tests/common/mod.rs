//! Test helpers and fixtures for storage integration tests
//!
//! Databases are real `SQLite` files in a temp dir so migrations and WAL mode
//! behave as they do in production.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tunebox_core::{DownloadedSong, Track, TrackInfo};
use tunebox_storage::LocalStore;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = tunebox_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");

        tunebox_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn store(&self) -> LocalStore {
        LocalStore::new(self.pool.clone())
    }
}

/// Test fixture: a search result for `uri`
pub fn create_test_track(uri: &str, name: &str) -> Track {
    Track {
        album: "Test Album".to_string(),
        artists: vec!["Test Artist".to_string()],
        cover_image: format!("https://img.example.com/{name}.jpg"),
        external_urls: format!("https://open.spotify.com/track/{name}"),
        name: name.to_string(),
        uri: uri.to_string(),
    }
}

/// Test fixture: a downloaded song for `uri` at `timestamp_ms`
pub fn create_test_song(uri: &str, title: &str, timestamp_ms: i64) -> DownloadedSong {
    let track = create_test_track(uri, title);
    let info = TrackInfo {
        album: track.album.clone(),
        artist: track.artists_display(),
        title: title.to_string(),
    };
    let at = Utc
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .expect("valid timestamp");
    DownloadedSong::from_download(&track, info, format!("/songs/{title}_{timestamp_ms}.mp3"), at)
}
