//! Downloaded song catalog
//!
//! The catalog is a single JSON array under [`KEY_DOWNLOADED_SONGS`], kept in
//! insertion order. Saving a song whose id is already present replaces the
//! record where it stands.

use sqlx::SqlitePool;
use tracing::{debug, info};
use tunebox_core::DownloadedSong;

use crate::error::Result;
use crate::kv;

/// Key of the song catalog document
pub const KEY_DOWNLOADED_SONGS: &str = "downloaded_songs";

/// Get all downloaded songs in insertion order
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<DownloadedSong>> {
    Ok(kv::get_json(pool, KEY_DOWNLOADED_SONGS)
        .await?
        .unwrap_or_default())
}

/// Find a song by id
pub async fn get_by_id(pool: &SqlitePool, id: &str) -> Result<Option<DownloadedSong>> {
    Ok(get_all(pool).await?.into_iter().find(|song| song.id == id))
}

/// Insert `song`, or replace the record with the same id in place
pub async fn save(pool: &SqlitePool, song: &DownloadedSong) -> Result<()> {
    let mut songs = get_all(pool).await?;

    match songs.iter_mut().find(|existing| existing.id == song.id) {
        Some(existing) => {
            debug!(id = %song.id, "Replacing stored song");
            existing.clone_from(song);
        }
        None => songs.push(song.clone()),
    }

    kv::set_json(pool, KEY_DOWNLOADED_SONGS, &songs).await?;
    info!(id = %song.id, title = %song.title, "Saved downloaded song");
    Ok(())
}

/// Delete a song by id
///
/// Returns whether a record was removed.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let mut songs = get_all(pool).await?;
    let before = songs.len();
    songs.retain(|song| song.id != id);

    if songs.len() == before {
        debug!(id, "Delete of unknown song ignored");
        return Ok(false);
    }

    kv::set_json(pool, KEY_DOWNLOADED_SONGS, &songs).await?;
    info!(id, "Deleted downloaded song");
    Ok(true)
}

/// Whether any stored song was downloaded from `uri`
pub async fn is_downloaded(pool: &SqlitePool, uri: &str) -> Result<bool> {
    Ok(get_all(pool)
        .await?
        .iter()
        .any(|song| song.is_download_of(uri)))
}
