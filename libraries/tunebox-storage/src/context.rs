use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tunebox_core::{DownloadedSong, Result, SearchHistory, SongStore};

use crate::{searches, songs};

/// Local storage backed by `SQLite`
///
/// Writes are read-modify-write cycles on whole documents, so they are
/// serialized through `write_lock`.
pub struct LocalStore {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Find a downloaded song by id
    pub async fn get_song(&self, id: &str) -> Result<Option<DownloadedSong>> {
        Ok(songs::get_by_id(&self.pool, id).await?)
    }
}

#[async_trait]
impl SongStore for LocalStore {
    async fn list_downloaded(&self) -> Result<Vec<DownloadedSong>> {
        Ok(songs::get_all(&self.pool).await?)
    }

    async fn save(&self, song: &DownloadedSong) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        Ok(songs::save(&self.pool, song).await?)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        songs::delete(&self.pool, id).await?;
        Ok(())
    }

    async fn is_downloaded(&self, uri: &str) -> Result<bool> {
        Ok(songs::is_downloaded(&self.pool, uri).await?)
    }
}

#[async_trait]
impl SearchHistory for LocalStore {
    async fn save_recent_search(&self, term: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        Ok(searches::save(&self.pool, term).await?)
    }

    async fn recent_searches(&self) -> Result<Vec<String>> {
        Ok(searches::get_all(&self.pool).await?)
    }

    async fn clear_recent_searches(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        Ok(searches::clear(&self.pool).await?)
    }
}
