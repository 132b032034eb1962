//! Tunebox Storage
//!
//! `SQLite` persistence for the downloaded song catalog and recent searches.
//!
//! # Architecture
//!
//! - **Key-value documents**: one `kv_store` table holding JSON values
//! - **Vertical slicing**: `songs` and `searches` each own their document
//! - **Collaborator traits**: [`LocalStore`] implements `SongStore` and
//!   `SearchHistory` from `tunebox-core`
//!
//! # Example
//!
//! ```rust,no_run
//! use tunebox_core::SongStore;
//! use tunebox_storage::{create_pool, run_migrations, LocalStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://tunebox.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = LocalStore::new(pool);
//! let songs = store.list_downloaded().await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

pub mod kv;
pub mod searches;
pub mod songs;

pub use context::LocalStore;
pub use error::{Result, StorageError};

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup, before handing the pool to a [`LocalStore`].
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://tunebox.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> std::result::Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    debug!(url = database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!(url = database_url, "SQLite pool ready");
    Ok(pool)
}
