//! Recent search terms
//!
//! Stored as a JSON array of strings under [`KEY_RECENT_SEARCHES`], newest
//! first and at most [`MAX_RECENT_SEARCHES`] long.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Result;
use crate::kv;

/// Key of the recent searches document
pub const KEY_RECENT_SEARCHES: &str = "recent_searches";

/// Number of terms kept
pub const MAX_RECENT_SEARCHES: usize = 10;

/// Get recent search terms, newest first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<String>> {
    Ok(kv::get_json(pool, KEY_RECENT_SEARCHES)
        .await?
        .unwrap_or_default())
}

/// Record `term` as the most recent search
///
/// Blank terms are ignored. Surrounding whitespace is trimmed.
pub async fn save(pool: &SqlitePool, term: &str) -> Result<()> {
    let term = term.trim();
    if term.is_empty() {
        debug!("Ignoring blank search term");
        return Ok(());
    }

    let mut terms = get_all(pool).await?;
    push_recent(&mut terms, term);
    kv::set_json(pool, KEY_RECENT_SEARCHES, &terms).await
}

/// Forget all recent search terms
pub async fn clear(pool: &SqlitePool) -> Result<()> {
    kv::remove(pool, KEY_RECENT_SEARCHES).await
}

/// Move `term` to the front, dropping case-insensitive duplicates and
/// anything past the cap
pub(crate) fn push_recent(terms: &mut Vec<String>, term: &str) {
    let needle = term.to_lowercase();
    terms.retain(|existing| existing.to_lowercase() != needle);
    terms.insert(0, term.to_string());
    terms.truncate(MAX_RECENT_SEARCHES);
}
