//! JSON documents in the key-value table
//!
//! Every value is a JSON document stored as text. The song catalog and the
//! recent search list each live under one key.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::{Result, StorageError};

/// Read the raw JSON text stored under `key`
pub async fn get_raw(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

/// Read and decode the document stored under `key`
///
/// Returns `Ok(None)` when the key has never been written.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the stored text is not a valid
/// document of type `T`.
pub async fn get_json<T: DeserializeOwned>(pool: &SqlitePool, key: &str) -> Result<Option<T>> {
    match get_raw(pool, key).await? {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| StorageError::serialization(key, e)),
        None => Ok(None),
    }
}

/// Encode `value` and store it under `key`, replacing any previous document
pub async fn set_json<T: Serialize + ?Sized>(pool: &SqlitePool, key: &str, value: &T) -> Result<()> {
    let text = serde_json::to_string(value).map_err(|e| StorageError::serialization(key, e))?;
    set_raw(pool, key, &text).await
}

/// Store raw text under `key`
pub async fn set_raw(pool: &SqlitePool, key: &str, text: &str) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO kv_store (key, value, updated_at)
        VALUES (?, ?, strftime('%s', 'now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        ",
    )
    .bind(key)
    .bind(text)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove the document stored under `key` (no-op if absent)
pub async fn remove(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM kv_store WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}
