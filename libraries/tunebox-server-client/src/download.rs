//! Streaming file downloads.

use crate::error::{Result, ServerClientError};
use crate::types::DownloadProgress;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Streams a published audio file to disk.
pub struct DownloadClient<'a> {
    http: &'a Client,
}

impl<'a> DownloadClient<'a> {
    pub(crate) fn new(http: &'a Client) -> Self {
        Self { http }
    }

    /// Download `url` into `dest_path`.
    ///
    /// A partially written file is removed if the transfer fails.
    ///
    /// # Arguments
    /// * `url` - Absolute URL of the file
    /// * `dest_path` - Where to save the file
    /// * `progress_callback` - Called after every chunk
    pub async fn download_file<F>(
        &self,
        url: &str,
        dest_path: &Path,
        mut progress_callback: F,
    ) -> Result<u64>
    where
        F: FnMut(DownloadProgress),
    {
        debug!(url = %url, dest = %dest_path.display(), "Downloading file");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ServerClientError::from_send)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ServerClientError::ServerError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let total_size = response.content_length();

        if let Some(parent) = dest_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = File::create(dest_path).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        let written: Result<()> = async {
            while let Some(chunk_result) = stream.next().await {
                let chunk = chunk_result?;
                file.write_all(&chunk).await?;
                downloaded += chunk.len() as u64;

                let progress = total_size
                    .map(|total| downloaded as f32 / total as f32)
                    .unwrap_or(0.0);

                progress_callback(DownloadProgress {
                    bytes_received: downloaded,
                    bytes_total: total_size,
                    progress,
                });
            }
            file.flush().await?;
            Ok(())
        }
        .await;

        if let Err(e) = written {
            drop(file);
            if let Err(remove_err) = tokio::fs::remove_file(dest_path).await {
                warn!(dest = %dest_path.display(), error = %remove_err, "Failed to remove partial download");
            }
            return Err(e);
        }

        info!(dest = %dest_path.display(), size = downloaded, "File downloaded");
        Ok(downloaded)
    }
}
