//! Library commands: search, download, list, delete and recent searches
//!
//! Each command talks to the collaborator traits only and writes its output
//! to the given writer.

use std::io::Write;
use std::path::Path;

use tracing::{info, warn};
use tunebox_core::{DownloadedSong, MusicService, SearchHistory, SongStore, Track};

use crate::error::{CliError, Result};

/// Search the server and print numbered results
///
/// Results that match a downloaded song are marked. The term is saved to the
/// recent searches only when something was found.
pub async fn search(
    service: &dyn MusicService,
    store: &dyn SongStore,
    history: &dyn SearchHistory,
    term: &str,
    out: &mut impl Write,
) -> Result<Vec<Track>> {
    let term = term.trim();
    if term.is_empty() {
        return Err(CliError::InvalidInput("search term is empty".to_string()));
    }

    let tracks = service.search(term).await?;
    if tracks.is_empty() {
        writeln!(out, "No results for \"{}\"", term)?;
        return Ok(tracks);
    }

    let downloaded = store.list_downloaded().await?;
    for (index, track) in tracks.iter().enumerate() {
        let marker = if downloaded.iter().any(|song| song.matches_track(track)) {
            " [downloaded]"
        } else {
            ""
        };
        writeln!(
            out,
            "{:>3}. {} - {} ({}){}",
            index,
            track.name,
            track.artists_display(),
            track.album,
            marker
        )?;
    }

    // A lost history entry is not worth failing the search for
    if let Err(e) = history.save_recent_search(term).await {
        warn!(error = %e, "Failed to save recent search");
    }

    Ok(tracks)
}

/// Search, then download and save result `index`
///
/// If the chosen result matches a song that is already downloaded, that song
/// is returned and nothing is fetched.
pub async fn download(
    service: &dyn MusicService,
    store: &dyn SongStore,
    term: &str,
    index: usize,
    songs_dir: &Path,
    out: &mut impl Write,
) -> Result<DownloadedSong> {
    let tracks = service.search(term.trim()).await?;
    let track = tracks.get(index).ok_or_else(|| {
        CliError::InvalidInput(format!(
            "no result #{} for \"{}\" ({} results)",
            index,
            term.trim(),
            tracks.len()
        ))
    })?;

    let downloaded = store.list_downloaded().await?;
    if let Some(existing) = downloaded.into_iter().find(|song| song.matches_track(track)) {
        writeln!(out, "Already downloaded: {} ({})", existing.title, existing.id)?;
        return Ok(existing);
    }

    writeln!(out, "Downloading {} - {}...", track.name, track.artists_display())?;
    let song = service.download(track, songs_dir).await?;
    store.save(&song).await?;

    info!(id = %song.id, path = %song.file_path.display(), "Download saved");
    writeln!(out, "Saved {} to {}", song.title, song.file_path.display())?;
    Ok(song)
}

/// Print the downloaded songs
pub async fn library(store: &dyn SongStore, out: &mut impl Write) -> Result<Vec<DownloadedSong>> {
    let songs = store.list_downloaded().await?;
    if songs.is_empty() {
        writeln!(out, "No downloaded songs")?;
    }
    for song in &songs {
        writeln!(
            out,
            "{}  {} - {} ({})",
            song.id, song.title, song.artist, song.album
        )?;
    }
    Ok(songs)
}

/// Remove a song record by id
pub async fn delete(store: &dyn SongStore, id: &str, out: &mut impl Write) -> Result<DownloadedSong> {
    let song = store
        .list_downloaded()
        .await?
        .into_iter()
        .find(|song| song.id == id)
        .ok_or_else(|| CliError::not_found("Song", id))?;

    store.delete(id).await?;
    writeln!(out, "Deleted {} - {}", song.title, song.artist)?;
    Ok(song)
}

/// List recent searches, or forget them with `clear`
pub async fn recent(history: &dyn SearchHistory, clear: bool, out: &mut impl Write) -> Result<Vec<String>> {
    if clear {
        history.clear_recent_searches().await?;
        writeln!(out, "Recent searches cleared")?;
        return Ok(Vec::new());
    }

    let terms = history.recent_searches().await?;
    if terms.is_empty() {
        writeln!(out, "No recent searches")?;
    }
    for term in &terms {
        writeln!(out, "{}", term)?;
    }
    Ok(terms)
}
