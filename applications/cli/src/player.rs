//! Interactive playback from the terminal
//!
//! Reads one command per line from stdin while printing session updates:
//!
//! | Input      | Action                      |
//! |------------|-----------------------------|
//! | `p`        | pause / resume              |
//! | `n`        | next song                   |
//! | `b`        | previous song               |
//! | `s <secs>` | seek                        |
//! | `i`        | print the current position  |
//! | `q`        | stop and quit               |

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;
use tunebox_core::{format_position, SongStore};
use tunebox_playback::{AudioBackend, PlaybackSession, PlayerEvent, PlayerState, PlayerStateMachine};

use crate::error::{CliError, Result};

/// A parsed line of player input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    TogglePause,
    Next,
    Previous,
    /// Seek to a position in milliseconds
    Seek(i64),
    Info,
    Quit,
}

/// Parse one input line
pub fn parse_command(line: &str) -> std::result::Result<PlayerCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err("empty command".to_string());
    };

    let command = match head {
        "p" => PlayerCommand::TogglePause,
        "n" => PlayerCommand::Next,
        "b" => PlayerCommand::Previous,
        "i" => PlayerCommand::Info,
        "q" => PlayerCommand::Quit,
        "s" => {
            let secs: f64 = parts
                .next()
                .ok_or_else(|| "usage: s <seconds>".to_string())?
                .parse()
                .map_err(|_| "seconds must be a number".to_string())?;
            PlayerCommand::Seek((secs * 1000.0).round() as i64)
        }
        other => return Err(format!("unknown command '{}'", other)),
    };

    if parts.next().is_some() {
        return Err(format!("unexpected arguments after '{}'", head));
    }
    Ok(command)
}

/// One-line summary of a session
pub fn describe_session(session: &PlaybackSession) -> String {
    let label = match session.state() {
        PlayerState::Empty => "Stopped",
        PlayerState::Loading => "Loading",
        PlayerState::ReadyPaused => "Paused",
        PlayerState::ReadyPlaying => "Playing",
    };

    let mut line = match &session.current_song {
        Some(song) => format!(
            "{}: {} - {} [{} / {}]",
            label,
            song.title,
            song.artist,
            format_position(session.position_ms),
            format_position(session.duration_ms)
        ),
        None => label.to_string(),
    };

    if let Some(error) = &session.error {
        line.push_str(&format!(" (error: {})", error));
    }
    line
}

/// Load the library as the playlist, start `start_id` (or the first song)
/// and run the input loop until `q` or end of input
pub async fn run<B: AudioBackend + 'static>(
    player: Arc<PlayerStateMachine<B>>,
    store: &dyn SongStore,
    start_id: Option<&str>,
) -> Result<()> {
    player.initialize().await;

    let count = player.load_library(store).await?;
    if count == 0 {
        println!("No downloaded songs to play");
        return Ok(());
    }

    let playlist = player.playlist().await;
    let first = match start_id {
        Some(id) => playlist
            .into_iter()
            .find(|song| song.id == id)
            .ok_or_else(|| CliError::not_found("Song", id))?,
        None => match playlist.into_iter().next() {
            Some(song) => song,
            None => return Ok(()),
        },
    };

    println!("{} songs in playlist. Commands: p, n, b, s <secs>, i, q", count);
    let mut events = player.events();
    player.play_song(first).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(PlayerCommand::Quit) => break,
                    Ok(command) => apply(&player, command).await,
                    Err(message) => println!("{}", message),
                }
            }
            event = events.recv() => match event {
                Ok(event) => print_event(&player, &event),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Player events lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    player.stop_playback().await;
    Ok(())
}

async fn apply<B: AudioBackend + 'static>(player: &PlayerStateMachine<B>, command: PlayerCommand) {
    match command {
        PlayerCommand::TogglePause => match player.state() {
            PlayerState::ReadyPlaying => player.pause_song().await,
            PlayerState::ReadyPaused => player.resume_song().await,
            state => println!("Nothing to pause ({:?})", state),
        },
        PlayerCommand::Next => player.play_next_song().await,
        PlayerCommand::Previous => player.play_previous_song().await,
        PlayerCommand::Seek(position_ms) => player.seek_to(position_ms).await,
        PlayerCommand::Info => println!("{}", describe_session(&player.session())),
        PlayerCommand::Quit => {}
    }
}

fn print_event<B: AudioBackend + 'static>(player: &PlayerStateMachine<B>, event: &PlayerEvent) {
    match event {
        PlayerEvent::StateChanged { .. } | PlayerEvent::TrackChanged { .. } => {
            println!("{}", describe_session(&player.session()));
        }
        PlayerEvent::Error { message } => println!("Error: {}", message),
        PlayerEvent::TrackFinished { .. }
        | PlayerEvent::PositionUpdate { .. }
        | PlayerEvent::PlaylistChanged { .. } => {}
    }
}
