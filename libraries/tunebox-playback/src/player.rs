//! Player state machine - core orchestration
//!
//! Composes the [`PlaybackEngine`] and the [`PlaylistNavigator`]:
//!
//! ```text
//!   Empty ──play──▶ Loading ──status(loaded)──▶ Ready-Playing ◀─▶ Ready-Paused
//!     ▲                │  ▲                          │                  │
//!     │   load failure │  └──── play / next / prev / finished ─────────┘
//!     └────────────────┴──────────── stop ──────────────────────────────┘
//! ```
//!
//! Every intent holds one async lock for its whole duration, so only one
//! transition (and therefore one load) is in flight at a time. Native status
//! arrives on the backend's own thread, is tagged with the load id it belongs
//! to, and is applied by a pump task under the same lock. Updates carrying an
//! outdated load id are dropped.

use crate::{
    backend::{AudioBackend, StatusObserver},
    engine::PlaybackEngine,
    error::PlaybackError,
    events::PlayerEvent,
    playlist::PlaylistNavigator,
    types::{PlaybackConfig, PlaybackSession, PlaybackStatus, PlayerState},
};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tracing::{debug, info, warn};
use tunebox_core::{DownloadedSong, SongStore};

/// Capacity of the event broadcast channel
const EVENT_CAPACITY: usize = 64;

/// Status tagged with the transition it belongs to
#[derive(Debug)]
struct StatusUpdate {
    load_id: u64,
    status: PlaybackStatus,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Next,
    Previous,
}

struct PlayerInner {
    playlist: PlaylistNavigator,
    session: PlaybackSession,
    /// Bumped on every load and stop; status for older ids is ignored
    load_id: u64,
}

/// Single playback session with a playlist
///
/// Constructed once by the application's composition root and shared by
/// reference (`Arc`). Must be created inside a Tokio runtime: construction
/// spawns the task that applies native status updates.
pub struct PlayerStateMachine<B: AudioBackend + 'static> {
    engine: PlaybackEngine<B>,
    config: PlaybackConfig,
    inner: Mutex<PlayerInner>,
    status_tx: mpsc::UnboundedSender<StatusUpdate>,
    session_tx: watch::Sender<PlaybackSession>,
    events_tx: broadcast::Sender<PlayerEvent>,
}

impl<B: AudioBackend + 'static> PlayerStateMachine<B> {
    /// Create a player over `backend`
    pub fn new(backend: B, config: PlaybackConfig) -> Arc<Self> {
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let (session_tx, _) = watch::channel(PlaybackSession::default());
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let player = Arc::new(Self {
            engine: PlaybackEngine::new(backend),
            config,
            inner: Mutex::new(PlayerInner {
                playlist: PlaylistNavigator::new(),
                session: PlaybackSession::default(),
                load_id: 0,
            }),
            status_tx,
            session_tx,
            events_tx,
        });

        tokio::spawn(Self::pump_status(Arc::downgrade(&player), status_rx));
        player
    }

    /// Apply the audio session policy
    ///
    /// A failure is recorded as the session error; playback can still be
    /// attempted afterwards.
    pub async fn initialize(&self) {
        if let Err(e) = self.engine.initialize(&self.config.audio_session).await {
            warn!(error = %e, "Failed to initialize audio");
            let mut inner = self.inner.lock().await;
            self.record_error(&mut inner, &e);
        }
    }

    // ===== Intents =====

    /// Load and play `song`, interrupting whatever is loaded
    ///
    /// The song is appended to the playlist if it is not already a member.
    pub async fn play_song(&self, song: DownloadedSong) {
        let mut inner = self.inner.lock().await;
        self.play_locked(&mut inner, song).await;
    }

    /// Pause the loaded song (no-op unless a song is loaded)
    pub async fn pause_song(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.session.state().is_ready() {
            debug!("Pause ignored: no song loaded");
            return;
        }
        if let Err(e) = self.engine.pause().await {
            self.record_error(&mut inner, &e);
        }
    }

    /// Resume the loaded song (no-op unless a song is loaded)
    pub async fn resume_song(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.session.state().is_ready() {
            debug!("Resume ignored: no song loaded");
            return;
        }
        if let Err(e) = self.engine.resume().await {
            self.record_error(&mut inner, &e);
        }
    }

    /// Seek within the loaded song; out-of-range positions are clamped
    pub async fn seek_to(&self, position_ms: i64) {
        let mut inner = self.inner.lock().await;
        if !inner.session.state().is_ready() {
            debug!(position_ms, "Seek ignored: no song loaded");
            return;
        }
        if let Err(e) = self.engine.seek(position_ms).await {
            self.record_error(&mut inner, &e);
        }
    }

    /// Play the playlist entry after the current song, wrapping around
    pub async fn play_next_song(&self) {
        let mut inner = self.inner.lock().await;
        self.advance_locked(&mut inner, Direction::Next).await;
    }

    /// Play the playlist entry before the current song, wrapping around
    pub async fn play_previous_song(&self) {
        let mut inner = self.inner.lock().await;
        self.advance_locked(&mut inner, Direction::Previous).await;
    }

    /// Stop and unload the current song; the playlist is kept
    pub async fn stop_playback(&self) {
        let mut inner = self.inner.lock().await;
        inner.load_id += 1;
        if let Err(e) = self.engine.stop().await {
            warn!(error = %e, "Failed to stop sound");
        }
        inner.session = PlaybackSession::default();
        self.publish(&inner.session);
    }

    // ===== Playlist =====

    /// Replace the playlist
    pub async fn set_playlist(&self, songs: Vec<DownloadedSong>) {
        let mut inner = self.inner.lock().await;
        inner.playlist.replace(songs);
        self.emit(PlayerEvent::PlaylistChanged {
            length: inner.playlist.len(),
        });
    }

    /// Replace the playlist with every song in `store`
    ///
    /// Returns the number of songs loaded.
    pub async fn load_library(&self, store: &dyn SongStore) -> tunebox_core::Result<usize> {
        let songs = store.list_downloaded().await?;
        let count = songs.len();
        self.set_playlist(songs).await;
        info!(count, "Loaded library as playlist");
        Ok(count)
    }

    /// Drop a song from the playlist (e.g. after deleting it from the library)
    ///
    /// The current session is not interrupted.
    pub async fn remove_song(&self, id: &str) -> bool {
        let mut inner = self.inner.lock().await;
        let removed = inner.playlist.remove(id).is_some();
        if removed {
            self.emit(PlayerEvent::PlaylistChanged {
                length: inner.playlist.len(),
            });
        }
        removed
    }

    /// Snapshot of the playlist
    pub async fn playlist(&self) -> Vec<DownloadedSong> {
        self.inner.lock().await.playlist.songs().to_vec()
    }

    // ===== Observation =====

    /// Snapshot of the session
    pub fn session(&self) -> PlaybackSession {
        self.session_tx.borrow().clone()
    }

    /// Current derived state
    pub fn state(&self) -> PlayerState {
        self.session_tx.borrow().state()
    }

    /// Watch session snapshots
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSession> {
        self.session_tx.subscribe()
    }

    /// Receive discrete player events
    pub fn events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events_tx.subscribe()
    }

    /// The underlying engine
    pub fn engine(&self) -> &PlaybackEngine<B> {
        &self.engine
    }

    /// Player configuration
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    // ===== Transitions =====

    async fn play_locked(&self, inner: &mut PlayerInner, song: DownloadedSong) {
        inner.load_id += 1;
        let load_id = inner.load_id;
        let previous_song_id = inner.session.current_song.take().map(|s| s.id);

        inner.session = PlaybackSession {
            is_loading: true,
            ..PlaybackSession::default()
        };
        if inner.playlist.ensure_member(song.clone()) {
            self.emit(PlayerEvent::PlaylistChanged {
                length: inner.playlist.len(),
            });
        }
        self.publish(&inner.session);

        let observer = self.observer_for(load_id);
        match self.engine.load(&song.file_path, true, Some(observer)).await {
            Ok(_) => {
                info!(song_id = %song.id, title = %song.title, "Playing song");
                self.emit(PlayerEvent::TrackChanged {
                    song_id: song.id.clone(),
                    previous_song_id,
                });
                inner.session.current_song = Some(song);
            }
            Err(e) => {
                warn!(song_id = %song.id, error = %e, "Failed to play song");
                inner.session = PlaybackSession::default();
                self.record_error(inner, &e);
            }
        }
        self.publish(&inner.session);
    }

    async fn advance_locked(&self, inner: &mut PlayerInner, direction: Direction) {
        let Some(current) = inner.session.current_song.as_ref() else {
            debug!(?direction, "Navigation ignored: no current song");
            return;
        };

        let target = match direction {
            Direction::Next => inner.playlist.next(current),
            Direction::Previous => inner.playlist.previous(current),
        };
        let Some(target) = target.cloned() else {
            debug!(?direction, song_id = %current.id, "Navigation ignored: song not in playlist");
            return;
        };

        self.play_locked(inner, target).await;
    }

    async fn pump_status(player: Weak<Self>, mut status_rx: mpsc::UnboundedReceiver<StatusUpdate>) {
        while let Some(update) = status_rx.recv().await {
            let Some(player) = player.upgrade() else {
                break;
            };
            player.handle_status(update).await;
        }
    }

    async fn handle_status(&self, update: StatusUpdate) {
        let mut inner = self.inner.lock().await;
        if update.load_id != inner.load_id || inner.session.current_song.is_none() {
            debug!(load_id = update.load_id, current = inner.load_id, "Ignoring stale status");
            return;
        }

        let status = update.status;
        if let Some(message) = status.error {
            warn!(%message, "Playback failed");
            inner.load_id += 1;
            if let Err(e) = self.engine.stop().await {
                warn!(error = %e, "Failed to release failed sound");
            }
            inner.session = PlaybackSession {
                error: Some(message.clone()),
                ..PlaybackSession::default()
            };
            self.emit(PlayerEvent::Error { message });
            self.publish(&inner.session);
            return;
        }

        if !status.is_loaded {
            return;
        }

        inner.session.is_loading = false;
        inner.session.is_playing = status.is_playing;
        inner.session.duration_ms = status.duration_ms;
        inner.session.position_ms = status.position_ms;
        self.emit(PlayerEvent::PositionUpdate {
            position_ms: status.position_ms,
            duration_ms: status.duration_ms,
        });
        self.publish(&inner.session);

        if status.did_just_finish {
            if let Some(song_id) = inner.session.current_song_id() {
                self.emit(PlayerEvent::TrackFinished {
                    song_id: song_id.to_string(),
                });
            }
            self.advance_locked(&mut inner, Direction::Next).await;
        }
    }

    // ===== Helpers =====

    fn observer_for(&self, load_id: u64) -> StatusObserver {
        let status_tx = self.status_tx.clone();
        Arc::new(move |status| {
            // The pump is gone only when the player itself is being dropped.
            let _ = status_tx.send(StatusUpdate { load_id, status });
        })
    }

    fn record_error(&self, inner: &mut PlayerInner, error: &PlaybackError) {
        let message = error.to_string();
        inner.session.error = Some(message.clone());
        self.emit(PlayerEvent::Error { message });
        self.publish(&inner.session);
    }

    fn publish(&self, session: &PlaybackSession) {
        let state = session.state();
        if self.session_tx.borrow().state() != state {
            self.emit(PlayerEvent::StateChanged { state });
        }
        self.session_tx.send_replace(session.clone());
    }

    fn emit(&self, event: PlayerEvent) {
        // No subscribers is fine
        let _ = self.events_tx.send(event);
    }
}
