//! Tunebox - Playback
//!
//! Platform-agnostic playback for Tunebox.
//!
//! This crate provides:
//! - A single-resource playback engine (load, pause, resume, seek, stop)
//! - Status observation with stale-callback protection
//! - Playlist navigation with wraparound
//! - The player state machine tying both together
//!
//! # Architecture
//!
//! `tunebox-playback` has no dependency on any audio API. Platform code
//! implements [`AudioBackend`] (open a file into a [`NativeSound`]) and pushes
//! status through the [`StatusReporter`] handed to it. The desktop
//! implementation lives in `tunebox-audio-desktop`.
//!
//! ```text
//!   front end ──intents──▶ PlayerStateMachine ──▶ PlaybackEngine ──▶ AudioBackend
//!       ▲                        │    ▲                                   │
//!       └── session / events ────┘    └──────── StatusReporter ◀──────────┘
//! ```
//!
//! # Example: Platform Integration
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use std::path::Path;
//! use tunebox_playback::{
//!     AudioBackend, NativeSound, PlaybackConfig, PlayerStateMachine, Result, StatusReporter,
//! };
//!
//! struct SilentBackend;
//!
//! struct SilentSound;
//!
//! #[async_trait]
//! impl NativeSound for SilentSound {
//!     async fn play(&mut self) -> Result<()> { Ok(()) }
//!     async fn pause(&mut self) -> Result<()> { Ok(()) }
//!     async fn set_position(&mut self, _position_ms: u64) -> Result<()> { Ok(()) }
//!     async fn stop(&mut self) -> Result<()> { Ok(()) }
//!     async fn unload(&mut self) -> Result<()> { Ok(()) }
//! }
//!
//! #[async_trait]
//! impl AudioBackend for SilentBackend {
//!     async fn open(
//!         &self,
//!         _path: &Path,
//!         _autoplay: bool,
//!         _reporter: StatusReporter,
//!     ) -> Result<Box<dyn NativeSound>> {
//!         Ok(Box::new(SilentSound))
//!     }
//! }
//!
//! # async fn run() {
//! let player = PlayerStateMachine::new(SilentBackend, PlaybackConfig::default());
//! player.initialize().await;
//! player.play_next_song().await; // no current song: no-op
//! # }
//! ```

mod backend;
mod engine;
mod error;
mod events;
mod player;
mod playlist;
pub mod types;

// Public exports
pub use backend::{AudioBackend, NativeSound, StatusObserver, StatusReporter};
pub use engine::{clamp_position, LoadHandle, PlaybackEngine};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use player::PlayerStateMachine;
pub use playlist::PlaylistNavigator;
pub use types::{
    AndroidInterruptionMode, AudioSessionConfig, IosInterruptionMode, PlaybackConfig,
    PlaybackSession, PlaybackStatus, PlayerState,
};
