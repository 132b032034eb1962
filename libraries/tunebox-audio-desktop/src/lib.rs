//! Desktop native audio layer using CPAL
//!
//! This crate provides [`CpalBackend`], the desktop implementation of
//! `tunebox_playback::AudioBackend`.
//!
//! # Features
//!
//! - Cross-platform audio output using CPAL (default output device)
//! - Decoding of every format Symphonia supports (MP3, FLAC, OGG, WAV, AAC)
//! - Automatic sample rate conversion with rubato
//! - Periodic status reports plus immediate reports on transport changes
//!
//! # Example
//!
//! ```no_run
//! use tunebox_audio_desktop::CpalBackend;
//! use tunebox_playback::{PlaybackConfig, PlayerStateMachine};
//!
//! # async fn run() {
//! let config = PlaybackConfig::default();
//! let player = PlayerStateMachine::new(CpalBackend::new(&config), config);
//! player.initialize().await;
//! # }
//! ```

mod backend;
mod error;
pub mod source;

pub use backend::CpalBackend;
pub use error::{AudioError, Result};
pub use source::LocalAudioSource;
