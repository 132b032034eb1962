//! Core types for playback management

use serde::{Deserialize, Serialize};
use tunebox_core::DownloadedSong;

/// Status reported by the native audio layer
///
/// Delivered through the engine's status observer whenever the native layer
/// reports a change, and periodically while a sound plays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    /// A sound is open and ready
    pub is_loaded: bool,

    /// Audio is currently being output
    pub is_playing: bool,

    /// Total duration in milliseconds (0 until known)
    pub duration_ms: u64,

    /// Current position in milliseconds
    pub position_ms: u64,

    /// The sound reached its natural end since the last report
    pub did_just_finish: bool,

    /// Playback failure reported by the native layer
    pub error: Option<String>,
}

impl PlaybackStatus {
    /// Status of a loaded sound
    pub fn loaded(is_playing: bool, position_ms: u64, duration_ms: u64) -> Self {
        Self {
            is_loaded: true,
            is_playing,
            duration_ms,
            position_ms,
            did_just_finish: false,
            error: None,
        }
    }

    /// Status of a loaded sound that just reached its end
    pub fn finished(duration_ms: u64) -> Self {
        Self {
            is_loaded: true,
            is_playing: false,
            duration_ms,
            position_ms: duration_ms,
            did_just_finish: true,
            error: None,
        }
    }

    /// Status of a sound that failed during playback
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Player state derived from the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No song loaded
    Empty,

    /// Load in flight
    Loading,

    /// Song loaded, paused
    ReadyPaused,

    /// Song loaded, playing
    ReadyPlaying,
}

impl PlayerState {
    /// A song is loaded (paused or playing)
    pub fn is_ready(self) -> bool {
        matches!(self, Self::ReadyPaused | Self::ReadyPlaying)
    }
}

/// Runtime-only snapshot of the playback session
///
/// Never persisted. Reset whenever playback stops or a new load begins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// Song currently loaded
    pub current_song: Option<DownloadedSong>,

    /// Engine reports audio output
    pub is_playing: bool,

    /// A load is in flight
    pub is_loading: bool,

    /// Duration in milliseconds (0 until known)
    pub duration_ms: u64,

    /// Position in milliseconds
    pub position_ms: u64,

    /// Last load or playback failure
    pub error: Option<String>,
}

impl PlaybackSession {
    /// Derive the state machine state
    pub fn state(&self) -> PlayerState {
        if self.is_loading {
            PlayerState::Loading
        } else if self.current_song.is_none() {
            PlayerState::Empty
        } else if self.is_playing {
            PlayerState::ReadyPlaying
        } else {
            PlayerState::ReadyPaused
        }
    }

    /// Id of the current song, if any
    pub fn current_song_id(&self) -> Option<&str> {
        self.current_song.as_ref().map(|song| song.id.as_str())
    }
}

/// Android interruption policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AndroidInterruptionMode {
    /// Lower other apps' volume while playing
    DuckOthers,

    /// Pause other apps while playing
    DoNotMix,
}

/// iOS interruption policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IosInterruptionMode {
    /// Play alongside other apps
    MixWithOthers,

    /// Lower other apps' volume while playing
    DuckOthers,

    /// Interrupt other apps
    DoNotMix,
}

/// Basic OS audio session policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSessionConfig {
    /// Keep playing when the device is in silent mode (iOS)
    pub plays_in_silent_mode: bool,

    /// Keep the session active while the app is backgrounded
    pub stays_active_in_background: bool,

    /// Interruption policy on Android
    pub interruption_mode_android: AndroidInterruptionMode,

    /// Interruption policy on iOS
    pub interruption_mode_ios: IosInterruptionMode,
}

impl Default for AudioSessionConfig {
    fn default() -> Self {
        Self {
            plays_in_silent_mode: true,
            stays_active_in_background: true,
            interruption_mode_android: AndroidInterruptionMode::DuckOthers,
            interruption_mode_ios: IosInterruptionMode::MixWithOthers,
        }
    }
}

/// Configuration for the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Audio session policy applied on `initialize`
    pub audio_session: AudioSessionConfig,

    /// Interval between periodic status reports from native backends
    /// (milliseconds, default: 500)
    pub status_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            audio_session: AudioSessionConfig::default(),
            status_interval_ms: 500,
        }
    }
}
