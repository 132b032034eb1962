//! Shared test helpers: a scripted audio backend and song fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tunebox_core::DownloadedSong;
use tunebox_playback::{
    AudioBackend, AudioSessionConfig, NativeSound, PlaybackError, PlaybackSession, Result,
    StatusReporter,
};

// ===== Fixtures =====

pub fn create_test_song(id: &str) -> DownloadedSong {
    DownloadedSong {
        id: id.to_string(),
        title: format!("Song {}", id),
        artist: "Test Artist".to_string(),
        album: "Test Album".to_string(),
        cover_image: String::new(),
        file_path: song_path(id),
        download_date: "2024-01-01T00:00:00.000Z".to_string(),
    }
}

pub fn song_path(id: &str) -> PathBuf {
    PathBuf::from(format!("/music/{}.mp3", id))
}

/// Wait (bounded) until the session satisfies `predicate`
pub async fn wait_for_session<F>(
    rx: &mut watch::Receiver<PlaybackSession>,
    predicate: F,
) -> PlaybackSession
where
    F: FnMut(&PlaybackSession) -> bool,
{
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for session")
        .expect("player dropped")
        .clone()
}

// ===== Mock backend =====

/// Everything the mock backend observed, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open { path: PathBuf, autoplay: bool },
    Play(PathBuf),
    Pause(PathBuf),
    SetPosition(PathBuf, u64),
    Stop(PathBuf),
    Unload(PathBuf),
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    reporters: Vec<(PathBuf, StatusReporter)>,
    failing_opens: HashSet<PathBuf>,
    gated_opens: HashMap<PathBuf, Arc<Notify>>,
    session_config: Option<AudioSessionConfig>,
    fail_session: bool,
    reject_transport: bool,
    open_started: Option<Arc<Notify>>,
}

/// Scripted backend that records calls and hands reporters back to the test
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    /// Make every open of `path` fail
    pub fn fail_open(&self, path: impl Into<PathBuf>) {
        self.state().failing_opens.insert(path.into());
    }

    /// Hold opens of `path` until the returned notify fires
    pub fn gate_open(&self, path: impl Into<PathBuf>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state().gated_opens.insert(path.into(), gate.clone());
        gate
    }

    /// Notified whenever an open starts
    pub fn on_open_started(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.state().open_started = Some(notify.clone());
        notify
    }

    pub fn fail_session(&self) {
        self.state().fail_session = true;
    }

    /// Make play/pause/seek fail on every sound
    pub fn reject_transport(&self) {
        self.state().reject_transport = true;
    }

    pub fn session_config(&self) -> Option<AudioSessionConfig> {
        self.state().session_config.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn opens(&self) -> Vec<(PathBuf, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Open { path, autoplay } => Some((path, autoplay)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Reporter handed to the `n`th successful open
    pub fn reporter(&self, n: usize) -> StatusReporter {
        self.state().reporters[n].1.clone()
    }

    /// Reporter of the most recent successful open of `path`
    pub fn reporter_for(&self, path: &Path) -> StatusReporter {
        self.state()
            .reporters
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, r)| r.clone())
            .expect("no sound opened for path")
    }

    pub fn reporter_count(&self) -> usize {
        self.state().reporters.len()
    }

    fn record(&self, call: Call) {
        self.state().calls.push(call);
    }
}

#[async_trait]
impl AudioBackend for MockBackend {
    async fn configure_session(&self, config: &AudioSessionConfig) -> Result<()> {
        let mut state = self.state();
        if state.fail_session {
            return Err(PlaybackError::SessionInit("no audio device".to_string()));
        }
        state.session_config = Some(config.clone());
        Ok(())
    }

    async fn open(
        &self,
        path: &Path,
        autoplay: bool,
        reporter: StatusReporter,
    ) -> Result<Box<dyn NativeSound>> {
        let (gate, started) = {
            let mut state = self.state();
            state.calls.push(Call::Open {
                path: path.to_path_buf(),
                autoplay,
            });
            (state.gated_opens.remove(path), state.open_started.clone())
        };
        if let Some(started) = started {
            started.notify_one();
        }
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state();
        if state.failing_opens.contains(path) {
            return Err(PlaybackError::load(path, "file not found"));
        }
        state.reporters.push((path.to_path_buf(), reporter));

        Ok(Box::new(MockSound {
            path: path.to_path_buf(),
            backend: self.clone(),
        }))
    }
}

struct MockSound {
    path: PathBuf,
    backend: MockBackend,
}

impl MockSound {
    fn transport(&self, call: Call) -> Result<()> {
        let rejected = self.backend.state().reject_transport;
        self.backend.record(call);
        if rejected {
            Err(PlaybackError::backend("device lost"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NativeSound for MockSound {
    async fn play(&mut self) -> Result<()> {
        self.transport(Call::Play(self.path.clone()))
    }

    async fn pause(&mut self) -> Result<()> {
        self.transport(Call::Pause(self.path.clone()))
    }

    async fn set_position(&mut self, position_ms: u64) -> Result<()> {
        self.transport(Call::SetPosition(self.path.clone(), position_ms))
    }

    async fn stop(&mut self) -> Result<()> {
        self.backend.record(Call::Stop(self.path.clone()));
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        self.backend.record(Call::Unload(self.path.clone()));
        Ok(())
    }
}
