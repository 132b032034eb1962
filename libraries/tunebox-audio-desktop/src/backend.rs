//! CPAL implementation of the native audio layer
//!
//! Each opened sound gets its own output thread. The thread owns the CPAL
//! `Stream` (which is not `Send` on every platform), decodes in the output
//! callback, and doubles as the status loop: it reports on a fixed interval
//! while playing and immediately whenever the sound handle pokes it.

use crate::error::{AudioError, Result};
use crate::source::{LocalAudioSource, OUTPUT_CHANNELS};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Stream;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};
use tunebox_playback::{
    AudioBackend, AudioSessionConfig, NativeSound, PlaybackConfig, PlaybackError, PlaybackStatus,
    StatusReporter,
};

/// Desktop audio output through the default CPAL device
#[derive(Debug, Clone)]
pub struct CpalBackend {
    status_interval: Duration,
}

impl CpalBackend {
    /// Create a backend reporting status at `config.status_interval_ms`
    pub fn new(config: &PlaybackConfig) -> Self {
        Self::with_status_interval(Duration::from_millis(config.status_interval_ms))
    }

    /// Create a backend with an explicit status interval
    pub fn with_status_interval(status_interval: Duration) -> Self {
        Self { status_interval }
    }

    /// Interval between periodic status reports
    pub fn status_interval(&self) -> Duration {
        self.status_interval
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

#[async_trait]
impl AudioBackend for CpalBackend {
    async fn configure_session(&self, config: &AudioSessionConfig) -> tunebox_playback::Result<()> {
        debug!(?config, "Desktop audio has no session policy to apply");
        Ok(())
    }

    async fn open(
        &self,
        path: &Path,
        autoplay: bool,
        reporter: StatusReporter,
    ) -> tunebox_playback::Result<Box<dyn NativeSound>> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (control_tx, control_rx) = unbounded();
        let request = OutputRequest {
            path: path.to_path_buf(),
            autoplay,
            status_interval: self.status_interval,
        };

        thread::Builder::new()
            .name("tunebox-audio-output".to_string())
            .spawn(move || run_output(request, ready_tx, control_rx, reporter))
            .map_err(|e| PlaybackError::load(path, e.to_string()))?;

        // If this future is dropped the thread sees the closed handshake and
        // tears the stream down itself.
        let shared = ready_rx
            .await
            .map_err(|_| PlaybackError::load(path, "audio thread exited during open"))?
            .map_err(|e| PlaybackError::load(path, e.to_string()))?;

        info!(path = %path.display(), autoplay, "Audio output started");
        Ok(Box::new(CpalSound {
            path: path.to_path_buf(),
            shared,
            control_tx,
        }))
    }
}

// ===== Shared state =====

/// State shared between the sound handle, the output callback and the
/// status loop
struct SharedPlayback {
    source: LocalAudioSource,
    playing: bool,
    /// Raised once by the callback when the decoder runs dry
    just_finished: bool,
    failure: Option<String>,
}

type SharedHandle = Arc<Mutex<SharedPlayback>>;

fn lock_shared(shared: &Mutex<SharedPlayback>) -> MutexGuard<'_, SharedPlayback> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

enum Control {
    /// Report status now
    Report,
    /// Drop the stream and exit
    Shutdown,
}

struct OutputRequest {
    path: PathBuf,
    autoplay: bool,
    status_interval: Duration,
}

// ===== Output thread =====

fn run_output(
    request: OutputRequest,
    ready_tx: oneshot::Sender<Result<SharedHandle>>,
    control_rx: Receiver<Control>,
    reporter: StatusReporter,
) {
    let (stream, shared) = match start_stream(&request.path, request.autoplay) {
        Ok(started) => started,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if ready_tx.send(Ok(shared.clone())).is_err() {
        debug!(path = %request.path.display(), "Open abandoned; releasing stream");
        return;
    }

    report_status(&shared, &reporter, true);

    loop {
        if !reporter.is_current() {
            break;
        }
        match control_rx.recv_timeout(request.status_interval) {
            Ok(Control::Report) => report_status(&shared, &reporter, true),
            Err(RecvTimeoutError::Timeout) => report_status(&shared, &reporter, false),
            Ok(Control::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    drop(stream);
    debug!(path = %request.path.display(), "Audio output stopped");
}

/// Decode `path` and start a CPAL stream on the default device
///
/// The file is probed before any device is touched.
fn start_stream(path: &Path, autoplay: bool) -> Result<(Stream, SharedHandle)> {
    let source = LocalAudioSource::open(path)?;

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioError::DeviceNotFound)?;
    let supported = device.default_output_config()?;
    let sample_rate = supported.sample_rate();
    let config = supported.config();
    let channels = config.channels as usize;

    let source = source.resampled_to(sample_rate)?;
    let shared = Arc::new(Mutex::new(SharedPlayback {
        source,
        playing: autoplay,
        just_finished: false,
        failure: None,
    }));

    let callback_state = Arc::clone(&shared);
    let mut scratch = Vec::new();
    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            fill_output(data, channels, &callback_state, &mut scratch);
        },
        |err| error!(%err, "Audio stream error"),
        None,
    )?;
    stream.play()?;

    Ok((stream, shared))
}

/// Output callback (runs on the real-time audio thread)
fn fill_output(data: &mut [f32], channels: usize, shared: &Mutex<SharedPlayback>, scratch: &mut Vec<f32>) {
    let mut state = lock_shared(shared);
    if !state.playing || channels == 0 {
        data.fill(0.0);
        return;
    }

    let frames = data.len() / channels;
    scratch.resize(frames * OUTPUT_CHANNELS, 0.0);

    if let Err(e) = state.source.read_samples(scratch) {
        state.failure = Some(e.to_string());
        state.playing = false;
        data.fill(0.0);
        return;
    }
    map_stereo_frames(scratch, data, channels);

    if state.source.is_finished() {
        state.playing = false;
        state.just_finished = true;
    }
}

/// Spread interleaved stereo frames over a device with `channels` outputs
///
/// Mono devices get the average; extra channels beyond two stay silent.
pub(crate) fn map_stereo_frames(stereo: &[f32], output: &mut [f32], channels: usize) {
    for (frame, out) in stereo
        .chunks_exact(OUTPUT_CHANNELS)
        .zip(output.chunks_exact_mut(channels))
    {
        match channels {
            1 => out[0] = (frame[0] + frame[1]) * 0.5,
            _ => {
                out[0] = frame[0];
                out[1] = frame[1];
                out[2..].fill(0.0);
            }
        }
    }
}

/// Build the status to report, if any
///
/// Pending failures and finishes are always reported (once). Otherwise a
/// status goes out when forced or while playing.
fn next_status(state: &mut SharedPlayback, force: bool) -> Option<PlaybackStatus> {
    if let Some(message) = state.failure.take() {
        return Some(PlaybackStatus::failed(message));
    }

    let duration_ms = state.source.duration().as_millis() as u64;
    if std::mem::take(&mut state.just_finished) {
        return Some(PlaybackStatus::finished(duration_ms));
    }

    if force || state.playing {
        let position_ms = state.source.position().as_millis() as u64;
        Some(PlaybackStatus::loaded(state.playing, position_ms, duration_ms))
    } else {
        None
    }
}

fn report_status(shared: &Mutex<SharedPlayback>, reporter: &StatusReporter, force: bool) {
    let status = next_status(&mut lock_shared(shared), force);
    if let Some(status) = status {
        reporter.report(status);
    }
}

// ===== Sound handle =====

struct CpalSound {
    path: PathBuf,
    shared: SharedHandle,
    control_tx: Sender<Control>,
}

impl CpalSound {
    /// Apply `change` to the shared state, then ask for an immediate report
    fn update<F>(&self, change: F) -> tunebox_playback::Result<()>
    where
        F: FnOnce(&mut SharedPlayback) -> Result<()>,
    {
        let result = change(&mut lock_shared(&self.shared));
        let _ = self.control_tx.send(Control::Report);
        result.map_err(PlaybackError::from)
    }
}

#[async_trait]
impl NativeSound for CpalSound {
    async fn play(&mut self) -> tunebox_playback::Result<()> {
        self.update(|state| {
            // Resuming after the end restarts the song
            if state.source.is_finished() {
                state.source.seek(Duration::ZERO)?;
            }
            state.playing = true;
            Ok(())
        })
    }

    async fn pause(&mut self) -> tunebox_playback::Result<()> {
        self.update(|state| {
            state.playing = false;
            Ok(())
        })
    }

    async fn set_position(&mut self, position_ms: u64) -> tunebox_playback::Result<()> {
        self.update(|state| {
            state.source.seek(Duration::from_millis(position_ms))?;
            state.just_finished = false;
            Ok(())
        })
    }

    async fn stop(&mut self) -> tunebox_playback::Result<()> {
        self.update(|state| {
            state.playing = false;
            if let Err(e) = state.source.seek(Duration::ZERO) {
                warn!(error = %e, "Failed to rewind on stop");
            }
            Ok(())
        })
    }

    async fn unload(&mut self) -> tunebox_playback::Result<()> {
        debug!(path = %self.path.display(), "Unloading sound");
        let _ = self.control_tx.send(Control::Shutdown);
        Ok(())
    }
}

impl Drop for CpalSound {
    fn drop(&mut self) {
        let _ = self.control_tx.send(Control::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_passes_through() {
        let stereo = [0.5, -0.5, 0.25, -0.25];
        let mut output = [0.0; 4];

        map_stereo_frames(&stereo, &mut output, 2);

        assert_eq!(output, stereo);
    }

    #[test]
    fn mono_device_gets_average() {
        let stereo = [0.5, 0.1, -0.4, 0.0];
        let mut output = [9.0; 2];

        map_stereo_frames(&stereo, &mut output, 1);

        assert!((output[0] - 0.3).abs() < f32::EPSILON);
        assert!((output[1] + 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn surround_device_silences_extra_channels() {
        let stereo = [0.5, -0.5];
        let mut output = [9.0; 6];

        map_stereo_frames(&stereo, &mut output, 6);

        assert_eq!(output, [0.5, -0.5, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn default_interval_follows_playback_config() {
        assert_eq!(
            CpalBackend::default().status_interval(),
            Duration::from_millis(500)
        );
    }
}
