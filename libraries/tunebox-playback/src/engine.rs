//! Playback engine - owner of the single native sound
//!
//! Wraps exactly one [`NativeSound`] at a time and exposes a narrow transport
//! contract. Every load releases the previous sound first, and releasing
//! detaches the status observer before anything else happens, so a superseded
//! sound can never deliver status to the current observer.

use crate::{
    backend::{lock_slot, new_slot, AudioBackend, NativeSound, SharedSlot, StatusObserver, StatusReporter},
    error::{PlaybackError, Result},
    types::{AudioSessionConfig, PlaybackStatus},
};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Identifies a successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadHandle {
    generation: u64,
}

impl LoadHandle {
    /// Engine generation the sound was opened in
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Clamp a requested seek position into `[0, duration_ms]`
pub fn clamp_position(requested_ms: i64, duration_ms: u64) -> u64 {
    if requested_ms <= 0 {
        0
    } else {
        (requested_ms as u64).min(duration_ms)
    }
}

/// Single-resource audio engine
pub struct PlaybackEngine<B: AudioBackend> {
    backend: B,
    sound: Mutex<Option<Box<dyn NativeSound>>>,
    slot: SharedSlot,
}

impl<B: AudioBackend> PlaybackEngine<B> {
    /// Create an engine holding nothing
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            sound: Mutex::new(None),
            slot: new_slot(),
        }
    }

    /// Access the platform backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply the OS audio session policy
    pub async fn initialize(&self, config: &AudioSessionConfig) -> Result<()> {
        self.backend
            .configure_session(config)
            .await
            .map_err(|e| match e {
                PlaybackError::SessionInit(_) => e,
                other => PlaybackError::SessionInit(other.to_string()),
            })
    }

    /// Release any held sound and open `path`
    ///
    /// `observer` is registered for the new sound. On failure nothing is left
    /// allocated and no observer stays registered.
    pub async fn load(
        &self,
        path: &Path,
        autoplay: bool,
        observer: Option<StatusObserver>,
    ) -> Result<LoadHandle> {
        let mut sound = self.sound.lock().await;
        self.release(&mut sound).await;

        let generation = {
            let mut slot = lock_slot(&self.slot);
            slot.observer = observer;
            slot.generation
        };
        let reporter = StatusReporter::new(self.slot.clone(), generation);

        debug!(path = %path.display(), autoplay, generation, "Opening sound");

        match self.backend.open(path, autoplay, reporter).await {
            Ok(native) => {
                *sound = Some(native);
                info!(path = %path.display(), generation, "Sound loaded");
                Ok(LoadHandle { generation })
            }
            Err(e) => {
                // Anything the backend reported before failing must not linger.
                self.detach();
                let reason = match e {
                    PlaybackError::Load { reason, .. } => reason,
                    other => other.to_string(),
                };
                warn!(path = %path.display(), %reason, "Failed to open sound");
                Err(PlaybackError::load(path, reason))
            }
        }
    }

    /// Pause output (no-op when nothing is held)
    pub async fn pause(&self) -> Result<()> {
        let mut sound = self.sound.lock().await;
        match sound.as_mut() {
            Some(native) => native.pause().await,
            None => {
                debug!("Pause requested with no sound loaded");
                Ok(())
            }
        }
    }

    /// Resume output (no-op when nothing is held)
    pub async fn resume(&self) -> Result<()> {
        let mut sound = self.sound.lock().await;
        match sound.as_mut() {
            Some(native) => native.play().await,
            None => {
                debug!("Resume requested with no sound loaded");
                Ok(())
            }
        }
    }

    /// Seek to `position_ms`, clamped into `[0, duration]`
    ///
    /// Returns the position actually applied, or `None` when nothing is held.
    pub async fn seek(&self, position_ms: i64) -> Result<Option<u64>> {
        let mut sound = self.sound.lock().await;
        let Some(native) = sound.as_mut() else {
            debug!(position_ms, "Seek requested with no sound loaded");
            return Ok(None);
        };

        let duration_ms = lock_slot(&self.slot).last_status.duration_ms;
        let target = clamp_position(position_ms, duration_ms);
        native.set_position(target).await?;
        Ok(Some(target))
    }

    /// Stop output and release the held sound (idempotent)
    pub async fn stop(&self) -> Result<()> {
        let mut sound = self.sound.lock().await;
        let stopped = match sound.as_mut() {
            Some(native) => native.stop().await,
            None => Ok(()),
        };
        self.release(&mut sound).await;
        stopped
    }

    /// Replace the status observer of the held sound
    ///
    /// Last registration wins. Cleared automatically on release.
    pub fn set_status_observer(&self, observer: Option<StatusObserver>) {
        lock_slot(&self.slot).observer = observer;
    }

    /// Last status reported for the held sound
    pub fn status(&self) -> PlaybackStatus {
        lock_slot(&self.slot).last_status.clone()
    }

    /// Whether a sound is currently held
    pub async fn is_loaded(&self) -> bool {
        self.sound.lock().await.is_some()
    }

    /// Invalidate the current reporter generation and drop the observer
    fn detach(&self) {
        let mut slot = lock_slot(&self.slot);
        slot.generation += 1;
        slot.observer = None;
        slot.last_status = PlaybackStatus::default();
    }

    /// Detach, then unload the held sound if any
    async fn release(&self, sound: &mut Option<Box<dyn NativeSound>>) {
        self.detach();
        if let Some(mut native) = sound.take() {
            if let Err(e) = native.unload().await {
                warn!(error = %e, "Failed to unload sound");
            }
        }
    }
}
