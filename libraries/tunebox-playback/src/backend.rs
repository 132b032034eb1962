//! Native audio layer abstraction
//!
//! The engine never touches platform audio directly. A platform provides an
//! [`AudioBackend`] that opens local files into [`NativeSound`] handles and
//! pushes status changes through the [`StatusReporter`] it was given.

use crate::error::Result;
use crate::types::{AudioSessionConfig, PlaybackStatus};
use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

/// Callback receiving status updates for the held sound
///
/// Invoked while the engine's observer lock is held, so it must not block
/// or call back into the engine.
pub type StatusObserver = Arc<dyn Fn(PlaybackStatus) + Send + Sync>;

/// Platform audio output
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Apply the OS audio session policy
    ///
    /// Platforms without a session concept keep the default no-op.
    async fn configure_session(&self, config: &AudioSessionConfig) -> Result<()> {
        let _ = config;
        Ok(())
    }

    /// Open a local audio file
    ///
    /// Starts output immediately when `autoplay` is set. Must not leave any
    /// native resource allocated when it returns an error. The returned sound
    /// reports status through `reporter` until it is unloaded.
    async fn open(
        &self,
        path: &Path,
        autoplay: bool,
        reporter: StatusReporter,
    ) -> Result<Box<dyn NativeSound>>;
}

/// A single opened native sound
#[async_trait]
pub trait NativeSound: Send {
    /// Start or resume output
    async fn play(&mut self) -> Result<()>;

    /// Pause output
    async fn pause(&mut self) -> Result<()>;

    /// Move the playhead (already clamped by the engine)
    async fn set_position(&mut self, position_ms: u64) -> Result<()>;

    /// Stop output
    async fn stop(&mut self) -> Result<()>;

    /// Release all native resources held by this sound
    async fn unload(&mut self) -> Result<()>;
}

/// Observer registration shared between the engine and its reporters
pub(crate) struct ObserverSlot {
    /// Identifies the currently held sound; bumped on every release
    pub(crate) generation: u64,
    pub(crate) observer: Option<StatusObserver>,
    pub(crate) last_status: PlaybackStatus,
}

pub(crate) type SharedSlot = Arc<Mutex<ObserverSlot>>;

pub(crate) fn new_slot() -> SharedSlot {
    Arc::new(Mutex::new(ObserverSlot {
        generation: 0,
        observer: None,
        last_status: PlaybackStatus::default(),
    }))
}

pub(crate) fn lock_slot(slot: &SharedSlot) -> MutexGuard<'_, ObserverSlot> {
    // Observers never panic while holding the lock in practice; recover anyway.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Status channel handed to a native sound when it is opened
///
/// Bound to the engine generation the sound was opened in. Once the engine
/// releases that sound, reports are dropped before they reach any observer.
#[derive(Clone)]
pub struct StatusReporter {
    slot: SharedSlot,
    generation: u64,
}

impl StatusReporter {
    pub(crate) fn new(slot: SharedSlot, generation: u64) -> Self {
        Self { slot, generation }
    }

    /// Deliver a status change to the registered observer
    pub fn report(&self, status: PlaybackStatus) {
        let mut slot = lock_slot(&self.slot);
        if slot.generation != self.generation {
            trace!(
                generation = self.generation,
                current = slot.generation,
                "Dropping status from released sound"
            );
            return;
        }

        slot.last_status = status.clone();
        if let Some(observer) = &slot.observer {
            observer(status);
        }
    }

    /// Whether the sound this reporter belongs to is still held
    pub fn is_current(&self) -> bool {
        lock_slot(&self.slot).generation == self.generation
    }
}

impl std::fmt::Debug for StatusReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusReporter")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
