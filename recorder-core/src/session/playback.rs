use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::error::RecorderError;
use crate::models::state::PlaybackState;
use crate::processing::wav;
use crate::traits::capture_provider::FaultSink;
use crate::traits::observer::SessionObserver;
use crate::traits::playback_provider::{CompletionSink, PlaybackProvider};

/// Handle to one playback session.
///
/// `completed` is the exactly-once latch shared between the natural-drain
/// callback and the explicit stop path; whichever flips it first emits the
/// completion event.
struct PlaybackSession {
    id: Uuid,
    active: Arc<AtomicBool>,
    completed: Arc<AtomicBool>,
}

/// Playback orchestrator, generic over the platform output backend.
///
/// State transitions: `idle → playing → idle`. Starting while a session is
/// live follows last-start-wins: the prior session is stopped (emitting its
/// completion event) before the new source is decoded.
pub struct PlaybackEngine<P: PlaybackProvider> {
    provider: P,
    state: Arc<Mutex<PlaybackState>>,
    session: Option<PlaybackSession>,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl<P: PlaybackProvider> PlaybackEngine<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: Arc::new(Mutex::new(PlaybackState::Idle)),
            session: None,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observer = Some(observer);
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.lock()
    }

    pub fn is_playing(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.active.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Read a WAV file from disk and play it.
    pub fn play_file(&mut self, path: &Path) -> Result<Uuid, RecorderError> {
        let bytes =
            fs::read(path).map_err(|e| RecorderError::io("failed to read audio file", e))?;
        self.play_bytes(&bytes)
    }

    /// Decode a WAV byte buffer and play it.
    ///
    /// Decoding happens before the output stream opens, so malformed input
    /// fails fast and no device resources are touched. Returns the new
    /// session id.
    pub fn play_bytes(&mut self, bytes: &[u8]) -> Result<Uuid, RecorderError> {
        self.stop()?;

        let (info, samples) = wav::decode(bytes)?;
        if info.channels > 2 {
            return Err(RecorderError::Decode(format!(
                "unsupported channel count: {}",
                info.channels
            )));
        }

        let id = Uuid::new_v4();
        let active = Arc::new(AtomicBool::new(true));
        let completed = Arc::new(AtomicBool::new(false));

        let drain_active = Arc::clone(&active);
        let drain_completed = Arc::clone(&completed);
        let drain_state = Arc::clone(&self.state);
        let drain_observer = self.observer.clone();
        let on_complete: CompletionSink = Arc::new(move || {
            if !drain_completed.swap(true, Ordering::SeqCst) {
                drain_active.store(false, Ordering::SeqCst);
                *drain_state.lock() = PlaybackState::Idle;
                log::debug!("playback session {} drained", id);
                if let Some(ref observer) = drain_observer {
                    observer.on_playback_completed(id);
                }
            }
        });

        let fault_active = Arc::clone(&active);
        let fault_completed = Arc::clone(&completed);
        let fault_state = Arc::clone(&self.state);
        let fault_observer = self.observer.clone();
        let on_fault: FaultSink = Arc::new(move |error: RecorderError| {
            // A fault ends the session; the latch keeps a late drain
            // callback from emitting a second event.
            if !fault_completed.swap(true, Ordering::SeqCst) {
                fault_active.store(false, Ordering::SeqCst);
                *fault_state.lock() = PlaybackState::Idle;
                log::error!("playback stream fault: {}", error);
                if let Some(ref observer) = fault_observer {
                    observer.on_stream_fault(&error);
                }
            }
        });

        // The provider may drain a short clip synchronously inside
        // start(), so the session must be live before the call or its
        // Idle transition would be overwritten here.
        self.session = Some(PlaybackSession {
            id,
            active,
            completed,
        });
        *self.state.lock() = PlaybackState::Playing;

        let started = self.provider.start(
            info.channels,
            info.sample_rate,
            samples,
            on_complete,
            on_fault,
        );
        if let Err(e) = started {
            self.session = None;
            *self.state.lock() = PlaybackState::Idle;
            return Err(e);
        }

        log::info!(
            "playback started: session {} ({} ch @ {} Hz, {} frames)",
            id,
            info.channels,
            info.sample_rate,
            info.frame_count()
        );
        Ok(id)
    }

    /// Stop playback. A no-op when idle.
    ///
    /// Joins the output thread, then emits the completion event unless the
    /// session already drained on its own.
    pub fn stop(&mut self) -> Result<(), RecorderError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => return Ok(()),
        };

        self.provider.stop()?;
        *self.state.lock() = PlaybackState::Idle;

        if !session.completed.swap(true, Ordering::SeqCst) {
            session.active.store(false, Ordering::SeqCst);
            log::info!("playback session {} stopped", session.id);
            if let Some(ref observer) = self.observer {
                observer.on_playback_completed(session.id);
            }
        }
        Ok(())
    }
}
