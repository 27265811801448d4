use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::config::AudioConfig;
use crate::models::error::RecorderError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::models::state::CaptureState;
use crate::storage::{metadata, wav_writer};
use crate::traits::capture_provider::{CaptureProvider, FaultSink, SampleSink};
use crate::traits::observer::SessionObserver;

/// Seconds of audio the session buffer is pre-sized for; growth beyond
/// that is amortized by `Vec`.
const BUFFER_PREALLOC_SECS: usize = 5;

/// Transient ownership object for one active recording.
///
/// The engine holds at most one of these, so "exactly one live capture" is
/// structural rather than a convention around global flags.
struct CaptureSession {
    id: Uuid,
    active: Arc<AtomicBool>,
    buffer: Arc<Mutex<Vec<i16>>>,
    config: AudioConfig,
    started_at: Instant,
}

/// Capture orchestrator, generic over the platform input backend.
///
/// State transitions: `idle → starting → recording → stopping → idle`.
/// The hardware callback appends normalized chunks to the session buffer
/// under a short-lived lock; the stop path joins the capture thread before
/// draining, so the drain never races an append.
pub struct CaptureEngine<P: CaptureProvider> {
    provider: P,
    config: AudioConfig,
    output_dir: PathBuf,
    state: Arc<Mutex<CaptureState>>,
    session: Option<CaptureSession>,
    observer: Option<Arc<dyn SessionObserver>>,
}

impl<P: CaptureProvider> CaptureEngine<P> {
    pub fn new(provider: P, output_dir: PathBuf) -> Self {
        Self {
            provider,
            config: AudioConfig::default(),
            output_dir,
            state: Arc::new(Mutex::new(CaptureState::Idle)),
            session: None,
            observer: None,
        }
    }

    pub fn set_observer(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observer = Some(observer);
    }

    pub fn state(&self) -> CaptureState {
        *self.state.lock()
    }

    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    pub fn is_recording(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.active.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    /// Replace the engine configuration. Rejected while a session is live.
    pub fn set_config(&mut self, config: AudioConfig) -> Result<(), RecorderError> {
        if self.is_recording() {
            return Err(RecorderError::AlreadyRecording);
        }
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Start a capture session. Transitions: `idle → starting → recording`.
    ///
    /// Validation failures return the engine to `idle`; a second `start`
    /// while a session is live fails with `AlreadyRecording` and leaves the
    /// running session untouched.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if let Some(session) = &self.session {
            if session.active.load(Ordering::SeqCst) {
                return Err(RecorderError::AlreadyRecording);
            }
            // Prior session ended via a stream fault; discard the husk.
            self.session = None;
        }

        self.set_state(CaptureState::Starting);

        let device = match self.provider.device_info(&self.config) {
            Ok(device) => device,
            Err(e) => {
                self.set_state(CaptureState::Idle);
                return Err(e);
            }
        };
        if let Err(e) = self.config.validate_for_device(&device) {
            self.set_state(CaptureState::Idle);
            return Err(e);
        }

        let capacity =
            self.config.sample_rate as usize * self.config.channels as usize * BUFFER_PREALLOC_SECS;
        let buffer = Arc::new(Mutex::new(Vec::with_capacity(capacity)));
        let active = Arc::new(AtomicBool::new(true));

        let sink_buffer = Arc::clone(&buffer);
        let sink_active = Arc::clone(&active);
        let on_samples: SampleSink = Arc::new(move |chunk: &[i16]| {
            if !sink_active.load(Ordering::Acquire) {
                return;
            }
            // Short critical section; contention only with the stop-path
            // drain. No I/O under the lock.
            sink_buffer.lock().extend_from_slice(chunk);
        });

        let fault_active = Arc::clone(&active);
        let fault_state = Arc::clone(&self.state);
        let fault_observer = self.observer.clone();
        let on_fault: FaultSink = Arc::new(move |error: RecorderError| {
            // At most one unsolicited transition per session.
            if fault_active.swap(false, Ordering::SeqCst) {
                *fault_state.lock() = CaptureState::Idle;
                log::error!("capture stream fault: {}", error);
                if let Some(ref observer) = fault_observer {
                    observer.on_capture_state_changed(CaptureState::Idle);
                    observer.on_stream_fault(&error);
                }
            }
        });

        if let Err(e) = self.provider.start(&self.config, on_samples, on_fault) {
            self.set_state(CaptureState::Idle);
            return Err(e);
        }

        let session = CaptureSession {
            id: Uuid::new_v4(),
            active,
            buffer,
            config: self.config.clone(),
            started_at: Instant::now(),
        };
        log::info!(
            "recording started: session {} ({} ch @ {} Hz)",
            session.id,
            session.config.channels,
            session.config.sample_rate
        );
        self.session = Some(session);
        self.set_state(CaptureState::Recording);
        Ok(())
    }

    /// Stop the session, finalize the WAV file, and return the result.
    /// Transitions: `recording → stopping → idle`.
    pub fn stop(&mut self) -> Result<RecordingResult, RecorderError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => return Err(RecorderError::NotRecording),
        };
        if !session.active.swap(false, Ordering::SeqCst) {
            // The stream already died; there is nothing to finish.
            return Err(RecorderError::NotRecording);
        }

        self.set_state(CaptureState::Stopping);

        // Joins the capture thread: after this no further appends occur.
        if let Err(e) = self.provider.stop() {
            self.set_state(CaptureState::Idle);
            return Err(e);
        }

        let samples = std::mem::take(&mut *session.buffer.lock());
        let file_path = self.output_dir.join(format!("recording_{}.wav", session.id));

        let write_result = wav_writer::write_wav_file(
            &file_path,
            &samples,
            session.config.sample_rate,
            session.config.channels,
        );
        if let Err(e) = write_result {
            self.set_state(CaptureState::Idle);
            return Err(e);
        }

        let meta = RecordingMetadata::new(
            session.config.channels,
            session.config.sample_rate,
            samples.len(),
            &file_path.to_string_lossy(),
        );
        if let Err(e) = metadata::write_metadata(&meta, &file_path) {
            log::warn!("failed to write metadata sidecar: {}", e);
        }

        let result = RecordingResult {
            file_path,
            sample_count: samples.len(),
            duration_secs: meta.duration_secs,
            metadata: meta,
        };

        log::info!(
            "recording stopped: {} samples in {:.1}s wall time -> {:?}",
            result.sample_count,
            session.started_at.elapsed().as_secs_f64(),
            result.file_path
        );

        self.set_state(CaptureState::Idle);
        if let Some(ref observer) = self.observer {
            observer.on_recording_finished(&result);
        }
        Ok(result)
    }

    fn set_state(&self, new_state: CaptureState) {
        *self.state.lock() = new_state;
        if let Some(ref observer) = self.observer {
            observer.on_capture_state_changed(new_state);
        }
    }
}
