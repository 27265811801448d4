//! High-level command surface over the capture and playback engines.
//!
//! `RecorderController` is what an application embeds: one value exposing
//! the full record/playback lifecycle with serializable payloads, suitable
//! for wiring to an IPC layer or command handler.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use recorder_core::{
    AudioConfig, CaptureEngine, CaptureState, DeviceInfo, PlaybackEngine, PlaybackState,
    RecorderError, SessionObserver,
};

use crate::catalog::DeviceCatalog;
use crate::input::CpalMicInput;
use crate::output::CpalPlaybackOutput;

/// Configuration received from an application frontend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingConfig {
    pub device_id: Option<String>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl From<RecordingConfig> for AudioConfig {
    fn from(config: RecordingConfig) -> Self {
        Self {
            device_id: config.device_id,
            channels: config.channels,
            sample_rate: config.sample_rate,
            bit_depth: 16,
        }
    }
}

/// Info about a finished recording, returned to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingInfo {
    pub file_path: String,
    pub file_name: String,
    pub size_bytes: u64,
    pub sample_count: usize,
    pub duration_secs: f64,
    pub created_at: String,
}

/// A recording's bytes, base64-encoded for transport to a frontend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPayload {
    pub mime_type: String,
    pub data: String,
}

/// The device listing plus whichever device the current config selects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceList {
    pub devices: Vec<DeviceInfo>,
    pub current: Option<DeviceInfo>,
}

/// Facade bundling device listing, capture, and playback.
pub struct RecorderController {
    catalog: DeviceCatalog,
    capture: Mutex<CaptureEngine<CpalMicInput>>,
    playback: Mutex<PlaybackEngine<CpalPlaybackOutput>>,
}

impl RecorderController {
    /// Create a controller writing recordings into `output_dir`.
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            catalog: DeviceCatalog::new(),
            capture: Mutex::new(CaptureEngine::new(CpalMicInput::new(), output_dir)),
            playback: Mutex::new(PlaybackEngine::new(CpalPlaybackOutput::new())),
        }
    }

    /// Register an observer on both engines.
    pub fn set_observer(&self, observer: std::sync::Arc<dyn SessionObserver>) {
        self.capture.lock().set_observer(observer.clone());
        self.playback.lock().set_observer(observer);
    }

    /// List input devices, flagging the one the current config selects
    /// (the system default when no device is pinned).
    pub fn list_devices(&self) -> Result<DeviceList, RecorderError> {
        let devices = self.catalog.list_input_devices()?;
        let selected_id = self.capture.lock().config().device_id.clone();
        let current = match selected_id {
            Some(id) => devices.iter().find(|d| d.id == id).cloned(),
            None => devices.iter().find(|d| d.is_default).cloned(),
        };
        Ok(DeviceList { devices, current })
    }

    /// Apply a new capture configuration. Fails while recording.
    pub fn set_audio_config(&self, config: RecordingConfig) -> Result<(), RecorderError> {
        self.capture.lock().set_config(config.into())
    }

    pub fn start_recording(&self) -> Result<(), RecorderError> {
        self.capture.lock().start()
    }

    pub fn stop_recording(&self) -> Result<RecordingInfo, RecorderError> {
        let result = self.capture.lock().stop()?;

        let file_name = result
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let size_bytes = fs::metadata(&result.file_path).map(|m| m.len()).unwrap_or(0);

        Ok(RecordingInfo {
            file_path: result.file_path.to_string_lossy().to_string(),
            file_name,
            size_bytes,
            sample_count: result.sample_count,
            duration_secs: result.duration_secs,
            created_at: result.metadata.created_at,
        })
    }

    /// Load a recording from disk, base64-encoded for transport.
    pub fn get_audio_data(&self, path: &Path) -> Result<AudioPayload, RecorderError> {
        let bytes =
            fs::read(path).map_err(|e| RecorderError::io("failed to read recording", e))?;
        Ok(AudioPayload {
            mime_type: "audio/wav".into(),
            data: BASE64.encode(bytes),
        })
    }

    pub fn play_audio_file(&self, path: &Path) -> Result<Uuid, RecorderError> {
        self.playback.lock().play_file(path)
    }

    pub fn play_audio_bytes(&self, bytes: &[u8]) -> Result<Uuid, RecorderError> {
        self.playback.lock().play_bytes(bytes)
    }

    pub fn stop_audio(&self) -> Result<(), RecorderError> {
        self.playback.lock().stop()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture.lock().state()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback.lock().state()
    }

    pub fn is_recording(&self) -> bool {
        self.capture.lock().is_recording()
    }
}
