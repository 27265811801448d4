//! # recorder-cpal
//!
//! Cross-platform cpal backend for recorder-core.
//!
//! Provides:
//! - `CpalMicInput` — microphone capture via a cpal input stream
//! - `CpalPlaybackOutput` — speaker playback via a cpal output stream
//! - `DeviceCatalog` — input device enumeration on the default host
//! - `RecorderController` — command facade bundling capture and playback
//!
//! ## Usage
//! ```ignore
//! use recorder_cpal::RecorderController;
//!
//! let controller = RecorderController::new("recordings".into());
//! controller.start_recording()?;
//! let info = controller.stop_recording()?;
//! controller.play_audio_file(info.file_path.as_ref())?;
//! ```

pub mod catalog;
pub mod controller;
pub mod input;
pub mod output;

pub use catalog::DeviceCatalog;
pub use controller::{AudioPayload, DeviceList, RecorderController, RecordingConfig, RecordingInfo};
pub use input::CpalMicInput;
pub use output::CpalPlaybackOutput;
