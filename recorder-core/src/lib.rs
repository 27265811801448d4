//! # recorder-core
//!
//! Platform-agnostic audio recording core library.
//!
//! Provides sample normalization, WAV encoding and decoding, capture and
//! playback session orchestration, and recording storage. Platform backends
//! implement the `CaptureProvider` and `PlaybackProvider` traits and plug
//! into the generic `CaptureEngine` and `PlaybackEngine`.
//!
//! ## Architecture
//!
//! ```text
//! recorder-core (this crate)
//! ├── traits/       ← CaptureProvider, PlaybackProvider, SessionObserver
//! ├── models/       ← RecorderError, AudioConfig, DeviceInfo, CaptureState, etc.
//! ├── processing/   ← sample normalization, WAV header generation and decoding
//! ├── session/      ← CaptureEngine, PlaybackEngine (generic orchestrators)
//! └── storage/      ← WavFileWriter, metadata sidecars
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{AudioConfig, SUPPORTED_SAMPLE_RATES};
pub use models::device::{DeviceInfo, FormatSupport, SampleEncoding};
pub use models::error::RecorderError;
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::{CaptureState, PlaybackState};
pub use session::capture::CaptureEngine;
pub use session::playback::PlaybackEngine;
pub use storage::wav_writer::WavFileWriter;
pub use traits::capture_provider::{CaptureProvider, FaultSink, SampleSink};
pub use traits::observer::SessionObserver;
pub use traits::playback_provider::{CompletionSink, PlaybackProvider};
