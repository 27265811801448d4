//! JSON sidecar persistence for recording metadata.
//!
//! The sidecar travels with the WAV file under the same stem, so a
//! directory of recordings stays self-describing without a database.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::RecorderError;
use crate::models::recording_result::RecordingMetadata;

fn sidecar_path(recording_path: &Path) -> PathBuf {
    recording_path.with_extension("metadata.json")
}

/// Persist `metadata` next to the recording it describes, as
/// `{recording}.metadata.json`.
pub fn write_metadata(
    metadata: &RecordingMetadata,
    recording_path: &Path,
) -> Result<(), RecorderError> {
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| RecorderError::Io(format!("metadata serialization failed: {}", e)))?;
    fs::write(sidecar_path(recording_path), json)
        .map_err(|e| RecorderError::io("metadata sidecar write failed", e))?;
    Ok(())
}

/// Load the sidecar written next to `recording_path`.
pub fn read_metadata(recording_path: &Path) -> Result<RecordingMetadata, RecorderError> {
    let json = fs::read_to_string(sidecar_path(recording_path))
        .map_err(|e| RecorderError::io("metadata sidecar read failed", e))?;
    serde_json::from_str(&json)
        .map_err(|e| RecorderError::Io(format!("metadata sidecar is not valid JSON: {}", e)))
}
