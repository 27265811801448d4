use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Result returned when a capture session completes successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    /// Total normalized samples written (frames × channels).
    pub sample_count: usize,
    /// `sample_count / (sample_rate * channels)`.
    pub duration_secs: f64,
    pub metadata: RecordingMetadata,
}

/// Metadata stored alongside a recording as a JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub created_at: String,
    pub channels: u16,
    pub sample_rate: u32,
    pub sample_count: usize,
    pub duration_secs: f64,
    pub file_path: String,
}

impl RecordingMetadata {
    pub fn new(
        channels: u16,
        sample_rate: u32,
        sample_count: usize,
        file_path: &str,
    ) -> Self {
        let duration_secs = sample_count as f64 / (sample_rate as f64 * channels as f64);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            channels,
            sample_rate,
            sample_count,
            duration_secs,
            file_path: file_path.to_string(),
        }
    }
}
