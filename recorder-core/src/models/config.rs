use serde::{Deserialize, Serialize};

use super::device::DeviceInfo;
use super::error::RecorderError;

/// Sample rates the engine accepts.
pub const SUPPORTED_SAMPLE_RATES: [u32; 5] = [8000, 16000, 22050, 44100, 48000];

/// Configuration for a capture session.
///
/// Output bit depth is fixed at 16; device-native encodings are normalized
/// on the way into the session buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Specific input device ID, or None for the system default.
    pub device_id: Option<String>,

    /// Number of channels (1 = mono, 2 = stereo).
    pub channels: u16,

    /// Sample rate in Hz. Must be one of `SUPPORTED_SAMPLE_RATES`.
    pub sample_rate: u32,

    /// Bit depth of the written container. Always 16.
    pub bit_depth: u16,
}

impl AudioConfig {
    /// Structural validation, independent of any device.
    pub fn validate(&self) -> Result<(), RecorderError> {
        if !matches!(self.channels, 1 | 2) {
            return Err(RecorderError::InvalidConfig(format!(
                "unsupported channel count: {}",
                self.channels
            )));
        }
        if !SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(RecorderError::InvalidConfig(format!(
                "unsupported sample rate: {}",
                self.sample_rate
            )));
        }
        if self.bit_depth != 16 {
            return Err(RecorderError::InvalidConfig(format!(
                "unsupported bit depth: {}",
                self.bit_depth
            )));
        }
        Ok(())
    }

    /// Validate against what the selected device reports as supported.
    ///
    /// A mismatch is a hard rejection; the engine never silently falls back
    /// to device defaults.
    pub fn validate_for_device(&self, device: &DeviceInfo) -> Result<(), RecorderError> {
        self.validate()?;
        if !device.supports(self.channels, self.sample_rate) {
            return Err(RecorderError::InvalidConfig(format!(
                "device '{}' does not support {} ch @ {} Hz",
                device.name, self.channels, self.sample_rate
            )));
        }
        Ok(())
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device_id: None,
            channels: 1,
            sample_rate: 44100,
            bit_depth: 16,
        }
    }
}
