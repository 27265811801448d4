use std::sync::Arc;

use crate::models::config::AudioConfig;
use crate::models::device::DeviceInfo;
use crate::models::error::RecorderError;

/// Callback invoked with a chunk of normalized 16-bit samples.
///
/// Fires on a dedicated audio thread — keep processing minimal. The chunk
/// is interleaved by channel.
pub type SampleSink = Arc<dyn Fn(&[i16]) + Send + Sync + 'static>;

/// Callback invoked when the underlying stream dies asynchronously
/// (device unplugged, driver fault).
pub type FaultSink = Arc<dyn Fn(RecorderError) + Send + Sync + 'static>;

/// Interface for platform-specific audio input sources.
///
/// Implemented by `CpalMicInput` in the cpal backend; test doubles
/// implement it directly in the session tests.
pub trait CaptureProvider: Send + Sync {
    /// Description of the device this provider will open, including its
    /// supported channel/rate combinations. Fails with `NoDevice` when the
    /// configured device cannot be resolved.
    fn device_info(&self, config: &AudioConfig) -> Result<DeviceInfo, RecorderError>;

    /// Open the input stream and begin delivering normalized chunks.
    ///
    /// Returns synchronously once the stream is live; negotiation failures
    /// (`UnsupportedSampleFormat`, `StreamFault`) surface here, never
    /// mid-capture.
    fn start(
        &mut self,
        config: &AudioConfig,
        on_samples: SampleSink,
        on_fault: FaultSink,
    ) -> Result<(), RecorderError>;

    /// Stop capturing and release the stream.
    ///
    /// Must not return until the capture thread has quiesced — no further
    /// `SampleSink` invocations after this call completes.
    fn stop(&mut self) -> Result<(), RecorderError>;
}
