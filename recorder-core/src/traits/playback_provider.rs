use std::sync::Arc;

use crate::models::error::RecorderError;

use super::capture_provider::FaultSink;

/// Callback invoked once all queued samples have been delivered to the
/// hardware. Not invoked on explicit `stop()`; the engine owns the
/// exactly-once completion contract either way.
pub type CompletionSink = Arc<dyn Fn() + Send + Sync + 'static>;

/// Interface for platform-specific audio output sinks.
pub trait PlaybackProvider: Send + Sync {
    /// Open an output stream matching the clip format and begin delivering
    /// `samples` (interleaved i16 frames) to the hardware.
    ///
    /// Fails before any stream is opened if the format cannot be sustained.
    fn start(
        &mut self,
        channels: u16,
        sample_rate: u32,
        samples: Vec<i16>,
        on_complete: CompletionSink,
        on_fault: FaultSink,
    ) -> Result<(), RecorderError>;

    /// Stop playback and release the stream.
    ///
    /// Must not return until the playback thread has quiesced. Safe to call
    /// when nothing is playing.
    fn stop(&mut self) -> Result<(), RecorderError>;
}
