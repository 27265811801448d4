/// Capture engine state machine.
///
/// State transitions:
/// ```text
/// idle → starting → recording → stopping → idle
///           ↓ (invalid config)     ↑
///          idle                  stop()
/// ```
///
/// An asynchronous stream fault forces `recording → idle` directly; the
/// transition is surfaced via `SessionObserver::on_stream_fault`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Starting,
    Recording,
    Stopping,
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}

/// Playback engine state machine: `idle → playing → idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}
