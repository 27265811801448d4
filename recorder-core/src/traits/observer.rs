use uuid::Uuid;

use crate::models::error::RecorderError;
use crate::models::recording_result::RecordingResult;
use crate::models::state::CaptureState;

/// Event observer for engine notifications.
///
/// Registered at the engine boundary so the exactly-once completion
/// contract is verifiable per session rather than depending on a shared
/// global event name. All methods are called from whatever thread detected
/// the event — control thread or audio thread; implementations marshal to
/// the UI thread if needed.
pub trait SessionObserver: Send + Sync {
    /// Called on every capture state transition.
    fn on_capture_state_changed(&self, state: CaptureState);

    /// Called when a recording stops normally and the file is finalized.
    fn on_recording_finished(&self, result: &RecordingResult);

    /// Called when an active stream dies asynchronously. Tagged distinctly
    /// from completion so a caller can tell "finished" from "died".
    fn on_stream_fault(&self, error: &RecorderError);

    /// Called exactly once per playback session, whether it drained
    /// naturally or was stopped.
    fn on_playback_completed(&self, session_id: Uuid);
}
