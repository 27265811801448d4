use thiserror::Error;

/// Errors that can occur during recording and playback operations.
///
/// Precondition failures (`InvalidConfig`, `AlreadyRecording`,
/// `NotRecording`, `UnsupportedSampleFormat`) are synchronous return values
/// from the call that detected them. `StreamFault` is asynchronous by nature
/// and is delivered through `SessionObserver::on_stream_fault`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("device enumeration failed: {0}")]
    DeviceEnumeration(String),

    #[error("no input device available")]
    NoDevice,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("a recording is already in progress")]
    AlreadyRecording,

    #[error("no recording in progress")]
    NotRecording,

    #[error("storage error: {0}")]
    Io(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("stream fault: {0}")]
    StreamFault(String),
}

impl RecorderError {
    /// Wrap an `std::io::Error` with context about the failed operation.
    pub fn io(context: &str, err: std::io::Error) -> Self {
        Self::Io(format!("{}: {}", context, err))
    }
}
