//! End-to-end exercise of the core engines with in-process backends:
//! capture N frames, stop, decode the file, play it back, drain.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::tempdir;

use recorder_core::processing::wav;
use recorder_core::{
    AudioConfig, CaptureEngine, CaptureProvider, CaptureState, CompletionSink, DeviceInfo,
    FaultSink, FormatSupport, PlaybackEngine, PlaybackProvider, PlaybackState, RecorderError,
    RecordingResult, SampleEncoding, SampleSink, SessionObserver,
};

#[derive(Clone)]
struct LoopbackMic {
    sink: Arc<Mutex<Option<SampleSink>>>,
}

impl LoopbackMic {
    fn new() -> Self {
        Self {
            sink: Arc::new(Mutex::new(None)),
        }
    }

    fn deliver(&self, chunk: &[i16]) {
        let guard = self.sink.lock();
        let on_samples = guard.as_ref().expect("stream not started");
        on_samples(chunk);
    }
}

impl CaptureProvider for LoopbackMic {
    fn device_info(&self, _config: &AudioConfig) -> Result<DeviceInfo, RecorderError> {
        Ok(DeviceInfo {
            id: "loopback".into(),
            name: "Loopback".into(),
            is_default: true,
            default_channels: 2,
            default_sample_rate: 44100,
            supported: vec![
                FormatSupport {
                    channels: 1,
                    min_sample_rate: 8000,
                    max_sample_rate: 48000,
                    encoding: SampleEncoding::I16,
                },
                FormatSupport {
                    channels: 2,
                    min_sample_rate: 8000,
                    max_sample_rate: 48000,
                    encoding: SampleEncoding::I16,
                },
            ],
        })
    }

    fn start(
        &mut self,
        _config: &AudioConfig,
        on_samples: SampleSink,
        _on_fault: FaultSink,
    ) -> Result<(), RecorderError> {
        *self.sink.lock() = Some(on_samples);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RecorderError> {
        *self.sink.lock() = None;
        Ok(())
    }
}

/// Output backend that drains synchronously, capturing what it was asked
/// to play.
#[derive(Clone, Default)]
struct InstantSpeaker {
    played: Arc<Mutex<Vec<i16>>>,
    format: Arc<Mutex<Option<(u16, u32)>>>,
}

impl PlaybackProvider for InstantSpeaker {
    fn start(
        &mut self,
        channels: u16,
        sample_rate: u32,
        samples: Vec<i16>,
        on_complete: CompletionSink,
        _on_fault: FaultSink,
    ) -> Result<(), RecorderError> {
        *self.format.lock() = Some((channels, sample_rate));
        *self.played.lock() = samples;
        on_complete();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RecorderError> {
        Ok(())
    }
}

#[derive(Default)]
struct CountingObserver {
    finished: AtomicUsize,
}

impl SessionObserver for CountingObserver {
    fn on_capture_state_changed(&self, _state: CaptureState) {}
    fn on_recording_finished(&self, _result: &RecordingResult) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
    fn on_stream_fault(&self, _error: &RecorderError) {}
    fn on_playback_completed(&self, _session_id: uuid::Uuid) {}
}

#[test]
fn record_stop_decode_play_round_trip() {
    let dir = tempdir().unwrap();
    let mic = LoopbackMic::new();
    let mut capture = CaptureEngine::new(mic.clone(), dir.path().to_path_buf());
    capture
        .set_config(AudioConfig {
            channels: 2,
            sample_rate: 44100,
            ..Default::default()
        })
        .unwrap();

    capture.start().unwrap();
    assert_eq!(capture.state(), CaptureState::Recording);

    // 1000 stereo frames in uneven hardware-sized chunks.
    let signal: Vec<i16> = (0..2000).map(|i| (i % 601) as i16 - 300).collect();
    for chunk in signal.chunks(441) {
        mic.deliver(chunk);
    }

    let result = capture.stop().unwrap();
    assert_eq!(capture.state(), CaptureState::Idle);
    assert_eq!(result.sample_count, 2000);
    assert_eq!(result.metadata.channels, 2);

    let bytes = std::fs::read(&result.file_path).unwrap();
    let (info, decoded) = wav::decode(&bytes).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.sample_rate, 44100);
    assert_eq!(info.frame_count(), 1000);
    assert_eq!(decoded, signal);

    // Play the recording back through the output engine.
    let speaker = InstantSpeaker::default();
    let mut playback = PlaybackEngine::new(speaker.clone());
    playback.play_file(&result.file_path).unwrap();

    assert_eq!(*speaker.format.lock(), Some((2, 44100)));
    assert_eq!(*speaker.played.lock(), signal);
    // The provider drained synchronously, so the engine is idle again.
    assert_eq!(playback.state(), PlaybackState::Idle);
}

#[test]
fn consecutive_recordings_produce_distinct_files() {
    let dir = tempdir().unwrap();
    let mic = LoopbackMic::new();
    let observer = Arc::new(CountingObserver::default());
    let mut capture = CaptureEngine::new(mic.clone(), dir.path().to_path_buf());
    capture.set_observer(observer.clone());

    capture.start().unwrap();
    mic.deliver(&[1i16; 100]);
    let first = capture.stop().unwrap();

    capture.start().unwrap();
    mic.deliver(&[2i16; 200]);
    let second = capture.stop().unwrap();

    assert_ne!(first.file_path, second.file_path);
    assert_eq!(first.sample_count, 100);
    assert_eq!(second.sample_count, 200);
    assert_eq!(observer.finished.load(Ordering::SeqCst), 2);

    // Second recording carries no residue from the first.
    let bytes = std::fs::read(&second.file_path).unwrap();
    let (_, decoded) = wav::decode(&bytes).unwrap();
    assert!(decoded.iter().all(|&s| s == 2));
}
