//! cpal microphone capture provider.
//!
//! `cpal::Stream` is not `Send`, so a dedicated thread builds and owns the
//! stream and parks on a running flag; `stop()` flips the flag and joins,
//! which is what gives the engine its no-callbacks-after-stop guarantee.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use parking_lot::Mutex;

use recorder_core::processing::normalizer;
use recorder_core::{AudioConfig, CaptureProvider, DeviceInfo, FaultSink, RecorderError, SampleSink};

use crate::catalog::DeviceCatalog;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Microphone capture via cpal, delivering normalized i16 chunks.
pub struct CpalMicInput {
    running: Arc<AtomicBool>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl CpalMicInput {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }
}

impl Default for CpalMicInput {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureProvider for CpalMicInput {
    fn device_info(&self, config: &AudioConfig) -> Result<DeviceInfo, RecorderError> {
        let catalog = DeviceCatalog::new();
        let device = catalog.find_input_device(config.device_id.as_deref())?;
        catalog.describe(&device)
    }

    fn start(
        &mut self,
        config: &AudioConfig,
        on_samples: SampleSink,
        on_fault: FaultSink,
    ) -> Result<(), RecorderError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(RecorderError::AlreadyRecording);
        }

        let (ready_tx, ready_rx) = mpsc::channel();
        let running = Arc::clone(&self.running);
        let config = config.clone();

        let spawn_result = thread::Builder::new()
            .name("cpal-input".into())
            .spawn(move || {
                capture_loop(config, on_samples, on_fault, Arc::clone(&running), ready_tx);
                running.store(false, Ordering::SeqCst);
            });
        let handle = match spawn_result {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(RecorderError::StreamFault(format!(
                    "failed to spawn capture thread: {}",
                    e
                )));
            }
        };

        // Negotiation happens on the capture thread; block until it reports
        // the stream live or dead so failures surface from this call.
        match ready_rx.recv() {
            Ok(Ok(())) => {
                *self.handle.lock() = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(RecorderError::StreamFault(
                    "capture thread exited during startup".into(),
                ))
            }
        }
    }

    fn stop(&mut self) -> Result<(), RecorderError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
        Ok(())
    }
}

/// Owns the stream for the life of the capture.
fn capture_loop(
    config: AudioConfig,
    on_samples: SampleSink,
    on_fault: FaultSink,
    running: Arc<AtomicBool>,
    ready_tx: mpsc::Sender<Result<(), RecorderError>>,
) {
    let stream = match open_input_stream(&config, on_samples, on_fault) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };
    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(RecorderError::StreamFault(e.to_string())));
        return;
    }
    let _ = ready_tx.send(Ok(()));

    while running.load(Ordering::SeqCst) {
        thread::sleep(POLL_INTERVAL);
    }
    drop(stream);
}

fn open_input_stream(
    config: &AudioConfig,
    on_samples: SampleSink,
    on_fault: FaultSink,
) -> Result<cpal::Stream, RecorderError> {
    let catalog = DeviceCatalog::new();
    let device = catalog.find_input_device(config.device_id.as_deref())?;
    let sample_format = select_sample_format(&device, config)?;

    let stream_config = cpal::StreamConfig {
        channels: config.channels,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let err_fn = {
        let on_fault = Arc::clone(&on_fault);
        move |err: cpal::StreamError| on_fault(RecorderError::StreamFault(err.to_string()))
    };

    log::debug!(
        "opening input stream: {} ch @ {} Hz, native format {}",
        config.channels,
        config.sample_rate,
        sample_format
    );

    let stream = match sample_format {
        cpal::SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| on_samples(data),
            err_fn,
            None,
        ),
        cpal::SampleFormat::U16 => {
            // Scratch buffer reused across callbacks; steady state is
            // allocation-free once it has grown to the chunk size.
            let mut scratch: Vec<i16> = Vec::new();
            device.build_input_stream(
                &stream_config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    normalizer::extend_from_u16(&mut scratch, data);
                    on_samples(&scratch);
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::F32 => {
            let mut scratch: Vec<i16> = Vec::new();
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    normalizer::extend_from_f32(&mut scratch, data);
                    on_samples(&scratch);
                },
                err_fn,
                None,
            )
        }
        other => return Err(RecorderError::UnsupportedSampleFormat(other.to_string())),
    };

    stream.map_err(|e| RecorderError::StreamFault(format!("failed to open input stream: {}", e)))
}

/// Pick the native format to request for the configured channels and rate.
///
/// i16 is preferred (no conversion), then f32, then u16. A device that only
/// offers the combination in an unhandled format fails here, before any
/// stream is opened.
fn select_sample_format(
    device: &cpal::Device,
    config: &AudioConfig,
) -> Result<cpal::SampleFormat, RecorderError> {
    let ranges = device
        .supported_input_configs()
        .map_err(|e| RecorderError::DeviceEnumeration(e.to_string()))?;

    let mut best: Option<cpal::SampleFormat> = None;
    let mut rejected: Option<cpal::SampleFormat> = None;
    for range in ranges {
        if range.channels() != config.channels
            || config.sample_rate < range.min_sample_rate().0
            || config.sample_rate > range.max_sample_rate().0
        {
            continue;
        }
        match range.sample_format() {
            cpal::SampleFormat::I16 => return Ok(cpal::SampleFormat::I16),
            cpal::SampleFormat::F32 => best = Some(cpal::SampleFormat::F32),
            cpal::SampleFormat::U16 => {
                if best.is_none() {
                    best = Some(cpal::SampleFormat::U16);
                }
            }
            other => rejected = Some(other),
        }
    }

    match (best, rejected) {
        (Some(format), _) => Ok(format),
        (None, Some(format)) => Err(RecorderError::UnsupportedSampleFormat(format.to_string())),
        (None, None) => Err(RecorderError::InvalidConfig(format!(
            "device does not support {} ch @ {} Hz",
            config.channels, config.sample_rate
        ))),
    }
}
