//! cpal playback output provider.
//!
//! Mirrors the input side: a dedicated thread owns the output stream and a
//! cursor over the decoded clip. The audio callback only copies samples and
//! flips a drained flag; completion is reported from the owning thread after
//! the tail of the clip has left the hardware buffer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, StreamTrait};
use parking_lot::Mutex;

use recorder_core::{CompletionSink, FaultSink, PlaybackProvider, RecorderError};

use crate::catalog::DeviceCatalog;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Grace period after the cursor reaches the end, covering whatever is
/// still queued in the device buffer.
const DRAIN_GRACE: Duration = Duration::from_millis(150);

/// Speaker output via cpal.
pub struct CpalPlaybackOutput {
    running: Arc<AtomicBool>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl CpalPlaybackOutput {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }
}

impl Default for CpalPlaybackOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackProvider for CpalPlaybackOutput {
    fn start(
        &mut self,
        channels: u16,
        sample_rate: u32,
        samples: Vec<i16>,
        on_complete: CompletionSink,
        on_fault: FaultSink,
    ) -> Result<(), RecorderError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(RecorderError::StreamFault(
                "playback stream already open".into(),
            ));
        }

        let (ready_tx, ready_rx) = mpsc::channel();
        let running = Arc::clone(&self.running);

        let spawn_result = thread::Builder::new()
            .name("cpal-output".into())
            .spawn(move || {
                playback_loop(
                    channels,
                    sample_rate,
                    samples,
                    on_complete,
                    on_fault,
                    Arc::clone(&running),
                    ready_tx,
                );
                running.store(false, Ordering::SeqCst);
            });
        let handle = match spawn_result {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(RecorderError::StreamFault(format!(
                    "failed to spawn playback thread: {}",
                    e
                )));
            }
        };

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
                    "playback thread exited during startup".into(),
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

fn playback_loop(
    channels: u16,
    sample_rate: u32,
    samples: Vec<i16>,
    on_complete: CompletionSink,
    on_fault: FaultSink,
    running: Arc<AtomicBool>,
    ready_tx: mpsc::Sender<Result<(), RecorderError>>,
) {
    let drained = Arc::new(AtomicBool::new(false));
    let stream = match open_output_stream(
        channels,
        sample_rate,
        samples,
        Arc::clone(&drained),
        on_fault,
    ) {
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

    while running.load(Ordering::SeqCst) && !drained.load(Ordering::SeqCst) {
        thread::sleep(POLL_INTERVAL);
    }

    let finished_naturally = drained.load(Ordering::SeqCst);
    if finished_naturally {
        thread::sleep(DRAIN_GRACE);
    }
    drop(stream);
    if finished_naturally {
        on_complete();
    }
}

fn open_output_stream(
    channels: u16,
    sample_rate: u32,
    samples: Vec<i16>,
    drained: Arc<AtomicBool>,
    on_fault: FaultSink,
) -> Result<cpal::Stream, RecorderError> {
    let catalog = DeviceCatalog::new();
    let device = catalog.default_output_device()?;
    let sample_format = select_sample_format(&device, channels, sample_rate)?;

    let stream_config = cpal::StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let err_fn = {
        let on_fault = Arc::clone(&on_fault);
        move |err: cpal::StreamError| on_fault(RecorderError::StreamFault(err.to_string()))
    };

    log::debug!(
        "opening output stream: {} ch @ {} Hz, native format {}",
        channels,
        sample_rate,
        sample_format
    );

    let cursor = Arc::new(AtomicUsize::new(0));
    let stream = match sample_format {
        cpal::SampleFormat::I16 => device.build_output_stream(
            &stream_config,
            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                fill(data, &samples, &cursor, &drained, |s| s)
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_output_stream(
            &stream_config,
            move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                fill(data, &samples, &cursor, &drained, |s| {
                    (s as i32 + 32768) as u16
                })
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::F32 => device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                fill(data, &samples, &cursor, &drained, |s| {
                    s as f32 / 32768.0
                })
            },
            err_fn,
            None,
        ),
        other => return Err(RecorderError::UnsupportedSampleFormat(other.to_string())),
    };

    stream.map_err(|e| RecorderError::StreamFault(format!("failed to open output stream: {}", e)))
}

/// Copy the next slice of the clip into the device buffer, padding with
/// silence past the end. Runs on the realtime audio thread.
fn fill<T: cpal::Sample>(
    data: &mut [T],
    samples: &[i16],
    cursor: &AtomicUsize,
    drained: &AtomicBool,
    convert: impl Fn(i16) -> T,
) {
    let start = cursor.load(Ordering::Relaxed);
    for (i, slot) in data.iter_mut().enumerate() {
        let pos = start + i;
        *slot = if pos < samples.len() {
            convert(samples[pos])
        } else {
            T::EQUILIBRIUM
        };
    }
    let end = start + data.len();
    cursor.store(end, Ordering::Relaxed);
    if end >= samples.len() {
        drained.store(true, Ordering::SeqCst);
    }
}

fn select_sample_format(
    device: &cpal::Device,
    channels: u16,
    sample_rate: u32,
) -> Result<cpal::SampleFormat, RecorderError> {
    let ranges = device
        .supported_output_configs()
        .map_err(|e| RecorderError::DeviceEnumeration(e.to_string()))?;

    let mut best: Option<cpal::SampleFormat> = None;
    let mut rejected: Option<cpal::SampleFormat> = None;
    for range in ranges {
        if range.channels() != channels
            || sample_rate < range.min_sample_rate().0
            || sample_rate > range.max_sample_rate().0
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
            "output device does not support {} ch @ {} Hz",
            channels, sample_rate
        ))),
    }
}
