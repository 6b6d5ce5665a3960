//! Microphone capture from the default input device.

use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::audio::{AudioError, AudioSample};
use crate::interrupt::Interrupt;

/// Seconds of countdown before capture starts.
pub const COUNTDOWN_SECS: u32 = 3;

/// Interval at which waits poll the interrupt flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors that can occur while recording.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error(
        "Microphone capture is not available in this build. Rebuild with default features or pass --input <file>"
    )]
    Unavailable,

    #[error("Recording duration must be at least one second")]
    ZeroDuration,

    #[error("Audio device error: {0}")]
    Device(String),

    #[error("Recording cancelled by user")]
    Interrupted,

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Records a voice sample after a short countdown.
#[derive(Debug, Clone)]
pub struct Recorder {
    countdown_secs: u32,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            countdown_secs: COUNTDOWN_SECS,
        }
    }

    pub fn with_countdown(countdown_secs: u32) -> Self {
        Self { countdown_secs }
    }

    pub fn countdown_secs(&self) -> u32 {
        self.countdown_secs
    }

    /// Whether this build can capture from a microphone.
    pub const fn is_available() -> bool {
        cfg!(feature = "microphone")
    }

    /// Record `duration_secs` seconds at the device's native rate and layout.
    ///
    /// Nothing is written to disk; an interrupt discards the capture.
    pub fn record(
        &self,
        duration_secs: u32,
        interrupt: &Interrupt,
    ) -> Result<AudioSample, RecordError> {
        if !Self::is_available() {
            return Err(RecordError::Unavailable);
        }
        if duration_secs == 0 {
            return Err(RecordError::ZeroDuration);
        }

        println!("Recording will start in {} seconds...", self.countdown_secs);
        println!("Speak clearly and naturally!");
        for remaining in (1..=self.countdown_secs).rev() {
            println!("{remaining}...");
            wait(Duration::from_secs(1), interrupt)?;
        }

        capture(duration_secs, interrupt)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Sleep for `total`, returning early with an error if interrupted.
fn wait(total: Duration, interrupt: &Interrupt) -> Result<(), RecordError> {
    let mut waited = Duration::ZERO;
    while waited < total {
        if interrupt.is_triggered() {
            return Err(RecordError::Interrupted);
        }
        thread::sleep(POLL_INTERVAL);
        waited += POLL_INTERVAL;
    }
    Ok(())
}

#[cfg(not(feature = "microphone"))]
fn capture(_duration_secs: u32, _interrupt: &Interrupt) -> Result<AudioSample, RecordError> {
    Err(RecordError::Unavailable)
}

#[cfg(feature = "microphone")]
fn capture(duration_secs: u32, interrupt: &Interrupt) -> Result<AudioSample, RecordError> {
    use std::sync::{Arc, Mutex};

    use cpal::SampleFormat;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use indicatif::{ProgressBar, ProgressStyle};
    use tracing::info;

    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| RecordError::Device("No default input device available".to_string()))?;
    let supported = device.default_input_config().map_err(device_error)?;

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels() as usize;
    info!(
        "Using audio device: {} ({} Hz, {} channels)",
        device.name().unwrap_or_else(|_| "Unknown".to_string()),
        sample_rate,
        channels
    );

    let buffer = Arc::new(Mutex::new(Vec::<f32>::new()));
    let config = supported.config();
    let stream = match supported.sample_format() {
        SampleFormat::F32 => input_stream::<f32>(&device, &config, Arc::clone(&buffer)),
        SampleFormat::I16 => input_stream::<i16>(&device, &config, Arc::clone(&buffer)),
        SampleFormat::U16 => input_stream::<u16>(&device, &config, Arc::clone(&buffer)),
        other => Err(RecordError::Device(format!(
            "Unsupported sample format: {other:?}"
        ))),
    }?;

    stream.play().map_err(device_error)?;
    println!("🔴 RECORDING...");

    let progress = ProgressBar::new(u64::from(duration_secs));
    progress.set_style(
        ProgressStyle::with_template("{bar:40.red} {pos}/{len}s")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    for _ in 0..duration_secs {
        if let Err(e) = wait(Duration::from_secs(1), interrupt) {
            progress.abandon();
            return Err(e);
        }
        progress.inc(1);
    }
    drop(stream);
    progress.finish_and_clear();
    println!("✓ Recording complete!");

    let interleaved = std::mem::take(
        &mut *buffer
            .lock()
            .map_err(|_| RecordError::Device("Capture buffer poisoned".to_string()))?,
    );
    Ok(AudioSample::from_interleaved(&interleaved, channels, sample_rate)?)
}

#[cfg(feature = "microphone")]
fn input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    buffer: std::sync::Arc<std::sync::Mutex<Vec<f32>>>,
) -> Result<cpal::Stream, RecordError>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    use cpal::Sample;
    use cpal::traits::DeviceTrait;

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if let Ok(mut captured) = buffer.lock() {
                    captured.extend(data.iter().map(|&s| s.to_sample::<f32>()));
                }
            },
            |err| tracing::error!("Audio stream error: {err}"),
            None,
        )
        .map_err(device_error)
}

#[cfg(feature = "microphone")]
fn device_error(e: impl std::fmt::Display) -> RecordError {
    RecordError::Device(e.to_string())
}
