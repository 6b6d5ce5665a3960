//! Voice sample quality report.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::audio::{AudioError, AudioIo, AudioSample, dsp};

/// Samples shorter than this clone poorly.
pub const MIN_DURATION_SECS: f64 = 6.0;
/// Only this much of a sample is used by the engine.
pub const MAX_DURATION_SECS: f64 = 30.0;
/// Peak level above which clipping is likely.
pub const CLIPPING_PEAK: f32 = 0.99;
/// SNR estimate below which the sample is considered noisy.
pub const MIN_SNR_DB: f64 = 10.0;

/// Rate the SNR estimate is measured at, whatever the file's own rate.
pub const SNR_ANALYSIS_RATE: u32 = 22050;

const SNR_FRAME_LEN: usize = 2048;
const SNR_HOP: usize = 512;

/// Coarse duration class of a voice sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationClass {
    Short,
    Optimal,
    Long,
}

impl DurationClass {
    pub fn of(duration_secs: f64) -> Self {
        if duration_secs < MIN_DURATION_SECS {
            DurationClass::Short
        } else if duration_secs > MAX_DURATION_SECS {
            DurationClass::Long
        } else {
            DurationClass::Optimal
        }
    }
}

/// A non-fatal quality warning.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    TooShort { duration_secs: f64 },
    WillTruncate { duration_secs: f64 },
    Clipping { peak: f32 },
    Noisy { snr_db: f64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::TooShort { duration_secs } => write!(
                f,
                "Audio is short ({duration_secs:.1}s). Recommended: 6-30s; shorter samples may clone poorly"
            ),
            Advisory::WillTruncate { duration_secs } => write!(
                f,
                "Audio is long ({duration_secs:.1}s). Will use first 30s"
            ),
            Advisory::Clipping { peak } => {
                write!(f, "Audio may be clipping (peak {peak:.3})")
            }
            Advisory::Noisy { snr_db } => {
                write!(f, "Audio may have too much noise (SNR: {snr_db:.1} dB)")
            }
        }
    }
}

/// Classify a sample from its measurements. Pure function of its inputs.
pub fn classify(duration_secs: f64, peak: f32, snr_db: f64) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    match DurationClass::of(duration_secs) {
        DurationClass::Short => advisories.push(Advisory::TooShort { duration_secs }),
        DurationClass::Long => advisories.push(Advisory::WillTruncate { duration_secs }),
        DurationClass::Optimal => {}
    }

    if peak > CLIPPING_PEAK {
        advisories.push(Advisory::Clipping { peak });
    }

    // NaN compares false, so treat it explicitly as noisy.
    if snr_db.is_nan() || snr_db < MIN_SNR_DB {
        advisories.push(Advisory::Noisy { snr_db });
    }

    advisories
}

/// SNR estimate: loudest frame RMS against the mean frame RMS, in dB.
pub fn estimate_snr_db(samples: &[f32]) -> f64 {
    let frames = dsp::frame_rms(samples, SNR_FRAME_LEN, SNR_HOP);
    if frames.is_empty() {
        return f64::NEG_INFINITY;
    }
    let max = frames.iter().copied().fold(0.0_f32, f32::max) as f64;
    let mean = frames.iter().map(|&v| v as f64).sum::<f64>() / frames.len() as f64;
    dsp::amplitude_to_db(max / (mean + dsp::EPSILON))
}

/// Measurements of a voice sample plus the advisories derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: usize,
    pub file_size_bytes: u64,
    pub peak: f32,
    pub snr_db: f64,
    pub advisories: Vec<Advisory>,
}

impl ValidationReport {
    /// Measure an already decoded sample.
    pub fn from_sample(path: &Path, sample: &AudioSample, file_size_bytes: u64) -> Self {
        let duration_secs = sample.duration_secs();
        let peak = sample.peak();
        let mono = sample.clone().to_mono();
        // Frame sizes are in samples, so measure at a fixed rate.
        let analysis = match mono.clone().resample(SNR_ANALYSIS_RATE) {
            Ok(resampled) => resampled,
            Err(e) => {
                debug!("Measuring SNR at {} Hz: {e}", mono.sample_rate());
                mono
            }
        };
        let snr_db = estimate_snr_db(&analysis.channels()[0]);

        Self {
            path: path.to_path_buf(),
            duration_secs,
            sample_rate: sample.sample_rate(),
            channels: sample.channel_count(),
            file_size_bytes,
            peak,
            snr_db,
            advisories: classify(duration_secs, peak, snr_db),
        }
    }

    pub fn duration_class(&self) -> DurationClass {
        DurationClass::of(self.duration_secs)
    }

    pub fn is_clean(&self) -> bool {
        self.advisories.is_empty()
    }

    /// Emit the advisories through `tracing`.
    pub fn log(&self) {
        if self.is_clean() {
            info!(
                "Voice sample {} looks good ({:.1}s)",
                self.path.display(),
                self.duration_secs
            );
        }
        for advisory in &self.advisories {
            warn!("{}: {advisory}", self.path.display());
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Audio Validation ===")?;
        writeln!(f, "Duration: {:.1} seconds", self.duration_secs)?;
        writeln!(f, "Sample rate: {} Hz", self.sample_rate)?;
        writeln!(f, "Channels: {}", self.channels)?;
        writeln!(f, "File size: {:.1} KB", self.file_size_bytes as f64 / 1024.0)?;

        let has = |pred: fn(&Advisory) -> bool| self.advisories.iter().any(pred);

        if self.duration_class() == DurationClass::Optimal {
            writeln!(f, "✓ Duration is optimal!")?;
        }
        if !has(|a| matches!(a, Advisory::Clipping { .. })) {
            writeln!(f, "✓ Audio levels are good")?;
        }
        if !has(|a| matches!(a, Advisory::Noisy { .. })) {
            writeln!(
                f,
                "✓ Audio quality is good (SNR estimate: {:.1} dB)",
                self.snr_db
            )?;
        }
        for advisory in &self.advisories {
            writeln!(f, "⚠ Warning: {advisory}")?;
        }
        Ok(())
    }
}

/// Checks a voice sample file against the quality thresholds.
#[derive(Debug, Default)]
pub struct AudioValidator;

impl AudioValidator {
    /// Read and measure a sample. Fails only when the file cannot be decoded.
    pub fn validate(&self, path: &Path) -> Result<ValidationReport, AudioError> {
        let sample = AudioIo::load(path)?;
        let size = AudioIo::file_size(path)?;
        Ok(ValidationReport::from_sample(path, &sample, size))
    }
}
