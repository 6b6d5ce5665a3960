//! Reference sample preprocessing pipeline.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::audio::{AudioError, AudioIo, AudioSample, dsp};
use crate::interrupt::Interrupt;
use crate::validate::ValidationReport;

/// Sample rate the cloning engine works best with.
pub const DEFAULT_TARGET_SAMPLE_RATE: u32 = 22050;
/// Headroom left by the first normalization pass.
pub const NORMALIZE_HEADROOM_DB: f64 = 0.1;
/// Silence threshold below the peak.
pub const TRIM_TOP_DB: f32 = 20.0;
/// Percentile of absolute magnitude used as the noise floor.
pub const NOISE_FLOOR_PERCENTILE: f64 = 10.0;
/// Gain applied to samples under the noise floor.
pub const NOISE_ATTENUATION: f32 = 0.1;
/// Longest chunk produced when splitting long recordings.
pub const CHUNK_SECS: f64 = 30.0;

/// A written reference sample together with its validation report.
#[derive(Debug, Clone)]
pub struct Processed {
    pub path: PathBuf,
    pub sample: AudioSample,
    pub report: ValidationReport,
}

/// Turns raw recordings into clean mono reference samples.
#[derive(Debug, Clone)]
pub struct AudioPreprocessor {
    target_sample_rate: u32,
}

impl AudioPreprocessor {
    /// Create a preprocessor targeting 22050 Hz.
    pub fn new() -> Self {
        Self {
            target_sample_rate: DEFAULT_TARGET_SAMPLE_RATE,
        }
    }

    /// Create a preprocessor with a custom output sample rate.
    pub fn with_sample_rate(target_sample_rate: u32) -> Self {
        Self { target_sample_rate }
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Run every processing step in memory.
    ///
    /// Order: downmix, normalize, resample, trim silence, soft noise gate,
    /// full-scale normalize.
    pub fn transform(&self, sample: AudioSample) -> Result<AudioSample, AudioError> {
        let sample = if sample.channel_count() > 1 {
            info!("Converting to mono...");
            sample.to_mono()
        } else {
            sample
        };

        info!("Normalizing volume...");
        let headroom_peak = dsp::db_to_gain(-NORMALIZE_HEADROOM_DB) as f32;
        let sample = sample.normalize_peak(headroom_peak);

        let sample = if sample.sample_rate() != self.target_sample_rate {
            info!(
                "Resampling {} Hz -> {} Hz...",
                sample.sample_rate(),
                self.target_sample_rate
            );
            sample.resample(self.target_sample_rate)?
        } else {
            sample
        };

        info!("Trimming silence...");
        let sample = sample.trim_silence(TRIM_TOP_DB);

        info!("Reducing noise...");
        let sample = sample.noise_gate(NOISE_FLOOR_PERCENTILE, NOISE_ATTENUATION);

        Ok(sample.normalize_peak(1.0))
    }

    /// Transform a sample, write it to `output` and validate the result.
    pub fn process(&self, sample: AudioSample, output: &Path) -> Result<Processed, AudioError> {
        let processed = self.transform(sample)?;
        AudioIo::write_wav(output, &processed)?;

        let size = AudioIo::file_size(output)?;
        let report = ValidationReport::from_sample(output, &processed, size);

        Ok(Processed {
            path: output.to_path_buf(),
            sample: processed,
            report,
        })
    }

    /// Load `input`, then [`process`](Self::process) it into `output`.
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<Processed, AudioError> {
        info!("Processing audio file: {}", input.display());
        let sample = AudioIo::load(input)?;
        self.process(sample, output)
    }

    /// Split a long recording into 30 second chunks and process each one.
    ///
    /// Chunk `n` (1-based) is written to `<stem>_chunk<n>.wav` next to `output`.
    /// The interrupt is checked between chunks; once it is raised the chunks
    /// written so far are removed and [`AudioError::Interrupted`] is returned.
    pub fn process_chunks(
        &self,
        sample: AudioSample,
        output: &Path,
        interrupt: &Interrupt,
    ) -> Result<Vec<Processed>, AudioError> {
        let chunks = sample.split(CHUNK_SECS);
        if chunks.len() > 1 {
            info!(
                "Audio is {:.1}s - splitting into {} chunks of up to {CHUNK_SECS}s",
                sample.duration_secs(),
                chunks.len()
            );
        }

        let mut processed = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.into_iter().enumerate() {
            if interrupt.is_triggered() {
                remove_outputs(&processed);
                return Err(AudioError::Interrupted);
            }
            processed.push(self.process(chunk, &chunk_path(output, idx + 1))?);
        }

        if interrupt.is_triggered() {
            remove_outputs(&processed);
            return Err(AudioError::Interrupted);
        }
        Ok(processed)
    }
}

impl Default for AudioPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// `voices/me.wav`, 2 -> `voices/me_chunk2.wav`.
pub fn chunk_path(output: &Path, index: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("voice");
    output.with_file_name(format!("{stem}_chunk{index}.wav"))
}

/// Delete files written by an interrupted run.
pub fn remove_outputs(processed: &[Processed]) {
    for item in processed {
        if let Err(e) = std::fs::remove_file(&item.path) {
            warn!("Could not remove {}: {e}", item.path.display());
        }
    }
}
