//! Loudness normalization, resampling and export of generated speech.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::audio::{AudioError, AudioIo, AudioSample};
use crate::config::{OutputConfig, OutputFormat};

/// Loudness target for published narration, in dBFS.
pub const TARGET_LOUDNESS_DBFS: f64 = -14.0;

/// Prepares raw engine output for publishing.
#[derive(Debug, Clone)]
pub struct AudioPostProcessor {
    output: OutputConfig,
}

impl AudioPostProcessor {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    pub fn output_config(&self) -> &OutputConfig {
        &self.output
    }

    /// Apply a uniform gain bringing the RMS level to −14 dBFS.
    ///
    /// Silent audio has no measurable level and is returned unchanged.
    pub fn normalize_loudness(sample: AudioSample) -> AudioSample {
        let current = sample.dbfs();
        if !current.is_finite() {
            return sample;
        }
        let change = TARGET_LOUDNESS_DBFS - current;
        debug!("Loudness {current:.1} dBFS, applying {change:+.1} dB");
        sample.apply_gain_db(change)
    }

    /// Normalize (when enabled) and resample to the configured output rate.
    pub fn apply(&self, sample: AudioSample) -> Result<AudioSample, AudioError> {
        let sample = if self.output.normalize {
            Self::normalize_loudness(sample)
        } else {
            sample
        };

        if sample.sample_rate() != self.output.sample_rate {
            debug!(
                "Resampling {} Hz -> {} Hz",
                sample.sample_rate(),
                self.output.sample_rate
            );
            return sample.resample(self.output.sample_rate);
        }
        Ok(sample)
    }

    /// Write in the configured format. MP3 output gets an `.mp3` extension.
    pub fn export(&self, sample: &AudioSample, target: &Path) -> Result<PathBuf, AudioError> {
        match self.output.format {
            OutputFormat::Mp3 => {
                let path = target.with_extension(OutputFormat::Mp3.extension());
                AudioIo::write_mp3(&path, sample)?;
                Ok(path)
            }
            OutputFormat::Wav => {
                AudioIo::write_wav(target, sample)?;
                Ok(target.to_path_buf())
            }
        }
    }

    /// Load the raw file, apply post-processing and export it.
    ///
    /// # Returns
    /// The path actually written, which differs from `target` for MP3 output
    pub fn post_process(&self, raw_path: &Path, target: &Path) -> Result<PathBuf, AudioError> {
        let raw = AudioIo::load(raw_path)?;
        let processed = self.apply(raw)?;
        self.export(&processed, target)
    }
}

impl Default for AudioPostProcessor {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
