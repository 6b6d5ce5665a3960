//! In-memory decoded audio.

use super::AudioError;
use super::dsp;

/// Analysis window for silence trimming.
pub const TRIM_FRAME_LEN: usize = 2048;
/// Hop between silence-trimming frames.
pub const TRIM_HOP: usize = 512;

/// Decoded audio: one vector of normalized `f32` samples per channel.
///
/// Always holds at least one channel with at least one frame, every channel
/// has the same length, and the sample rate is non-zero. Transforms consume
/// the sample and return a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSample {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl AudioSample {
    /// Build a sample from planar channel data.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate(sample_rate));
        }

        let frames = channels.first().map(Vec::len).unwrap_or(0);
        if frames == 0 {
            return Err(AudioError::Empty);
        }

        if let Some(bad) = channels.iter().find(|c| c.len() != frames) {
            return Err(AudioError::ChannelMismatch {
                expected: frames,
                actual: bad.len(),
            });
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Build a single-channel sample.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AudioError> {
        Self::new(vec![samples], sample_rate)
    }

    /// Build a sample from interleaved frames. A trailing partial frame is dropped.
    pub fn from_interleaved(
        data: &[f32],
        channel_count: usize,
        sample_rate: u32,
    ) -> Result<Self, AudioError> {
        if channel_count == 0 {
            return Err(AudioError::UnsupportedChannels(channel_count));
        }

        let frames = data.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in data.chunks_exact(channel_count) {
            for (channel, value) in channels.iter_mut().zip(frame) {
                channel.push(*value);
            }
        }

        Self::new(channels, sample_rate)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Largest absolute value across all channels.
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .map(|c| dsp::peak(c))
            .fold(0.0, f32::max)
    }

    /// RMS level relative to full scale, in dB. Silence yields negative infinity.
    pub fn dbfs(&self) -> f64 {
        let total: f64 = self
            .channels
            .iter()
            .map(|c| dsp::rms(c).powi(2) * c.len() as f64)
            .sum();
        let count = (self.frames() * self.channel_count()) as f64;
        dsp::amplitude_to_db((total / count).sqrt())
    }

    /// Average all channels down to one.
    pub fn to_mono(self) -> Self {
        if self.channel_count() == 1 {
            return self;
        }
        Self {
            channels: vec![dsp::downmix(&self.channels)],
            sample_rate: self.sample_rate,
        }
    }

    /// Scale every sample by a gain expressed in dB.
    pub fn apply_gain_db(mut self, db: f64) -> Self {
        let gain = dsp::db_to_gain(db) as f32;
        for channel in &mut self.channels {
            for value in channel.iter_mut() {
                *value *= gain;
            }
        }
        self
    }

    /// Scale so the loudest sample reaches `target`. Silent audio is returned unchanged.
    pub fn normalize_peak(mut self, target: f32) -> Self {
        let peak = self.peak();
        if peak <= 0.0 {
            return self;
        }
        let gain = target / peak;
        for channel in &mut self.channels {
            for value in channel.iter_mut() {
                *value *= gain;
            }
        }
        self
    }

    /// Drop leading and trailing audio quieter than `top_db` below the loudest
    /// analysis frame.
    ///
    /// Levels are RMS over centered 2048-sample frames every 512 samples, taking
    /// the loudest channel per frame. The kept range runs from the first loud
    /// frame's center to one hop past the last loud frame's center, so isolated
    /// clicks in silence do not hold the silence around them. Silent audio is
    /// returned unchanged.
    pub fn trim_silence(self, top_db: f32) -> Self {
        let levels = self
            .channels
            .iter()
            .map(|c| dsp::frame_rms(c, TRIM_FRAME_LEN, TRIM_HOP))
            .reduce(|mut loudest, levels| {
                for (acc, level) in loudest.iter_mut().zip(levels) {
                    *acc = acc.max(level);
                }
                loudest
            })
            .unwrap_or_default();

        let Some((first, past_last)) = dsp::trim_bounds(&levels, top_db) else {
            return self;
        };
        let frames = self.frames();
        let start = (first * TRIM_HOP).min(frames);
        let end = (past_last * TRIM_HOP).min(frames);
        if start >= end || (start == 0 && end == frames) {
            return self;
        }

        Self {
            channels: self
                .channels
                .into_iter()
                .map(|c| c[start..end].to_vec())
                .collect(),
            sample_rate: self.sample_rate,
        }
    }

    /// Soft noise gate: samples at or below the `pct` percentile of absolute
    /// magnitude are multiplied by `attenuation` instead of being zeroed.
    pub fn noise_gate(mut self, pct: f64, attenuation: f32) -> Self {
        for channel in &mut self.channels {
            let magnitudes: Vec<f32> = channel.iter().map(|s| s.abs()).collect();
            let floor = dsp::percentile(&magnitudes, pct);
            dsp::soft_gate(channel, floor, attenuation);
        }
        self
    }

    /// Resample every channel to `to_rate`.
    pub fn resample(self, to_rate: u32) -> Result<Self, AudioError> {
        if to_rate == 0 {
            return Err(AudioError::InvalidSampleRate(to_rate));
        }
        if to_rate == self.sample_rate {
            return Ok(self);
        }
        let channels = dsp::resample(self.channels, self.sample_rate, to_rate)?;
        Self::new(channels, to_rate)
    }

    /// Cut into consecutive pieces of at most `max_secs` seconds.
    pub fn split(&self, max_secs: f64) -> Vec<AudioSample> {
        let chunk_frames = (max_secs * f64::from(self.sample_rate)).round() as usize;
        if chunk_frames == 0 || self.frames() <= chunk_frames {
            return vec![self.clone()];
        }

        (0..self.frames())
            .step_by(chunk_frames)
            .map(|start| {
                let end = (start + chunk_frames).min(self.frames());
                Self {
                    channels: self
                        .channels
                        .iter()
                        .map(|c| c[start..end].to_vec())
                        .collect(),
                    sample_rate: self.sample_rate,
                }
            })
            .collect()
    }
}
