//! Signal helpers shared by the preprocessing, validation and post-processing stages.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::AudioError;

/// Floor used to keep log10 finite when a reference level is zero.
pub const EPSILON: f64 = 1e-10;

/// Largest absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()))
}

/// Root mean square of the samples, computed in f64.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum / samples.len() as f64).sqrt()
}

/// Converts a linear amplitude to decibels. Zero maps to negative infinity.
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    20.0 * amplitude.log10()
}

/// Converts a decibel change into a linear gain factor.
pub fn db_to_gain(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Per-frame RMS over centered, zero-padded analysis windows.
///
/// Frame `i` is centered on sample `i * hop`, so there are `1 + len / hop`
/// frames. Samples outside the signal count as zeros but still contribute to
/// the window length.
pub fn frame_rms(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f32> {
    if samples.is_empty() || frame_len == 0 || hop == 0 {
        return Vec::new();
    }

    let mut prefix = Vec::with_capacity(samples.len() + 1);
    prefix.push(0.0_f64);
    let mut running = 0.0_f64;
    for &s in samples {
        running += f64::from(s) * f64::from(s);
        prefix.push(running);
    }

    let half = frame_len / 2;
    let frames = 1 + samples.len() / hop;
    (0..frames)
        .map(|i| {
            let center = i * hop;
            let start = center.saturating_sub(half).min(samples.len());
            let end = (center + frame_len - half).min(samples.len());
            let energy = prefix[end] - prefix[start];
            (energy / frame_len as f64).sqrt() as f32
        })
        .collect()
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f32], pct: f64) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f32::total_cmp);

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let weight = (rank - lo as f64) as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * weight
}

/// Attenuates every sample whose magnitude does not exceed `floor`.
pub fn soft_gate(samples: &mut [f32], floor: f32, attenuation: f32) {
    for s in samples.iter_mut() {
        if s.abs() <= floor {
            *s *= attenuation;
        }
    }
}

/// Finds the `[start, end)` range between the first and last level that is
/// less than `top_db` below the maximum level.
///
/// Returns `None` when every level is zero.
pub fn trim_bounds(levels: &[f32], top_db: f32) -> Option<(usize, usize)> {
    let max = peak(levels);
    if max <= 0.0 {
        return None;
    }
    let threshold = (f64::from(max) * db_to_gain(-f64::from(top_db))) as f32;
    let start = levels.iter().position(|l| l.abs() > threshold)?;
    let end = levels.iter().rposition(|l| l.abs() > threshold)? + 1;
    Some((start, end))
}

/// Averages all channels into one.
pub fn downmix(channels: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = channels.first() else {
        return Vec::new();
    };
    let scale = 1.0 / channels.len() as f32;
    let mut mixed = first.clone();
    for channel in &channels[1..] {
        for (acc, value) in mixed.iter_mut().zip(channel) {
            *acc += *value;
        }
    }
    for value in &mut mixed {
        *value *= scale;
    }
    mixed
}

/// Band-limited sinc resampling of planar audio.
pub fn resample(
    channels: Vec<Vec<f32>>,
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<Vec<f32>>, AudioError> {
    if from_rate == to_rate || channels.is_empty() || channels[0].is_empty() {
        return Ok(channels);
    }

    let input_len = channels[0].len();
    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let resample_error = |e: rubato::ResampleError| AudioError::Resample(e.to_string());
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, input_len, channels.len())
        .map_err(|e| AudioError::Resample(e.to_string()))?;

    // The sinc filter delays its output; flush with silence until the delayed
    // tail is out, then drop the delay from the front.
    let delay = resampler.output_delay();
    let expected = (input_len as f64 * ratio).ceil() as usize;
    let mut output = resampler.process(&channels, None).map_err(resample_error)?;
    while output[0].len() < delay + expected {
        let tail = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(resample_error)?;
        if tail[0].is_empty() {
            break;
        }
        for (channel, more) in output.iter_mut().zip(tail) {
            channel.extend(more);
        }
    }

    for channel in &mut output {
        channel.drain(..delay.min(channel.len()));
        channel.resize(expected, 0.0);
    }
    Ok(output)
}
