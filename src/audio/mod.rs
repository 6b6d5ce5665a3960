//! Audio representation, file I/O and the DSP building blocks used by the
//! preprocessing and post-processing pipelines.

pub mod dsp;
mod io;
mod sample;

use std::path::PathBuf;

use thiserror::Error;

pub use io::{AudioIo, MP3_BITRATE_KBPS, SUPPORTED_EXTENSIONS};
pub use sample::{AudioSample, TRIM_FRAME_LEN, TRIM_HOP};

/// Errors that can occur while decoding, transforming or writing audio.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio contains no samples")]
    Empty,

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("Channel length mismatch: expected {expected} frames, got {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(usize),

    #[error("Cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("WAV error in {context}: {source}")]
    Wav {
        context: String,
        #[source]
        source: hound::Error,
    },

    #[error("Cannot decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("MP3 encoding failed: {0}")]
    Encode(String),

    #[error("Operation cancelled by user")]
    Interrupted,
}
