//! Voice sample preprocessing: mono downmix, normalization, resampling,
//! silence trimming and soft noise gating.

mod pipeline;

pub use pipeline::{
    AudioPreprocessor, CHUNK_SECS, DEFAULT_TARGET_SAMPLE_RATE, NOISE_ATTENUATION,
    NOISE_FLOOR_PERCENTILE, Processed, TRIM_TOP_DB, chunk_path, remove_outputs,
};
