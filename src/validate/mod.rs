//! Advisory quality checks for voice samples.
//!
//! Nothing here blocks a pipeline: the report only carries warnings about
//! duration, clipping and background noise.

mod report;

pub use report::{
    Advisory, AudioValidator, CLIPPING_PEAK, DurationClass, MAX_DURATION_SECS, MIN_DURATION_SECS,
    MIN_SNR_DB, SNR_ANALYSIS_RATE, ValidationReport, classify, estimate_snr_db,
};
