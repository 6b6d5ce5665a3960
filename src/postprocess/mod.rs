//! Post-processing of synthesized speech before it is saved.

mod processor;

pub use processor::{AudioPostProcessor, TARGET_LOUDNESS_DBFS};
