//! voice-clone-rs: voice sample preparation and cloned-voice narration.
//!
//! `record-voice` records or imports a reference sample and cleans it up for
//! cloning. `voice-clone` sends text and the reference sample to a
//! multilingual voice-cloning TTS engine, then normalizes and exports the
//! result as WAV or MP3.

pub mod audio;
pub mod backend;
pub mod cli;
pub mod config;
pub mod interrupt;
pub mod logging;
pub mod postprocess;
pub mod preprocess;
pub mod record;
pub mod synth;
pub mod validate;
pub mod voice;
