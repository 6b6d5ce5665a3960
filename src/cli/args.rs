//! CLI argument definitions for both binaries.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::synth::Language;

/// Default recording length in seconds.
pub const DEFAULT_RECORD_SECS: u32 = 15;

/// Generate speech in a cloned voice.
#[derive(Parser, Debug)]
#[command(name = "voice-clone")]
#[command(about = "Generate narration in a cloned voice with a multilingual TTS engine")]
#[command(version)]
#[command(group(ArgGroup::new("source").required(true).args(["text", "input", "batch"])))]
pub struct SynthArgs {
    /// Text to convert to speech
    pub text: Option<String>,

    /// Read text from a file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Generate one voiceover per .txt file in this directory
    #[arg(short, long)]
    pub batch: Option<PathBuf>,

    /// Voice name, from config.yaml or voices/<name>.wav
    #[arg(short, long)]
    pub voice: String,

    /// Language of the text
    #[arg(short, long, value_enum, default_value_t = Language::En)]
    pub language: Language,

    /// Output audio file (default: output/output_<N>.wav)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Sampling temperature, overrides the config value
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Speech speed multiplier, overrides the config value
    #[arg(short, long)]
    pub speed: Option<f32>,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,
}

/// Record or import a voice sample for cloning.
#[derive(Parser, Debug)]
#[command(name = "record-voice")]
#[command(about = "Record or preprocess a voice sample for cloning")]
#[command(version)]
pub struct RecordArgs {
    /// Preprocess an existing audio file instead of recording
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output WAV file (e.g. voices/my_voice.wav)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Recording duration in seconds
    #[arg(short, long, default_value_t = DEFAULT_RECORD_SECS)]
    pub duration: u32,

    /// Split long audio into 30-second chunks
    #[arg(long)]
    pub split: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,
}
