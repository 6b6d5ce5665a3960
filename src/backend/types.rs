//! Engine request/response types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::AudioError;

/// Errors that can occur when talking to the synthesis engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Engine error: {0}")]
    EngineError(String),

    #[error("Invalid audio returned: {0}")]
    Audio(#[from] AudioError),
}

/// Health/model information reported once the engine is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineInfo {
    pub status: String,
    pub model: String,
    #[serde(default = "default_device")]
    pub device: String,
}

fn default_device() -> String {
    "cpu".to_string()
}

/// Error body returned by the server on failure.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}

/// Parameters of one synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub reference_audio: PathBuf,
    pub language: String,
    pub speed: f32,
    pub temperature: f32,
}

impl SynthesisRequest {
    /// Create a new request with default speed and temperature.
    pub fn new(text: impl Into<String>, reference_audio: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            reference_audio: reference_audio.into(),
            language: "en".to_string(),
            speed: 1.0,
            temperature: 0.7,
        }
    }

    /// Set the language code.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the speech speed.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Raw engine output: mono samples at the engine's native rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}
