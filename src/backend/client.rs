//! HTTP client for an XTTS-compatible synthesis server.

use std::time::Duration;

use reqwest::blocking::{Client, Response, multipart};
use tracing::{debug, info};

use crate::audio::AudioIo;
use crate::config::ModelConfig;

use super::SynthesisEngine;
use super::types::{EngineError, EngineInfo, ErrorBody, SynthesisRequest, Waveform};

/// Long texts can take minutes on CPU.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// HTTP-based engine client.
pub struct HttpEngine {
    base_url: String,
    model: String,
    client: Client,
}

impl HttpEngine {
    /// Create a client for the server at `endpoint` serving `model`.
    pub fn new(endpoint: &str, model: &str) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    /// Create a client from the `model` config section.
    pub fn from_config(config: &ModelConfig) -> Result<Self, EngineError> {
        Self::new(&config.endpoint, &config.name)
    }

    /// Get the base URL for this engine.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Turn a non-success status into an error, preferring the server's message.
    fn check(response: Response, what: &str) -> Result<Response, EngineError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.detail)
            .unwrap_or(body);

        if status.is_server_error() {
            Err(EngineError::EngineError(format!("{what}: {status} {detail}")))
        } else {
            Err(EngineError::RequestFailed(format!("{what}: {status} {detail}")))
        }
    }
}

impl SynthesisEngine for HttpEngine {
    fn load(&mut self) -> Result<EngineInfo, EngineError> {
        info!("Loading {}... (This may take a while on first run)", self.model);
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| EngineError::ConnectionFailed(format!("{url}: {e}")))?;

        let info: EngineInfo = Self::check(response, "Health check")?
            .json()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        if info.model != self.model {
            debug!("Server reports model {}, requested {}", info.model, self.model);
        }

        Ok(info)
    }

    fn synthesize(&self, request: &SynthesisRequest) -> Result<Waveform, EngineError> {
        let url = format!("{}/tts", self.base_url);

        let audio_data = std::fs::read(&request.reference_audio)
            .map_err(|_| EngineError::FileNotFound(request.reference_audio.display().to_string()))?;

        let file_name = request
            .reference_audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("speaker.wav")
            .to_string();

        let speaker = multipart::Part::bytes(audio_data).file_name(file_name);

        let form = multipart::Form::new()
            .text("text", request.text.clone())
            .text("language", request.language.clone())
            .text("speed", request.speed.to_string())
            .text("temperature", request.temperature.to_string())
            .text("model", self.model.clone())
            .part("speaker_wav", speaker);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| EngineError::ConnectionFailed(format!("{url}: {e}")))?;

        let bytes = Self::check(response, "Synthesis")?
            .bytes()
            .map_err(|e| EngineError::InvalidResponse(e.to_string()))?;

        let audio = AudioIo::decode_wav_bytes(&bytes, "synthesis response")?.to_mono();
        let sample_rate = audio.sample_rate();
        let samples = audio.into_channels().swap_remove(0);

        Ok(Waveform {
            samples,
            sample_rate,
        })
    }
}
