//! Boundary to the voice-cloning synthesis engine.
//!
//! The engine is an external, slow-to-load model. It is reached through the
//! [`SynthesisEngine`] trait so the orchestration can run against a mock in
//! tests; [`HttpEngine`] talks to an XTTS-compatible inference server.

mod client;
mod types;

pub use client::HttpEngine;
pub use types::{EngineError, EngineInfo, SynthesisRequest, Waveform};

/// Trait for voice-cloning synthesis.
#[cfg_attr(test, mockall::automock)]
pub trait SynthesisEngine: Send {
    /// One-time initialization before the first synthesis call.
    fn load(&mut self) -> Result<EngineInfo, EngineError>;

    /// Synthesize `request.text` in the voice of `request.reference_audio`.
    ///
    /// # Returns
    /// Mono samples and their native sample rate
    fn synthesize(&self, request: &SynthesisRequest) -> Result<Waveform, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;

    // ===========================================
    // SynthesisEngine trait with mocks
    // ===========================================

    #[test]
    fn test_mock_engine_load() {
        let mut mock = MockSynthesisEngine::new();

        mock.expect_load().times(1).returning(|| {
            Ok(EngineInfo {
                status: "healthy".to_string(),
                model: "xtts_v2".to_string(),
                device: "cuda".to_string(),
            })
        });

        let info = mock.load().unwrap();
        assert_eq!(info.device, "cuda");
    }

    #[test]
    fn test_mock_engine_synthesize() {
        let mut mock = MockSynthesisEngine::new();

        mock.expect_synthesize()
            .withf(|req| req.text == "Hello world" && req.language == "fr")
            .times(1)
            .returning(|_| {
                Ok(Waveform {
                    samples: vec![0.0; 240],
                    sample_rate: 24000,
                })
            });

        let request = SynthesisRequest::new("Hello world", "voices/me.wav").with_language("fr");
        let waveform = mock.synthesize(&request).unwrap();

        assert_eq!(waveform.sample_rate, 24000);
        assert_eq!(waveform.samples.len(), 240);
    }

    #[test]
    fn test_mock_engine_failure() {
        let mut mock = MockSynthesisEngine::new();

        mock.expect_synthesize()
            .times(1)
            .returning(|_| Err(EngineError::EngineError("CUDA out of memory".to_string())));

        let result = mock.synthesize(&SynthesisRequest::new("Hi", "voices/me.wav"));
        assert!(matches!(result.unwrap_err(), EngineError::EngineError(_)));
    }

    // ===========================================
    // Request and response types
    // ===========================================

    #[test]
    fn test_synthesis_request_builder() {
        let request = SynthesisRequest::new("Hello", "voices/me.wav")
            .with_language("de")
            .with_speed(1.25)
            .with_temperature(0.5);

        assert_eq!(request.text, "Hello");
        assert_eq!(request.language, "de");
        assert_eq!(request.speed, 1.25);
        assert_eq!(request.temperature, 0.5);
    }

    #[test]
    fn test_synthesis_request_defaults() {
        let request = SynthesisRequest::new("Hello", "voices/me.wav");

        assert_eq!(request.language, "en");
        assert_eq!(request.speed, 1.0);
        assert_eq!(request.temperature, 0.7);
    }

    #[test]
    fn test_engine_info_deserialize() {
        let json = r#"{"status": "healthy", "model": "xtts_v2", "device": "cuda:0"}"#;
        let info: EngineInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.device, "cuda:0");
    }

    #[test]
    fn test_engine_info_device_defaults_to_cpu() {
        let json = r#"{"status": "healthy", "model": "xtts_v2"}"#;
        let info: EngineInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.device, "cpu");
    }

    // ===========================================
    // HttpEngine construction
    // ===========================================

    #[test]
    fn test_http_engine_from_config() {
        let engine = HttpEngine::from_config(&ModelConfig::default()).unwrap();
        assert_eq!(engine.base_url(), "http://localhost:8020");
    }

    #[test]
    fn test_http_engine_trims_trailing_slash() {
        let engine = HttpEngine::new("http://gpu-box:9000/", "xtts_v2").unwrap();
        assert_eq!(engine.base_url(), "http://gpu-box:9000");
    }

    #[test]
    fn test_http_engine_missing_reference_audio() {
        let engine = HttpEngine::new("http://127.0.0.1:9", "xtts_v2").unwrap();
        let request = SynthesisRequest::new("Hello", "/nonexistent/voice.wav");

        let result = engine.synthesize(&request);
        assert!(matches!(result.unwrap_err(), EngineError::FileNotFound(_)));
    }
}
