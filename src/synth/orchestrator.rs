//! Single and batch speech generation.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audio::{AudioError, AudioIo, AudioSample};
use crate::backend::{EngineError, EngineInfo, SynthesisEngine, SynthesisRequest};
use crate::config::GenerationConfig;
use crate::interrupt::Interrupt;
use crate::postprocess::AudioPostProcessor;
use crate::synth::Language;
use crate::validate::AudioValidator;
use crate::voice::VoiceProfile;

/// Default directory for generated audio.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Characters of input text quoted in logs and error messages.
const PREVIEW_CHARS: usize = 100;

/// Errors that can occur while generating speech.
#[derive(Error, Debug)]
pub enum SynthError {
    #[error("Text is empty")]
    EmptyText,

    #[error("Voice sample not found: {}", .0.display())]
    VoiceSampleMissing(PathBuf),

    #[error("Directory not found: {}", .0.display())]
    BatchDirMissing(PathBuf),

    #[error("Failed to load synthesis engine: {0}")]
    EngineLoad(#[source] EngineError),

    #[error("Error generating speech for \"{text}\": {source}")]
    Engine {
        text: String,
        #[source]
        source: EngineError,
    },

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled by user")]
    Interrupted,
}

/// One unit of speech to generate.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub text: String,
    pub voice: VoiceProfile,
    pub language: Language,
    pub temperature: Option<f32>,
    pub speed: Option<f32>,
    /// Explicit destination; auto-numbered under the output directory when absent.
    pub output: Option<PathBuf>,
}

impl GenerationRequest {
    pub fn new(text: impl Into<String>, voice: VoiceProfile) -> Self {
        Self {
            text: text.into(),
            voice,
            language: Language::default(),
            temperature: None,
            speed: None,
            output: None,
        }
    }
}

/// A text file that could not be turned into speech.
#[derive(Debug)]
pub struct BatchFailure {
    pub file: PathBuf,
    pub error: SynthError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
    /// Empty text files.
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.outputs.len() + self.failures.len() + self.skipped.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the synthesis engine and post-processing.
///
/// Owns the engine handle; the engine is loaded on first use and reused for
/// every later request.
pub struct SynthesisOrchestrator<E: SynthesisEngine> {
    engine: E,
    engine_info: Option<EngineInfo>,
    config: GenerationConfig,
    post_processor: AudioPostProcessor,
    output_dir: PathBuf,
}

impl<E: SynthesisEngine> SynthesisOrchestrator<E> {
    pub fn new(engine: E, config: GenerationConfig) -> Self {
        let post_processor = AudioPostProcessor::new(config.output.clone());
        Self {
            engine,
            engine_info: None,
            config,
            post_processor,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Use a different directory for auto-numbered and batch outputs.
    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Engine details, once loaded.
    pub fn engine_info(&self) -> Option<&EngineInfo> {
        self.engine_info.as_ref()
    }

    /// Temperature and speed after applying request overrides.
    pub fn effective_parameters(&self, request: &GenerationRequest) -> (f32, f32) {
        (
            request.temperature.unwrap_or(self.config.model.temperature),
            request.speed.unwrap_or(self.config.model.speed),
        )
    }

    fn ensure_loaded(&mut self) -> Result<(), SynthError> {
        if self.engine_info.is_some() {
            return Ok(());
        }
        let engine_info = self.engine.load().map_err(SynthError::EngineLoad)?;
        info!("✓ Model loaded on {}", engine_info.device);
        self.engine_info = Some(engine_info);
        Ok(())
    }

    /// First free `output_<N>.wav` in the output directory.
    ///
    /// `N` starts after the number of existing entries and skips any name
    /// already taken as `.wav` or `.mp3`.
    pub fn next_output_path(&self) -> Result<PathBuf, SynthError> {
        fs::create_dir_all(&self.output_dir)?;
        let mut n = fs::read_dir(&self.output_dir)?.count() + 1;
        loop {
            let candidate = self.output_dir.join(format!("output_{n}.wav"));
            if !candidate.exists() && !candidate.with_extension("mp3").exists() {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Generate speech for one request.
    ///
    /// # Returns
    /// The written file, which carries an `.mp3` extension for MP3 output
    pub fn generate(&mut self, request: &GenerationRequest) -> Result<PathBuf, SynthError> {
        let text = request.text.trim();
        if text.is_empty() {
            return Err(SynthError::EmptyText);
        }

        let sample_path = &request.voice.sample_path;
        if !sample_path.is_file() {
            return Err(SynthError::VoiceSampleMissing(sample_path.clone()));
        }
        match AudioValidator.validate(sample_path) {
            Ok(report) => report.log(),
            Err(e) => warn!("Could not validate voice sample: {e}"),
        }

        let (temperature, speed) = self.effective_parameters(request);
        self.ensure_loaded()?;

        let output = match &request.output {
            Some(path) => path.clone(),
            None => self.next_output_path()?,
        };

        info!("Generating speech...");
        info!("Text: {}", preview(text));
        info!("Voice: {}", request.voice.name);
        info!("Language: {}", request.language);
        debug!("Temperature {temperature}, speed {speed}");

        let synthesis = SynthesisRequest::new(text, sample_path.clone())
            .with_language(request.language.as_str())
            .with_speed(speed)
            .with_temperature(temperature);

        let engine_error = |source| SynthError::Engine {
            text: preview(text),
            source,
        };
        let waveform = self.engine.synthesize(&synthesis).map_err(engine_error)?;
        let raw = AudioSample::mono(waveform.samples, waveform.sample_rate)
            .map_err(|e| engine_error(EngineError::Audio(e)))?;

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        // Removed on drop, whichever way this function returns.
        let transient = tempfile::Builder::new()
            .prefix(".raw-")
            .suffix(".wav")
            .tempfile_in(&dir)?;
        AudioIo::write_wav(transient.path(), &raw)?;

        let written = self.post_processor.post_process(transient.path(), &output)?;
        info!("✓ Audio generated successfully: {}", written.display());
        Ok(written)
    }

    /// Generate one voiceover per `*.txt` file directly inside `dir`.
    ///
    /// Files are processed in name order. A failing file is recorded in the
    /// report and the batch continues; an engine that cannot be loaded or an
    /// interrupt ends the batch.
    pub fn generate_batch(
        &mut self,
        dir: &Path,
        voice: &VoiceProfile,
        language: Language,
        interrupt: &Interrupt,
    ) -> Result<BatchReport, SynthError> {
        if !dir.is_dir() {
            return Err(SynthError::BatchDirMissing(dir.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        files.sort();

        let mut report = BatchReport::default();
        if files.is_empty() {
            warn!("No .txt files found in {}", dir.display());
            return Ok(report);
        }
        info!("Found {} text files to process", files.len());

        let progress = ProgressBar::new(files.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for file in files {
            if interrupt.is_triggered() {
                progress.abandon_with_message("interrupted");
                return Err(SynthError::Interrupted);
            }

            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            progress.set_message(name);

            match self.generate_file(&file, voice, language) {
                Ok(Some(path)) => report.outputs.push(path),
                Ok(None) => {
                    warn!("Skipping empty file: {}", file.display());
                    report.skipped.push(file);
                }
                Err(e @ SynthError::EngineLoad(_)) => {
                    progress.abandon();
                    return Err(e);
                }
                Err(error) => {
                    warn!("Error processing {}: {error}", file.display());
                    report.failures.push(BatchFailure { file, error });
                }
            }
            progress.inc(1);
        }

        // A Ctrl-C during the last file still cancels the batch.
        if interrupt.is_triggered() {
            progress.abandon_with_message("interrupted");
            return Err(SynthError::Interrupted);
        }

        progress.finish_with_message("done");
        info!(
            "Batch complete: {} generated, {} failed, {} skipped",
            report.outputs.len(),
            report.failures.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn generate_file(
        &mut self,
        file: &Path,
        voice: &VoiceProfile,
        language: Language,
    ) -> Result<Option<PathBuf>, SynthError> {
        let text = fs::read_to_string(file)?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let request = GenerationRequest {
            language,
            output: Some(self.output_dir.join(format!("{stem}_voiceover.wav"))),
            ..GenerationRequest::new(text, voice.clone())
        };
        self.generate(&request).map(Some)
    }
}

/// First characters of `text`, with an ellipsis when cut.
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
