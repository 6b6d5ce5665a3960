//! Convention-based voice sample lookup.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::audio::SUPPORTED_EXTENSIONS;

/// Default directory searched for `<name>.<ext>` voice samples.
pub const DEFAULT_VOICES_DIR: &str = "voices";

/// Errors that can occur while resolving a voice.
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error(
        "Voice sample '{name}' not found. Please add it to {}/ or config.yaml",
        .voices_dir.display()
    )]
    NotFound { name: String, voices_dir: PathBuf },

    #[error("Voice sample for '{name}' does not exist: {}", .path.display())]
    SampleMissing { name: String, path: PathBuf },

    #[error("Invalid voice name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A voice name bound to an existing sample file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceProfile {
    pub name: String,
    pub sample_path: PathBuf,
}

/// Looks up voice samples stored as `<voices_dir>/<name>.{wav,mp3,flac}`.
#[derive(Debug, Clone)]
pub struct VoiceLibrary {
    voices_dir: PathBuf,
}

impl VoiceLibrary {
    /// Create a library rooted at `voices/` in the working directory.
    pub fn new() -> Self {
        Self {
            voices_dir: PathBuf::from(DEFAULT_VOICES_DIR),
        }
    }

    /// Create a library with a custom directory.
    pub fn with_dir(voices_dir: PathBuf) -> Self {
        Self { voices_dir }
    }

    /// Get the voices directory path.
    pub fn voices_dir(&self) -> &Path {
        &self.voices_dir
    }

    /// Validate a voice name.
    pub fn validate_name(name: &str) -> Result<(), VoiceError> {
        if name.is_empty() {
            return Err(VoiceError::InvalidName("Name cannot be empty".to_string()));
        }

        // Prevent path traversal
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(VoiceError::InvalidName(
                "Name cannot contain path separators".to_string(),
            ));
        }

        Ok(())
    }

    /// Probe each supported extension in priority order; first existing file wins.
    pub fn find(&self, name: &str) -> Result<VoiceProfile, VoiceError> {
        Self::validate_name(name)?;

        SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| self.voices_dir.join(format!("{name}.{ext}")))
            .find(|path| path.is_file())
            .map(|sample_path| VoiceProfile {
                name: name.to_string(),
                sample_path,
            })
            .ok_or_else(|| VoiceError::NotFound {
                name: name.to_string(),
                voices_dir: self.voices_dir.clone(),
            })
    }

    /// List the voices available in the directory, sorted by name.
    pub fn list(&self) -> Result<Vec<VoiceProfile>, VoiceError> {
        if !self.voices_dir.exists() {
            return Ok(Vec::new());
        }

        let mut voices = Vec::new();

        for entry in std::fs::read_dir(&self.voices_dir)? {
            let path = entry?.path();

            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e));
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            // Only report the sample that `find` would pick for this name.
            if supported
                && !voices.iter().any(|v: &VoiceProfile| v.name == name)
                && let Ok(profile) = self.find(name)
            {
                voices.push(profile);
            }
        }

        voices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(voices)
    }
}

impl Default for VoiceLibrary {
    fn default() -> Self {
        Self::new()
    }
}
