//! Configuration loading and voice resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::voice::{VoiceError, VoiceLibrary, VoiceProfile};

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Why a configuration file was not used.
#[derive(Error, Debug)]
enum ConfigError {
    #[error("cannot read: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("top level must be a mapping")]
    NotAMapping,
}

/// Output container for generated audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Wav,
    Mp3,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wav => "wav",
            OutputFormat::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A voice declared in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceEntry {
    pub sample_path: PathBuf,
}

/// Synthesis model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub temperature: f32,
    pub speed: f32,
    /// Base URL of the synthesis server.
    pub endpoint: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: "tts_models/multilingual/multi-dataset/xtts_v2".to_string(),
            temperature: 0.7,
            speed: 1.0,
            endpoint: "http://localhost:8020".to_string(),
        }
    }
}

/// Post-processing and export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub sample_rate: u32,
    pub normalize: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Wav,
            sample_rate: 44100,
            normalize: true,
        }
    }
}

/// Fully merged configuration. Every key has a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub voices: BTreeMap<String, VoiceEntry>,
    pub model: ModelConfig,
    pub output: OutputConfig,
}

/// Fill in missing sections and keys of `loaded` from `defaults`.
///
/// An absent or null section is taken from the defaults wholesale. When both
/// sides hold a mapping, only keys missing from `loaded` are copied; keys the
/// caller supplied are never replaced.
pub fn merge_defaults(loaded: &mut Mapping, defaults: &Mapping) {
    for (key, default_value) in defaults {
        match loaded.get_mut(key) {
            None | Some(Value::Null) => {
                loaded.insert(key.clone(), default_value.clone());
            }
            Some(Value::Mapping(section)) => {
                if let Value::Mapping(default_section) = default_value {
                    for (sub_key, sub_value) in default_section {
                        if !section.contains_key(sub_key) {
                            section.insert(sub_key.clone(), sub_value.clone());
                        }
                    }
                }
            }
            Some(_) => {}
        }
    }
}

/// Loads configuration and resolves voice names to sample files.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    config: GenerationConfig,
    library: VoiceLibrary,
}

impl ConfigResolver {
    /// Wrap an already resolved configuration.
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            library: VoiceLibrary::new(),
        }
    }

    /// Load `path` and merge it over the defaults.
    pub fn from_path(path: &Path) -> Self {
        Self::new(Self::resolve(path))
    }

    /// Use a custom voices directory for convention-based lookup.
    pub fn with_voices_dir(mut self, voices_dir: PathBuf) -> Self {
        self.library = VoiceLibrary::with_dir(voices_dir);
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn library(&self) -> &VoiceLibrary {
        &self.library
    }

    pub fn into_config(self) -> GenerationConfig {
        self.config
    }

    /// Load configuration from `path`, never failing.
    ///
    /// A missing, unreadable, empty or malformed file falls back to the
    /// defaults.
    pub fn resolve(path: &Path) -> GenerationConfig {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return GenerationConfig::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Ignoring config {} ({e}); using defaults",
                    path.display()
                );
                GenerationConfig::default()
            }
        }
    }

    /// Parse a YAML document and merge it over the defaults.
    pub fn parse(yaml: &str) -> GenerationConfig {
        match Self::merge_str(yaml) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config ({e}); using defaults");
                GenerationConfig::default()
            }
        }
    }

    fn load(path: &Path) -> Result<GenerationConfig, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::merge_str(&text)
    }

    fn merge_str(yaml: &str) -> Result<GenerationConfig, ConfigError> {
        let mut loaded = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Null => Mapping::new(),
            Value::Mapping(mapping) => mapping,
            _ => return Err(ConfigError::NotAMapping),
        };

        let defaults = match serde_yaml::to_value(GenerationConfig::default())? {
            Value::Mapping(mapping) => mapping,
            _ => return Err(ConfigError::NotAMapping),
        };

        merge_defaults(&mut loaded, &defaults);
        Ok(serde_yaml::from_value(Value::Mapping(loaded))?)
    }

    /// Resolve a voice name to an existing sample file.
    ///
    /// A `voices.<name>.sample_path` entry wins; otherwise the voices
    /// directory is probed for `<name>.wav`, `.mp3` and `.flac` in order.
    pub fn resolve_voice(&self, name: &str) -> Result<VoiceProfile, VoiceError> {
        if let Some(entry) = self.config.voices.get(name) {
            let path = expand_home(&entry.sample_path);
            if !path.exists() {
                return Err(VoiceError::SampleMissing {
                    name: name.to_string(),
                    path,
                });
            }
            return Ok(VoiceProfile {
                name: name.to_string(),
                sample_path: path,
            });
        }

        self.library.find(name)
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
