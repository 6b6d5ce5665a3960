//! YAML configuration with built-in defaults.
//!
//! A user file only needs the keys it wants to change: sections are merged
//! key by key over the defaults.

mod resolver;

pub use resolver::{
    ConfigResolver, DEFAULT_CONFIG_PATH, GenerationConfig, ModelConfig, OutputConfig,
    OutputFormat, VoiceEntry, merge_defaults,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::VoiceError;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    // ===========================================
    // Defaults and merging
    // ===========================================

    #[test]
    fn test_defaults() {
        let config = GenerationConfig::default();
        assert!(config.voices.is_empty());
        assert_eq!(config.model.temperature, 0.7);
        assert_eq!(config.model.speed, 1.0);
        assert_eq!(config.output.format, OutputFormat::Wav);
        assert_eq!(config.output.sample_rate, 44100);
        assert!(config.output.normalize);
    }

    #[test]
    fn test_partial_nested_override() {
        let config = ConfigResolver::parse("model:\n  temperature: 0.9\n");
        assert_eq!(config.model.temperature, 0.9);
        assert_eq!(config.model.speed, 1.0);
        assert_eq!(config.model.name, ModelConfig::default().name);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_merge_defaults_keeps_caller_keys() {
        let mut loaded: serde_yaml::Mapping =
            serde_yaml::from_str("model:\n  temperature: 0.9\n").unwrap();
        let defaults: serde_yaml::Mapping =
            serde_yaml::from_str("model:\n  temperature: 0.7\n  speed: 1.0\n").unwrap();

        merge_defaults(&mut loaded, &defaults);

        let expected: serde_yaml::Mapping =
            serde_yaml::from_str("model:\n  temperature: 0.9\n  speed: 1.0\n").unwrap();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_merge_defaults_fills_missing_and_null_sections() {
        let mut loaded: serde_yaml::Mapping = serde_yaml::from_str("voices:\n").unwrap();
        let defaults: serde_yaml::Mapping =
            serde_yaml::from_str("voices: {}\noutput:\n  format: wav\n").unwrap();

        merge_defaults(&mut loaded, &defaults);

        assert_eq!(loaded, defaults);
    }

    #[test]
    fn test_output_format_mp3() {
        let config = ConfigResolver::parse("output:\n  format: mp3\n");
        assert_eq!(config.output.format, OutputFormat::Mp3);
        assert_eq!(config.output.sample_rate, 44100);
    }

    #[test]
    fn test_voices_section_parsed() {
        let config = ConfigResolver::parse("voices:\n  narrator:\n    sample_path: samples/n.wav\n");
        assert_eq!(
            config.voices["narrator"].sample_path,
            PathBuf::from("samples/n.wav")
        );
    }

    // ===========================================
    // Fallback to defaults
    // ===========================================

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ConfigResolver::resolve(Path::new("/nonexistent/config.yaml"));
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "").unwrap();

        assert_eq!(ConfigResolver::resolve(&path), GenerationConfig::default());
    }

    #[test]
    fn test_invalid_yaml_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "model: [unclosed\n").unwrap();

        assert_eq!(ConfigResolver::resolve(&path), GenerationConfig::default());
    }

    #[test]
    fn test_non_mapping_root_uses_defaults() {
        assert_eq!(
            ConfigResolver::parse("- just\n- a list\n"),
            GenerationConfig::default()
        );
    }

    #[test]
    fn test_wrong_value_type_uses_defaults() {
        assert_eq!(
            ConfigResolver::parse("model:\n  temperature: hot\n"),
            GenerationConfig::default()
        );
    }

    #[test]
    fn test_resolve_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, "output:\n  normalize: false\n  sample_rate: 22050\n").unwrap();

        let config = ConfigResolver::resolve(&path);
        assert!(!config.output.normalize);
        assert_eq!(config.output.sample_rate, 22050);
        assert_eq!(config.output.format, OutputFormat::Wav);
    }

    // ===========================================
    // Voice resolution
    // ===========================================

    #[test]
    fn test_resolve_voice_by_convention() {
        let temp_dir = TempDir::new().unwrap();
        let voices_dir = temp_dir.path().join("voices");
        std::fs::create_dir_all(&voices_dir).unwrap();
        std::fs::write(voices_dir.join("alex.wav"), b"RIFF").unwrap();

        let resolver =
            ConfigResolver::new(GenerationConfig::default()).with_voices_dir(voices_dir.clone());
        let profile = resolver.resolve_voice("alex").unwrap();

        assert_eq!(profile.sample_path, voices_dir.join("alex.wav"));
    }

    #[test]
    fn test_resolve_voice_not_found() {
        let resolver = ConfigResolver::new(GenerationConfig::default())
            .with_voices_dir(PathBuf::from("voices"));
        let err = resolver.resolve_voice("alex").unwrap_err();

        assert!(matches!(err, VoiceError::NotFound { .. }));
        assert!(err.to_string().contains("voices/"));
    }

    #[test]
    fn test_resolve_voice_prefers_config_entry() {
        let temp_dir = TempDir::new().unwrap();
        let declared = temp_dir.path().join("declared.flac");
        std::fs::write(&declared, b"fLaC").unwrap();
        let voices_dir = temp_dir.path().join("voices");
        std::fs::create_dir_all(&voices_dir).unwrap();
        std::fs::write(voices_dir.join("alex.wav"), b"RIFF").unwrap();

        let mut config = GenerationConfig::default();
        config.voices.insert(
            "alex".to_string(),
            VoiceEntry {
                sample_path: declared.clone(),
            },
        );
        let resolver = ConfigResolver::new(config).with_voices_dir(voices_dir);

        assert_eq!(resolver.resolve_voice("alex").unwrap().sample_path, declared);
    }

    #[test]
    fn test_resolve_voice_config_entry_must_exist() {
        let mut config = GenerationConfig::default();
        config.voices.insert(
            "ghost".to_string(),
            VoiceEntry {
                sample_path: PathBuf::from("/nonexistent/ghost.wav"),
            },
        );
        let resolver = ConfigResolver::new(config);

        assert!(matches!(
            resolver.resolve_voice("ghost").unwrap_err(),
            VoiceError::SampleMissing { .. }
        ));
    }
}
