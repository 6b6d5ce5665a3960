//! CLI argument parsing for `voice-clone` and `record-voice`.

mod args;

pub use args::{DEFAULT_RECORD_SECS, RecordArgs, SynthArgs};
pub use crate::synth::Language;

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Parser, ValueEnum};
    use clap::error::ErrorKind;
    use std::path::PathBuf;

    // ===========================================
    // SynthArgs
    // ===========================================

    #[test]
    fn test_synth_text_with_defaults() {
        let args = SynthArgs::try_parse_from(["voice-clone", "Hello world", "--voice", "alex"]).unwrap();

        assert_eq!(args.text.as_deref(), Some("Hello world"));
        assert_eq!(args.voice, "alex");
        assert_eq!(args.language, Language::En);
        assert_eq!(args.config, PathBuf::from("config.yaml"));
        assert!(args.output.is_none());
        assert!(args.temperature.is_none());
        assert!(args.speed.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_synth_all_options() {
        let args = SynthArgs::try_parse_from([
            "voice-clone",
            "-i",
            "script.txt",
            "-v",
            "alex",
            "-l",
            "zh-cn",
            "-o",
            "out.wav",
            "-c",
            "custom.yaml",
            "-t",
            "0.5",
            "-s",
            "1.2",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("script.txt")));
        assert_eq!(args.language, Language::ZhCn);
        assert_eq!(args.output, Some(PathBuf::from("out.wav")));
        assert_eq!(args.config, PathBuf::from("custom.yaml"));
        assert_eq!(args.temperature, Some(0.5));
        assert_eq!(args.speed, Some(1.2));
        assert!(args.verbose);
    }

    #[test]
    fn test_synth_requires_a_source() {
        let err = SynthArgs::try_parse_from(["voice-clone", "--voice", "alex"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_synth_sources_are_exclusive() {
        let err = SynthArgs::try_parse_from(["voice-clone", "Hello", "-b", "texts", "-v", "alex"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_synth_requires_voice() {
        let err = SynthArgs::try_parse_from(["voice-clone", "Hello"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_synth_rejects_unknown_language() {
        let err = SynthArgs::try_parse_from(["voice-clone", "Hello", "-v", "alex", "-l", "xx"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    // ===========================================
    // RecordArgs
    // ===========================================

    #[test]
    fn test_record_defaults() {
        let args = RecordArgs::try_parse_from(["record-voice", "-o", "voices/me.wav"]).unwrap();

        assert_eq!(args.output, PathBuf::from("voices/me.wav"));
        assert_eq!(args.duration, DEFAULT_RECORD_SECS);
        assert!(args.input.is_none());
        assert!(!args.split);
    }

    #[test]
    fn test_record_with_input_and_split() {
        let args = RecordArgs::try_parse_from([
            "record-voice",
            "--input",
            "raw.mp3",
            "--output",
            "voices/me.wav",
            "--duration",
            "20",
            "--split",
        ])
        .unwrap();

        assert_eq!(args.input, Some(PathBuf::from("raw.mp3")));
        assert_eq!(args.duration, 20);
        assert!(args.split);
    }

    #[test]
    fn test_record_requires_output() {
        assert!(RecordArgs::try_parse_from(["record-voice"]).is_err());
    }

    // ===========================================
    // Language
    // ===========================================

    #[test]
    fn test_language_value_names_match_codes() {
        for language in Language::value_variants() {
            let name = language.to_possible_value().unwrap();
            assert_eq!(name.get_name(), language.as_str());
        }
    }
}
