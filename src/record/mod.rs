//! Voice sample capture.
//!
//! Microphone support is the default `microphone` cargo feature; building
//! with `--no-default-features` drops the system audio libraries.

mod recorder;

pub use recorder::{COUNTDOWN_SECS, RecordError, Recorder};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupt::Interrupt;

    #[test]
    fn test_recorder_default_countdown() {
        assert_eq!(Recorder::default().countdown_secs(), COUNTDOWN_SECS);
        assert_eq!(Recorder::with_countdown(0).countdown_secs(), 0);
    }

    #[cfg(not(feature = "microphone"))]
    #[test]
    fn test_record_unavailable_without_microphone_feature() {
        assert!(!Recorder::is_available());

        let result = Recorder::with_countdown(0).record(5, &Interrupt::new());
        let err = result.unwrap_err();
        assert!(matches!(err, RecordError::Unavailable));
        assert!(err.to_string().contains("--input"));
    }

    #[cfg(feature = "microphone")]
    #[test]
    fn test_microphone_capture_is_available() {
        assert!(Recorder::is_available());
    }

    #[cfg(feature = "microphone")]
    #[test]
    fn test_record_rejects_zero_duration() {
        let result = Recorder::with_countdown(0).record(0, &Interrupt::new());
        assert!(matches!(result.unwrap_err(), RecordError::ZeroDuration));
    }

    #[cfg(feature = "microphone")]
    #[test]
    fn test_record_interrupted_during_countdown() {
        let interrupt = Interrupt::new();
        interrupt.trigger();

        let result = Recorder::with_countdown(3).record(5, &interrupt);
        assert!(matches!(result.unwrap_err(), RecordError::Interrupted));
    }
}
