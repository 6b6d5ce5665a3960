//! Voice sample lookup.
//!
//! A voice is a short reference recording named after its file stem and kept
//! in the voices directory (`voices/` by default).

mod manager;

pub use manager::{DEFAULT_VOICES_DIR, VoiceError, VoiceLibrary, VoiceProfile};
