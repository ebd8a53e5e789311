//! midframe-speech — spoken output and announcement pacing.
//!
//! The [`SpeechSynth`] seam a TTS backend plugs into, a subprocess-backed
//! implementation driving `espeak-ng`, and the throttle that keeps repeated
//! guidance from flooding the listener.

pub mod synth;
pub mod throttle;

pub use synth::{NullSpeech, ProcessSpeech, SpeechError, SpeechSynth};
pub use throttle::{AnnouncementThrottle, REPEAT_WINDOW};
