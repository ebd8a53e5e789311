//! Speech synthesis seam and the subprocess backend.

use std::io;
use std::process::{Child, Command, Stdio};
use thiserror::Error;

const DEFAULT_SPEECH_COMMAND: &str = "espeak-ng";

#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("speech backend unavailable")]
    Unavailable,
    #[error("failed to spawn speech process: {0}")]
    Spawn(#[from] io::Error),
}

/// A text-to-speech backend.
///
/// `speak` replaces any utterance still in flight; callers that want the
/// current utterance to finish check `is_speaking` first. Availability can
/// change at runtime, so it is re-checked before every announcement.
pub trait SpeechSynth: Send {
    fn is_available(&self) -> bool;
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;
    fn cancel(&mut self);
    fn is_speaking(&mut self) -> bool;
}

/// Subprocess-backed synth driving an `espeak-ng`-compatible command.
///
/// One child process per utterance, latest wins. Availability is probed
/// once at construction by running `<command> --version`.
pub struct ProcessSpeech {
    command: String,
    child: Option<Child>,
    available: bool,
}

impl ProcessSpeech {
    pub fn new() -> Self {
        Self::with_command(DEFAULT_SPEECH_COMMAND)
    }

    pub fn with_command(command: &str) -> Self {
        let available = Command::new(command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !available {
            tracing::warn!(command, "speech command not available, announcements disabled");
        }
        Self {
            command: command.to_string(),
            child: None,
            available,
        }
    }

    fn reap(&mut self) {
        if let Some(child) = self.child.as_mut() {
            match child.try_wait() {
                Ok(Some(_)) => self.child = None,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(%err, "failed to poll speech process");
                    self.child = None;
                }
            }
        }
    }
}

impl Default for ProcessSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSynth for ProcessSpeech {
    fn is_available(&self) -> bool {
        self.available
    }

    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        if !self.available {
            return Err(SpeechError::Unavailable);
        }
        self.cancel();
        let child = Command::new(&self.command)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        tracing::debug!(pid = child.id(), "speaking");
        self.child = Some(child);
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(err) = child.kill() {
                tracing::debug!(%err, "speech process already exited");
            }
            let _ = child.wait();
        }
    }

    fn is_speaking(&mut self) -> bool {
        self.reap();
        self.child.is_some()
    }
}

impl Drop for ProcessSpeech {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Synth that reports unavailable and swallows everything.
///
/// Stands in when no TTS backend exists on the host; the pipeline keeps
/// running with visual status only.
pub struct NullSpeech;

impl SpeechSynth for NullSpeech {
    fn is_available(&self) -> bool {
        false
    }

    fn speak(&mut self, _text: &str) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn cancel(&mut self) {}

    fn is_speaking(&mut self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_speech_is_never_available() {
        let mut synth = NullSpeech;
        assert!(!synth.is_available());
        assert!(!synth.is_speaking());
        assert!(matches!(
            synth.speak("hello"),
            Err(SpeechError::Unavailable)
        ));
    }

    #[test]
    fn test_missing_command_marks_unavailable() {
        let mut synth = ProcessSpeech::with_command("midframe-no-such-tts-command");
        assert!(!synth.is_available());
        assert!(matches!(
            synth.speak("hello"),
            Err(SpeechError::Unavailable)
        ));
    }

    #[test]
    fn test_cancel_without_child_is_noop() {
        let mut synth = ProcessSpeech::with_command("midframe-no-such-tts-command");
        synth.cancel();
        assert!(!synth.is_speaking());
    }
}
