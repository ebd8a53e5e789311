//! Announcement pacing.
//!
//! A message identical to the last spoken one is suppressed while the
//! repeat window is open; a changed message speaks immediately. Interrupt
//! announcements cut off in-flight speech so time-critical cues (capture,
//! reset) are never queued behind guidance.

use crate::synth::SpeechSynth;
use std::time::{Duration, Instant};

/// Minimum gap between repeats of the same message.
pub const REPEAT_WINDOW: Duration = Duration::from_millis(3000);

struct AnnouncementRecord {
    message: String,
    at: Instant,
}

/// Per-session announcement state.
///
/// Owned by the session that speaks through it, never shared.
#[derive(Default)]
pub struct AnnouncementThrottle {
    last: Option<AnnouncementRecord>,
}

impl AnnouncementThrottle {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Speak `message` unless it repeats the last one inside the window.
    ///
    /// Returns true if the message reached the synth. `interrupt` bypasses
    /// the window and cancels whatever is currently being spoken.
    pub fn announce(
        &mut self,
        synth: &mut dyn SpeechSynth,
        message: &str,
        interrupt: bool,
    ) -> bool {
        self.announce_at(synth, message, interrupt, Instant::now())
    }

    fn announce_at(
        &mut self,
        synth: &mut dyn SpeechSynth,
        message: &str,
        interrupt: bool,
        now: Instant,
    ) -> bool {
        if !synth.is_available() {
            tracing::debug!("speech unavailable, dropping announcement");
            return false;
        }

        if !interrupt {
            if let Some(last) = &self.last {
                if last.message == message && now.duration_since(last.at) < REPEAT_WINDOW {
                    return false;
                }
            }
        }

        if interrupt && synth.is_speaking() {
            synth.cancel();
        }

        if let Err(err) = synth.speak(message) {
            tracing::warn!(%err, "announcement failed");
            return false;
        }

        self.last = Some(AnnouncementRecord {
            message: message.to_string(),
            at: now,
        });
        true
    }
}
