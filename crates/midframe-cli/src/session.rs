//! Capture session state machine.
//!
//! Owns the per-session mutable state: phase, the status line, the cached
//! guidance string, the announcement throttle, and the synth. Detection
//! results and user commands both funnel through here; nothing in the
//! session touches ambient globals.

use crate::capture::{selfie_filename, CapturedPhoto};
use midframe_core::{geometry, guidance, Face, FrameDimensions};
use midframe_media::{Frame, FrameError};
use midframe_speech::{AnnouncementThrottle, SpeechSynth};
use serde::Serialize;
use thiserror::Error;

// --- Status and announcement text ---
//
// The status line contains the substring "Centered" exactly when the face
// is centered; the capture precondition keys off that substring. Guidance
// strings never contain it.
pub const STATUS_IDLE: &str = "Not started";
pub const STATUS_NO_FACE: &str = "No face detected";
pub const STATUS_CENTERED: &str = "Centered! Hold still.";
pub const STATUS_CAPTURED: &str = "Photo captured";
pub const STATUS_DETECTOR_FAULT: &str = "Face detection unavailable";

const SPOKEN_CENTERED: &str = "You are centered. Hold still.";
const SPOKEN_CAPTURE_BLOCKED: &str = "Please center your face before taking the photo.";
const SPOKEN_CAPTURED: &str = "Photo captured!";
const SPOKEN_RESET: &str = "Starting over. Center your face.";
const SPOKEN_NO_GUIDANCE: &str = "No face detected yet.";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("face is not centered")]
    NotCentered,
    #[error("no captured photo")]
    NoPhoto,
    #[error("capture failed: {0}")]
    Capture(#[from] FrameError),
}

/// Capture-flow progress. `Centered` is a sub-state flag on
/// `AwaitingCenter`, not a phase of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    AwaitingCenter,
    Captured,
}

/// Snapshot of session state for the `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub phase: Phase,
    pub status: String,
    pub centered: bool,
    pub guidance: Option<String>,
    pub detector_installed: bool,
}

pub struct CaptureSession {
    phase: Phase,
    centered: bool,
    status: String,
    last_guidance: Option<String>,
    photo: Option<CapturedPhoto>,
    throttle: AnnouncementThrottle,
    synth: Box<dyn SpeechSynth>,
    dims: FrameDimensions,
}

impl CaptureSession {
    pub fn new(dims: FrameDimensions, synth: Box<dyn SpeechSynth>) -> Self {
        Self {
            phase: Phase::Idle,
            centered: false,
            status: STATUS_IDLE.to_string(),
            last_guidance: None,
            photo: None,
            throttle: AnnouncementThrottle::new(),
            synth,
            dims,
        }
    }

    /// Start monitoring face position.
    pub fn begin(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::AwaitingCenter;
            self.status = STATUS_NO_FACE.to_string();
        }
    }

    /// Whether the engine should run detection this tick.
    ///
    /// Detection pauses while a captured photo is on display and resumes
    /// on reset.
    pub fn wants_detection(&self) -> bool {
        self.phase == Phase::AwaitingCenter
    }

    /// Feed one frame's detection result into the session.
    ///
    /// Zero faces updates the status line only; speech stays quiet on that
    /// path. With a face present, the centered message interrupts whatever
    /// is being spoken, while guidance interrupts only on the frame where
    /// centering was just lost.
    pub fn on_faces(&mut self, faces: &[Face]) {
        if self.phase != Phase::AwaitingCenter {
            return;
        }

        let Some(face) = faces.first() else {
            self.centered = false;
            self.status = STATUS_NO_FACE.to_string();
            return;
        };

        let result = geometry::evaluate(&face.bounds, self.dims);
        if result.is_centered {
            self.centered = true;
            self.status = STATUS_CENTERED.to_string();
            self.throttle
                .announce(self.synth.as_mut(), SPOKEN_CENTERED, true);
        } else {
            let was_centered = self.centered;
            self.centered = false;
            let message = guidance::compose(
                result.offset_x,
                result.offset_y,
                face.bounds.width(),
                self.dims,
            );
            self.status = message.clone();
            self.throttle
                .announce(self.synth.as_mut(), &message, was_centered);
            self.last_guidance = Some(message);
        }
    }

    /// Take the photo, if the status says the face is centered.
    ///
    /// The preview frame is mirrored; the saved image is flipped back to
    /// natural orientation before encoding.
    pub fn try_capture(&mut self, frame: &Frame) -> Result<&CapturedPhoto, SessionError> {
        if !self.status.contains("Centered") {
            self.throttle
                .announce(self.synth.as_mut(), SPOKEN_CAPTURE_BLOCKED, true);
            return Err(SessionError::NotCentered);
        }

        let natural = frame.mirrored();
        let png = natural.encode_png()?;
        let filename = selfie_filename(chrono::Utc::now());
        tracing::info!(filename = %filename, bytes = png.len(), "photo captured");

        self.photo = Some(CapturedPhoto { filename, png });
        self.phase = Phase::Captured;
        self.centered = false;
        self.status = STATUS_CAPTURED.to_string();
        self.throttle
            .announce(self.synth.as_mut(), SPOKEN_CAPTURED, true);

        self.photo.as_ref().ok_or(SessionError::NoPhoto)
    }

    /// The captured photo, for the save/share path.
    pub fn photo(&self) -> Result<&CapturedPhoto, SessionError> {
        if self.phase != Phase::Captured {
            return Err(SessionError::NoPhoto);
        }
        self.photo.as_ref().ok_or(SessionError::NoPhoto)
    }

    /// Clear the photo and resume monitoring.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Captured {
            return Err(SessionError::NoPhoto);
        }
        self.photo = None;
        self.phase = Phase::AwaitingCenter;
        self.centered = false;
        self.status = STATUS_NO_FACE.to_string();
        self.last_guidance = None;
        self.throttle
            .announce(self.synth.as_mut(), SPOKEN_RESET, true);
        Ok(())
    }

    /// Re-announce the current position on demand.
    pub fn announce_position(&mut self) {
        let message = if self.centered {
            SPOKEN_CENTERED.to_string()
        } else {
            self.last_guidance
                .clone()
                .unwrap_or_else(|| SPOKEN_NO_GUIDANCE.to_string())
        };
        self.throttle
            .announce(self.synth.as_mut(), &message, true);
    }

    /// Record a detector fault. The status line loses its "Centered"
    /// claim immediately so capture stays blocked while degraded.
    pub fn on_detector_fault(&mut self) {
        self.centered = false;
        self.status = STATUS_DETECTOR_FAULT.to_string();
    }

    pub fn report(&self, detector_installed: bool) -> StatusReport {
        StatusReport {
            phase: self.phase,
            status: self.status.clone(),
            centered: self.centered,
            guidance: self.last_guidance.clone(),
            detector_installed,
        }
    }
}
