//! Directional guidance composition.
//!
//! Turns signed centering offsets and the apparent face size into a single
//! spoken-ready instruction, clauses ordered [horizontal, vertical,
//! distance].

use crate::types::FrameDimensions;

// --- Policy constants (fixed, not user-tunable) ---

/// Per-axis offset band beyond which a directional clause is emitted.
pub const GUIDE_TOLERANCE: f32 = 0.10;
/// Ideal face width as a fraction of the frame width.
pub const IDEAL_FACE_FRACTION: f32 = 0.4;
/// Below this multiple of the ideal width the face is too far away.
pub const TOO_FAR_FACTOR: f32 = 0.7;
/// Above this multiple of the ideal width the face is too close.
pub const TOO_CLOSE_FACTOR: f32 = 1.3;

pub const MOVE_RIGHT: &str = "move right";
pub const MOVE_LEFT: &str = "move left";
pub const MOVE_UP: &str = "move up";
pub const MOVE_DOWN: &str = "move down";
pub const MOVE_CLOSER: &str = "move closer";
pub const MOVE_FARTHER: &str = "move farther";
pub const ALMOST_CENTERED: &str = "almost centered, make small adjustments";

/// Compose a single instruction from centering offsets and face width.
///
/// Clauses are evaluated independently per axis and joined with ". ", in
/// the fixed order horizontal, vertical, distance, terminated with a
/// period. When every clause is empty the generic "almost centered"
/// fallback is returned.
///
/// The preview is horizontally mirrored, so a face left of the frame
/// center reads as the user's right; the horizontal instructions follow
/// the mirror. Do not "fix" the apparent inversion.
pub fn compose(
    offset_x: f32,
    offset_y: f32,
    face_width: f32,
    dims: FrameDimensions,
) -> String {
    let width = dims.width as f32;
    let height = dims.height as f32;

    let mut clauses: Vec<&str> = Vec::with_capacity(3);

    if offset_x < -GUIDE_TOLERANCE * width {
        clauses.push(MOVE_RIGHT);
    } else if offset_x > GUIDE_TOLERANCE * width {
        clauses.push(MOVE_LEFT);
    }

    if offset_y < -GUIDE_TOLERANCE * height {
        clauses.push(MOVE_DOWN);
    } else if offset_y > GUIDE_TOLERANCE * height {
        clauses.push(MOVE_UP);
    }

    let ideal_width = IDEAL_FACE_FRACTION * width;
    if face_width < TOO_FAR_FACTOR * ideal_width {
        clauses.push(MOVE_CLOSER);
    } else if face_width > TOO_CLOSE_FACTOR * ideal_width {
        clauses.push(MOVE_FARTHER);
    }

    if clauses.is_empty() {
        return format!("{ALMOST_CENTERED}.");
    }

    let mut message = clauses.join(". ");
    message.push('.');
    message
}
