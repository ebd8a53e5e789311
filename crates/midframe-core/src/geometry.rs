//! Centering evaluation.
//!
//! Decides whether a detected face sits close enough to the frame center
//! for a usable self-portrait, and by how much it misses on each axis.

use crate::types::{CenteringResult, FaceBox, FrameDimensions};

/// Fraction of each frame dimension within which the face counts as centered.
pub const CENTER_TOLERANCE: f32 = 0.15;

/// Compute the face center's signed offset from the frame center and decide
/// whether the face is centered.
///
/// Each axis is thresholded independently at 15% of its dimension; there is
/// no combined radius. Positive `offset_x` means the face sits right of
/// center in frame coordinates, positive `offset_y` below center.
///
/// Pure and deterministic, safe to call at display refresh rate.
pub fn evaluate(face: &FaceBox, dims: FrameDimensions) -> CenteringResult {
    let (face_cx, face_cy) = face.center();
    let offset_x = face_cx - dims.width as f32 / 2.0;
    let offset_y = face_cy - dims.height as f32 / 2.0;

    let is_centered = offset_x.abs() <= CENTER_TOLERANCE * dims.width as f32
        && offset_y.abs() <= CENTER_TOLERANCE * dims.height as f32;

    CenteringResult {
        is_centered,
        offset_x,
        offset_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: FrameDimensions = FrameDimensions {
        width: 1920,
        height: 1080,
    };

    /// Face box of the given size whose center lands at (cx, cy).
    fn box_at(cx: f32, cy: f32, w: f32, h: f32) -> FaceBox {
        FaceBox {
            x_min: cx - w / 2.0,
            y_min: cy - h / 2.0,
            x_max: cx + w / 2.0,
            y_max: cy + h / 2.0,
        }
    }

    #[test]
    fn test_exact_center_is_centered() {
        let face = box_at(960.0, 540.0, 400.0, 400.0);
        let result = evaluate(&face, DIMS);
        assert!(result.is_centered);
        assert_eq!(result.offset_x, 0.0);
        assert_eq!(result.offset_y, 0.0);
    }

    #[test]
    fn test_offsets_are_signed() {
        // Face left of and above center
        let face = box_at(760.0, 440.0, 200.0, 200.0);
        let result = evaluate(&face, DIMS);
        assert_eq!(result.offset_x, -200.0);
        assert_eq!(result.offset_y, -100.0);
    }

    #[test]
    fn test_boundary_offset_still_centered() {
        // Exactly 15% of each dimension: 288 px horizontal, 162 px vertical
        let face = box_at(960.0 + 288.0, 540.0 + 162.0, 200.0, 200.0);
        let result = evaluate(&face, DIMS);
        assert!(result.is_centered);
    }

    #[test]
    fn test_horizontal_violation_not_centered() {
        let face = box_at(960.0 + 289.0, 540.0, 200.0, 200.0);
        assert!(!evaluate(&face, DIMS).is_centered);
    }

    #[test]
    fn test_vertical_violation_not_centered() {
        let face = box_at(960.0, 540.0 - 163.0, 200.0, 200.0);
        assert!(!evaluate(&face, DIMS).is_centered);
    }

    #[test]
    fn test_axes_thresholded_independently() {
        // Within a combined radius but past the vertical band alone
        let face = box_at(960.0 + 100.0, 540.0 + 170.0, 200.0, 200.0);
        assert!(!evaluate(&face, DIMS).is_centered);
    }
}
