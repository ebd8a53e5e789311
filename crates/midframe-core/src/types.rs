use serde::{Deserialize, Serialize};

/// Axis-aligned face bounding box in frame pixel coordinates.
///
/// Invariant: `x_max > x_min` and `y_max > y_min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl FaceBox {
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Center point of the box.
    pub fn center(&self) -> (f32, f32) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }
}

/// A detected face with optional facial landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    pub bounds: FaceBox,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

/// Dimensions of the active video frame.
///
/// Constant for a session unless the source is reconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDimensions {
    pub width: u32,
    pub height: u32,
}

/// Signed distance of the face center from the frame center, plus the
/// centering verdict. Recomputed every frame, never retained.
#[derive(Debug, Clone, Copy)]
pub struct CenteringResult {
    pub is_centered: bool,
    pub offset_x: f32,
    pub offset_y: f32,
}
