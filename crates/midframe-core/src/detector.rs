//! Face detection seam and a model-free baseline detector.
//!
//! Model-backed detectors (SCRFD, BlazeFace, ...) run behind the
//! [`FaceDetector`] trait; disposal is `Drop`. The brightness baseline
//! exists so the full guidance pipeline can run against synthetic frames
//! without an inference runtime.

use crate::types::{Face, FaceBox};
use thiserror::Error;

// --- Named constants (no magic numbers) ---
const DEFAULT_LUMA_THRESHOLD: u8 = 160;
const MIN_FACE_PIXELS: usize = 64;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("frame length mismatch: expected {expected} bytes, got {actual}")]
    FrameLengthMismatch { expected: usize, actual: usize },
    #[error("inference failed: {0}")]
    InferenceFailed(String),
}

/// A face detector over grayscale frames.
///
/// Implementations return detections sorted by confidence, best first. An
/// empty result means no face in the frame, which is not an error. A
/// faulted detector is dropped by its owner and never asked again.
pub trait FaceDetector: Send {
    fn detect(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Face>, DetectorError>;
}

/// Bounding-box detector for a single bright region on a dark background.
///
/// Scans for pixels above a luma threshold and reports their bounding box,
/// using the fill ratio of that box as confidence. Regions smaller than
/// [`MIN_FACE_PIXELS`] are treated as noise.
pub struct BrightnessDetector {
    threshold: u8,
}

impl BrightnessDetector {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_LUMA_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: u8) -> Self {
        Self { threshold }
    }
}

impl Default for BrightnessDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceDetector for BrightnessDetector {
    fn detect(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Face>, DetectorError> {
        let expected = (width as usize) * (height as usize);
        if frame.len() != expected {
            return Err(DetectorError::FrameLengthMismatch {
                expected,
                actual: frame.len(),
            });
        }

        let w = width as usize;
        let mut min_x = usize::MAX;
        let mut min_y = usize::MAX;
        let mut max_x = 0usize;
        let mut max_y = 0usize;
        let mut count = 0usize;

        for (i, &p) in frame.iter().enumerate() {
            if p >= self.threshold {
                let x = i % w;
                let y = i / w;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
                count += 1;
            }
        }

        if count < MIN_FACE_PIXELS {
            tracing::trace!(count, "bright region below face-size floor");
            return Ok(Vec::new());
        }

        let bounds = FaceBox {
            x_min: min_x as f32,
            y_min: min_y as f32,
            x_max: (max_x + 1) as f32,
            y_max: (max_y + 1) as f32,
        };
        let area = bounds.width() * bounds.height();
        let confidence = (count as f32 / area).min(1.0);

        Ok(vec![Face {
            bounds,
            confidence,
            landmarks: None,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dark frame with a bright w×h block whose top-left corner is at (x, y).
    fn frame_with_block(
        frame_w: usize,
        frame_h: usize,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
    ) -> Vec<u8> {
        let mut data = vec![20u8; frame_w * frame_h];
        for row in y..y + h {
            for col in x..x + w {
                data[row * frame_w + col] = 220;
            }
        }
        data
    }

    #[test]
    fn test_detects_block_bounds() {
        let data = frame_with_block(100, 80, 30, 20, 16, 16);
        let mut det = BrightnessDetector::new();
        let faces = det.detect(&data, 100, 80).unwrap();
        assert_eq!(faces.len(), 1);

        let b = &faces[0].bounds;
        assert_eq!(b.x_min, 30.0);
        assert_eq!(b.y_min, 20.0);
        assert_eq!(b.x_max, 46.0);
        assert_eq!(b.y_max, 36.0);
        // A solid block fills its own bounding box
        assert!((faces[0].confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dark_frame_has_no_faces() {
        let data = vec![20u8; 100 * 80];
        let mut det = BrightnessDetector::new();
        assert!(det.detect(&data, 100, 80).unwrap().is_empty());
    }

    #[test]
    fn test_noise_below_floor_ignored() {
        // A handful of hot pixels is not a face
        let mut data = vec![20u8; 100 * 80];
        for i in 0..10 {
            data[i * 137] = 255;
        }
        let mut det = BrightnessDetector::new();
        assert!(det.detect(&data, 100, 80).unwrap().is_empty());
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let data = vec![20u8; 10];
        let mut det = BrightnessDetector::new();
        let err = det.detect(&data, 100, 80).unwrap_err();
        assert!(matches!(
            err,
            DetectorError::FrameLengthMismatch {
                expected: 8000,
                actual: 10
            }
        ));
    }
}
