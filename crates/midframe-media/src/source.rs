//! Frame sources — the camera seam and a synthetic stand-in.
//!
//! Real capture backends implement [`FrameSource`]; disposal is `Drop`.
//! [`SyntheticSource`] scripts a bright disc drifting toward the frame
//! center so the full pipeline can run headless.

use crate::frame::{Frame, FrameError};
use thiserror::Error;

// --- Synthetic scene constants ---
const BACKGROUND_LUMA: u8 = 20;
const FACE_LUMA: u8 = 220;
/// Disc radius as a fraction of the frame height.
const FACE_RADIUS_FRACTION: f32 = 0.12;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source disconnected: {0}")]
    Disconnected(String),
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

/// A producer of grayscale preview frames.
///
/// `next_frame` blocks until the next frame is ready or the source fails.
/// A failed source is dropped by its owner and never asked again.
pub trait FrameSource: Send {
    fn dimensions(&self) -> (u32, u32);
    fn next_frame(&mut self) -> Result<Frame, SourceError>;
}

/// Deterministic frame source drawing a single bright disc.
///
/// In scripted mode the disc follows a decaying spiral that starts off
/// center and converges on the frame center, exercising every guidance
/// direction over a session. The `fixed` constructor pins the disc for
/// tests that need a known face position.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    sequence: u32,
    fixed_center: Option<(f32, f32)>,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            sequence: 0,
            fixed_center: None,
        }
    }

    /// Source whose disc never moves from (cx, cy).
    pub fn fixed(width: u32, height: u32, cx: f32, cy: f32) -> Self {
        Self {
            width,
            height,
            sequence: 0,
            fixed_center: Some((cx, cy)),
        }
    }

    fn disc_center(&self) -> (f32, f32) {
        if let Some(center) = self.fixed_center {
            return center;
        }
        let w = self.width as f32;
        let h = self.height as f32;
        let t = self.sequence as f32 * 0.05;
        let decay = (-t * 0.08).exp();
        let cx = w / 2.0 + 0.35 * w * decay * t.cos();
        let cy = h / 2.0 + 0.30 * h * decay * (1.3 * t).sin();
        (cx, cy)
    }

    fn render(&self) -> Vec<u8> {
        let w = self.width as usize;
        let h = self.height as usize;
        let (cx, cy) = self.disc_center();
        let radius = FACE_RADIUS_FRACTION * self.height as f32;
        let r2 = radius * radius;

        let mut data = vec![BACKGROUND_LUMA; w * h];
        // Only touch rows the disc can reach
        let y0 = ((cy - radius).floor().max(0.0)) as usize;
        let y1 = ((cy + radius).ceil() as usize).min(h);
        let x0 = ((cx - radius).floor().max(0.0)) as usize;
        let x1 = ((cx + radius).ceil() as usize).min(w);
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    data[y * w + x] = FACE_LUMA;
                }
            }
        }
        data
    }
}

impl FrameSource for SyntheticSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn next_frame(&mut self) -> Result<Frame, SourceError> {
        let data = self.render();
        let frame = Frame::from_grayscale(data, self.width, self.height, self.sequence)?;
        self.sequence = self.sequence.wrapping_add(1);
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brightest_center(frame: &Frame) -> (f32, f32) {
        let w = frame.width as usize;
        let mut sum_x = 0.0f32;
        let mut sum_y = 0.0f32;
        let mut count = 0.0f32;
        for (i, &p) in frame.data.iter().enumerate() {
            if p > 128 {
                sum_x += (i % w) as f32;
                sum_y += (i / w) as f32;
                count += 1.0;
            }
        }
        (sum_x / count, sum_y / count)
    }

    #[test]
    fn test_dimensions_match_frames() {
        let mut src = SyntheticSource::new(320, 240);
        assert_eq!(src.dimensions(), (320, 240));
        let frame = src.next_frame().unwrap();
        assert_eq!(frame.width, 320);
        assert_eq!(frame.height, 240);
        assert_eq!(frame.data.len(), 320 * 240);
    }

    #[test]
    fn test_sequence_increments() {
        let mut src = SyntheticSource::new(64, 48);
        assert_eq!(src.next_frame().unwrap().sequence, 0);
        assert_eq!(src.next_frame().unwrap().sequence, 1);
        assert_eq!(src.next_frame().unwrap().sequence, 2);
    }

    #[test]
    fn test_fixed_disc_stays_put() {
        let mut src = SyntheticSource::fixed(320, 240, 80.0, 60.0);
        for _ in 0..3 {
            let frame = src.next_frame().unwrap();
            let (cx, cy) = brightest_center(&frame);
            assert!((cx - 80.0).abs() < 2.0, "cx drifted: {cx}");
            assert!((cy - 60.0).abs() < 2.0, "cy drifted: {cy}");
        }
    }

    #[test]
    fn test_scripted_disc_converges_on_center() {
        let mut src = SyntheticSource::new(320, 240);
        let mut last = (0.0, 0.0);
        for _ in 0..400 {
            let frame = src.next_frame().unwrap();
            last = brightest_center(&frame);
        }
        // After the spiral decays the disc sits at the frame center
        assert!((last.0 - 160.0).abs() < 8.0, "cx: {}", last.0);
        assert!((last.1 - 120.0).abs() < 8.0, "cy: {}", last.1);
    }

    #[test]
    fn test_first_frame_starts_off_center() {
        let mut src = SyntheticSource::new(320, 240);
        let frame = src.next_frame().unwrap();
        let (cx, _) = brightest_center(&frame);
        // Spiral starts at +0.35 * width from center
        assert!(cx > 200.0, "expected off-center start, got cx={cx}");
    }
}
