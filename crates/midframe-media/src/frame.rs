//! Frame type and image processing — mirroring and PNG encoding.

use std::io::Cursor;

/// A grayscale preview frame.
///
/// Frames arrive mirrored for the preview, matching what the user sees.
/// Capture un-mirrors via [`Frame::mirrored`] before encoding.
#[derive(Clone)]
pub struct Frame {
    /// Grayscale pixel data (width * height bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

impl Frame {
    /// Build a frame from raw grayscale bytes, validating the length.
    pub fn from_grayscale(
        data: Vec<u8>,
        width: u32,
        height: u32,
        sequence: u32,
    ) -> Result<Self, FrameError> {
        let expected = (width * height) as usize;
        if data.len() != expected {
            return Err(FrameError::InvalidLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp: std::time::Instant::now(),
            sequence,
        })
    }

    /// Horizontally flipped copy of this frame.
    ///
    /// Applying it twice returns the original pixels.
    pub fn mirrored(&self) -> Self {
        let w = self.width as usize;
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.data.chunks_exact(w) {
            data.extend(row.iter().rev());
        }
        Self {
            data,
            width: self.width,
            height: self.height,
            timestamp: self.timestamp,
            sequence: self.sequence,
        }
    }

    /// Encode the frame as a grayscale PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, FrameError> {
        let img = image::GrayImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or(FrameError::InvalidLength {
                expected: (self.width * self.height) as usize,
                actual: self.data.len(),
            })?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        tracing::debug!(sequence = self.sequence, bytes = bytes.len(), "frame encoded");
        Ok(bytes)
    }

    /// Average pixel brightness (0.0–255.0).
    pub fn avg_brightness(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&b| b as f32).sum::<f32>() / self.data.len() as f32
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
