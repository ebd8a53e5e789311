//! midframe-core — face-box geometry and directional guidance.
//!
//! Pure centering evaluation over detector output, plus the detection seam
//! itself. Model-backed detectors plug in behind [`FaceDetector`]; the crate
//! ships a brightness-threshold baseline for rigs without a model runtime.

pub mod detector;
pub mod geometry;
pub mod guidance;
pub mod types;

pub use detector::{BrightnessDetector, DetectorError, FaceDetector};
pub use types::{CenteringResult, Face, FaceBox, FrameDimensions};
