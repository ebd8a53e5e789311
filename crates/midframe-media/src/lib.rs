//! midframe-media — frame representation and frame sources.
//!
//! Grayscale preview frames, horizontal mirroring, PNG encoding, and the
//! [`FrameSource`] seam a camera backend plugs into. Ships a synthetic
//! source that scripts a moving face stand-in for rigs without a camera.

pub mod frame;
pub mod source;

pub use frame::{Frame, FrameError};
pub use source::{FrameSource, SourceError, SyntheticSource};
