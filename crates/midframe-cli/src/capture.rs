//! Capture output and delivery.
//!
//! Timestamped PNG naming, the platform share seam, and the
//! share-or-save-to-disk delivery path. Share failure is never surfaced
//! as an error; the file write is the fallback of record.

use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

const SHARE_TITLE: &str = "Selfie";

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("sharing not supported on this platform")]
    ShareUnsupported,
    #[error("failed to write photo: {0}")]
    Write(#[from] std::io::Error),
}

/// A captured still, encoded and named, awaiting delivery.
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    pub filename: String,
    pub png: Vec<u8>,
}

/// How a photo left the session.
#[derive(Debug)]
pub enum Delivery {
    Shared,
    Saved(PathBuf),
}

/// Platform share capability.
///
/// The default [`NoShare`] sink reports unsupported, which routes every
/// delivery through the file fallback.
pub trait ShareSink: Send {
    fn share(&mut self, title: &str, filename: &str, png: &[u8]) -> Result<(), DeliveryError>;
}

pub struct NoShare;

impl ShareSink for NoShare {
    fn share(&mut self, _title: &str, _filename: &str, _png: &[u8]) -> Result<(), DeliveryError> {
        Err(DeliveryError::ShareUnsupported)
    }
}

/// Filename for a captured selfie.
///
/// ISO 8601 timestamp with ':' and '.' replaced by '-' so the name is
/// safe on every filesystem the photo might land on.
pub fn selfie_filename(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("selfie_{stamp}.png")
}

/// Share the photo, falling back to a direct file write.
///
/// Only the fallback write can fail; share errors are logged and absorbed.
pub fn deliver(
    sink: &mut dyn ShareSink,
    photo: &CapturedPhoto,
    output_dir: &Path,
) -> Result<Delivery, DeliveryError> {
    match sink.share(SHARE_TITLE, &photo.filename, &photo.png) {
        Ok(()) => {
            tracing::info!(filename = %photo.filename, "photo shared");
            return Ok(Delivery::Shared);
        }
        Err(err) => {
            tracing::debug!(%err, "share unavailable, saving to disk");
        }
    }

    let path = output_dir.join(&photo.filename);
    std::fs::write(&path, &photo.png)?;
    tracing::info!(path = %path.display(), "photo saved");
    Ok(Delivery::Saved(path))
}
