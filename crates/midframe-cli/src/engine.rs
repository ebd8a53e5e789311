//! Render loop driver.
//!
//! A single cooperative tokio task owns the frame source, the detector,
//! and the session. Each tick pulls one frame, runs detection, and feeds
//! the session; geometry, guidance, and speech for frame N finish before
//! frame N+1 starts, so inference calls never overlap. User commands
//! arrive on a channel and are handled between frames.

use crate::capture::{deliver, Delivery, DeliveryError, ShareSink};
use crate::session::{CaptureSession, SessionError, StatusReport};
use midframe_core::FaceDetector;
use midframe_media::{Frame, FrameSource};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

const REQUEST_QUEUE_DEPTH: usize = 8;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("no frame captured yet")]
    NoFrame,
    #[error("engine task exited")]
    ChannelClosed,
}

/// Commands dispatched from the UI loop into the engine task.
enum EngineRequest {
    Capture {
        reply: oneshot::Sender<Result<String, EngineError>>,
    },
    Save {
        reply: oneshot::Sender<Result<Delivery, EngineError>>,
    },
    Reset {
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    AnnouncePosition {
        reply: oneshot::Sender<()>,
    },
    Status {
        reply: oneshot::Sender<StatusReport>,
    },
    SwitchDetector {
        detector: Box<dyn FaceDetector>,
        reply: oneshot::Sender<()>,
    },
}

/// Clone-safe handle to the engine task.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Take the photo. Returns the filename on success.
    pub async fn capture(&self) -> Result<String, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Capture { reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)?
    }

    /// Share or save the captured photo.
    pub async fn save(&self) -> Result<Delivery, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Save { reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)?
    }

    /// Discard the captured photo and resume monitoring.
    pub async fn reset(&self) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Reset { reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)?
    }

    /// Re-announce the current position.
    pub async fn announce_position(&self) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::AnnouncePosition { reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    /// Snapshot of session state.
    pub async fn status(&self) -> Result<StatusReport, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Status { reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    /// Replace the detector. The previous one is disposed first; the next
    /// scheduled frame runs against the replacement.
    pub async fn switch_detector(
        &self,
        detector: Box<dyn FaceDetector>,
    ) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::SwitchDetector {
                detector,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }
}

/// Spawn the engine task and begin the session.
///
/// `detector` may be `None` when construction failed upstream; frames
/// still flow but no face status updates occur and capture stays blocked,
/// the degraded mode the error design calls for.
pub fn spawn_engine(
    mut source: Box<dyn FrameSource>,
    mut detector: Option<Box<dyn FaceDetector>>,
    mut session: CaptureSession,
    mut share: Box<dyn ShareSink>,
    output_dir: PathBuf,
    tick: Duration,
) -> EngineHandle {
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(REQUEST_QUEUE_DEPTH);

    tokio::spawn(async move {
        let (width, height) = source.dimensions();
        tracing::info!(width, height, tick_ms = tick.as_millis() as u64, "engine started");
        session.begin();

        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut latest: Option<Frame> = None;

        loop {
            tokio::select! {
                biased;

                req = rx.recv() => {
                    let Some(req) = req else { break };
                    handle_request(
                        req,
                        &mut session,
                        &mut detector,
                        share.as_mut(),
                        &output_dir,
                        latest.as_ref(),
                    );
                }

                _ = interval.tick() => {
                    if !session.wants_detection() {
                        continue;
                    }
                    let frame = match source.next_frame() {
                        Ok(frame) => frame,
                        Err(err) => {
                            tracing::warn!(%err, "frame source failed, skipping tick");
                            continue;
                        }
                    };
                    if let Some(active) = detector.as_mut() {
                        match active.detect(&frame.data, frame.width, frame.height) {
                            Ok(faces) => session.on_faces(&faces),
                            Err(err) => {
                                tracing::error!(%err, "detector fault, disposing detector");
                                detector = None;
                                session.on_detector_fault();
                            }
                        }
                    }
                    latest = Some(frame);
                }
            }
        }
        tracing::info!("engine task exiting");
    });

    EngineHandle { tx }
}

fn handle_request(
    req: EngineRequest,
    session: &mut CaptureSession,
    detector: &mut Option<Box<dyn FaceDetector>>,
    share: &mut dyn ShareSink,
    output_dir: &std::path::Path,
    latest: Option<&Frame>,
) {
    match req {
        EngineRequest::Capture { reply } => {
            let result = match latest {
                Some(frame) => session
                    .try_capture(frame)
                    .map(|photo| photo.filename.clone())
                    .map_err(EngineError::from),
                None => Err(EngineError::NoFrame),
            };
            let _ = reply.send(result);
        }
        EngineRequest::Save { reply } => {
            let result = session.photo().map_err(EngineError::from).and_then(|photo| {
                deliver(share, photo, output_dir).map_err(EngineError::from)
            });
            let _ = reply.send(result);
        }
        EngineRequest::Reset { reply } => {
            let _ = reply.send(session.reset().map_err(EngineError::from));
        }
        EngineRequest::AnnouncePosition { reply } => {
            session.announce_position();
            let _ = reply.send(());
        }
        EngineRequest::Status { reply } => {
            let _ = reply.send(session.report(detector.is_some()));
        }
        EngineRequest::SwitchDetector {
            detector: replacement,
            reply,
        } => {
            if detector.take().is_some() {
                tracing::debug!("previous detector disposed");
            }
            *detector = Some(replacement);
            tracing::info!("detector switched");
            let _ = reply.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::NoShare;
    use crate::session::Phase;
    use midframe_core::{BrightnessDetector, DetectorError, Face, FrameDimensions};
    use midframe_media::SyntheticSource;
    use midframe_speech::NullSpeech;

    const TICK: Duration = Duration::from_millis(5);
    const SETTLE: Duration = Duration::from_millis(100);

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(
            &mut self,
            _frame: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<Face>, DetectorError> {
            Err(DetectorError::InferenceFailed("backend lost".to_string()))
        }
    }

    fn session() -> CaptureSession {
        CaptureSession::new(
            FrameDimensions {
                width: 320,
                height: 240,
            },
            Box::new(NullSpeech),
        )
    }

    fn centered_engine(dir: &std::path::Path) -> EngineHandle {
        spawn_engine(
            Box::new(SyntheticSource::fixed(320, 240, 160.0, 120.0)),
            Some(Box::new(BrightnessDetector::new())),
            session(),
            Box::new(NoShare),
            dir.to_path_buf(),
            TICK,
        )
    }

    #[tokio::test]
    async fn test_end_to_end_capture_flow() {
        let dir = tempfile::tempdir().unwrap();
        let handle = centered_engine(dir.path());

        tokio::time::sleep(SETTLE).await;
        let report = handle.status().await.unwrap();
        assert!(report.status.contains("Centered"), "status: {}", report.status);

        let filename = handle.capture().await.unwrap();
        assert!(filename.starts_with("selfie_"));
        assert_eq!(handle.status().await.unwrap().phase, Phase::Captured);

        let delivery = handle.save().await.unwrap();
        let Delivery::Saved(path) = delivery else {
            panic!("expected file fallback");
        };
        assert!(path.exists());

        handle.reset().await.unwrap();
        let report = handle.status().await.unwrap();
        assert_eq!(report.phase, Phase::AwaitingCenter);
        assert!(!report.status.contains("Centered"));
    }

    #[tokio::test]
    async fn test_capture_blocked_off_center() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn_engine(
            Box::new(SyntheticSource::fixed(320, 240, 60.0, 120.0)),
            Some(Box::new(BrightnessDetector::new())),
            session(),
            Box::new(NoShare),
            dir.path().to_path_buf(),
            TICK,
        );

        tokio::time::sleep(SETTLE).await;
        let report = handle.status().await.unwrap();
        assert!(!report.status.contains("Centered"));

        assert!(handle.capture().await.is_err());
        assert_eq!(handle.status().await.unwrap().phase, Phase::AwaitingCenter);
    }

    #[tokio::test]
    async fn test_detector_fault_degrades_then_switch_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn_engine(
            Box::new(SyntheticSource::fixed(320, 240, 160.0, 120.0)),
            Some(Box::new(FailingDetector)),
            session(),
            Box::new(NoShare),
            dir.path().to_path_buf(),
            TICK,
        );

        tokio::time::sleep(SETTLE).await;
        let report = handle.status().await.unwrap();
        assert!(!report.detector_installed);
        assert!(!report.status.contains("Centered"));

        handle
            .switch_detector(Box::new(BrightnessDetector::new()))
            .await
            .unwrap();
        tokio::time::sleep(SETTLE).await;
        let report = handle.status().await.unwrap();
        assert!(report.detector_installed);
        assert!(report.status.contains("Centered"));
    }

    #[tokio::test]
    async fn test_no_detector_runs_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn_engine(
            Box::new(SyntheticSource::fixed(320, 240, 160.0, 120.0)),
            None,
            session(),
            Box::new(NoShare),
            dir.path().to_path_buf(),
            TICK,
        );

        tokio::time::sleep(SETTLE).await;
        let report = handle.status().await.unwrap();
        assert!(!report.detector_installed);
        // Status never progressed past the starting text
        assert_eq!(report.status, crate::session::STATUS_NO_FACE);
        assert!(handle.capture().await.is_err());
    }

    #[tokio::test]
    async fn test_save_before_capture_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let handle = centered_engine(dir.path());
        tokio::time::sleep(SETTLE).await;
        assert!(handle.save().await.is_err());
    }
}
