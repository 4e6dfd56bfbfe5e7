//! Detector loading, image decoding and detection jobs.
//!
//! Everything here runs on rayon workers and reports back over the app's job channel.

use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};

use anyhow::Context as AnyhowContext;
use facemoji_core::{DetectionRequest, FaceDetector, ImageId, YuNetDetector};
use facemoji_utils::{config::AppSettings, load_image};
use log::{error, info};

use crate::JobMessage;

/// Resolve the configured model file, if it exists on disk.
pub fn configured_model_path(settings: &AppSettings) -> Option<PathBuf> {
    settings
        .model_path
        .as_deref()
        .map(PathBuf::from)
        .filter(|path| path.exists())
}

/// Load the YuNet model in the background. Posts `DetectorReady` or `DetectorFailed`.
pub fn spawn_detector_load(settings: AppSettings, job_tx: mpsc::Sender<JobMessage>) {
    rayon::spawn(move || {
        let message = match YuNetDetector::from_settings(&settings) {
            Ok(detector) => {
                info!("YuNet model ready");
                JobMessage::DetectorReady(Arc::new(detector))
            }
            Err(err) => JobMessage::DetectorFailed {
                error: format!("{err:#}"),
            },
        };
        if job_tx.send(message).is_err() {
            error!("GUI dropped detector load result");
        }
    });
}

/// Decode an opened image off the GUI thread.
pub fn spawn_decode(image: ImageId, path: &Path, job_tx: mpsc::Sender<JobMessage>) {
    let path = path.to_path_buf();
    rayon::spawn(move || {
        let result = load_image(&path)
            .with_context(|| format!("could not read {}", path.display()))
            .map(Arc::new)
            .map_err(|err| format!("{err:#}"));
        if job_tx
            .send(JobMessage::ImageDecoded { image, result })
            .is_err()
        {
            error!("GUI dropped decoded image {}", path.display());
        }
    });
}

/// Run `detector` over the request's pixels. The ticket travels with the result so the GUI
/// can drop answers for images that are no longer active.
pub fn start_detection(
    request: DetectionRequest,
    detector: Arc<dyn FaceDetector>,
    job_tx: mpsc::Sender<JobMessage>,
) {
    let ticket = request.ticket;
    info!(
        "Launching detection for {} (generation {})",
        ticket.image, ticket.generation
    );
    rayon::spawn(move || {
        let result = detector.detect(&request.image);
        if job_tx
            .send(JobMessage::DetectionFinished { ticket, result })
            .is_err()
        {
            error!("GUI dropped detection result for {}", ticket.image);
        }
    });
}
