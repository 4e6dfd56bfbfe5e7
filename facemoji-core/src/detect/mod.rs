//! Face detection behind a small trait so the editor can run against any backend.
//!
//! [`YuNetDetector`] is the bundled implementation: it loads the YuNet ONNX graph with
//! `tract-onnx` and reports boxes in the detector's input resolution (the *auxiliary* space).
//! Callers map those boxes into display space with
//! [`CoordinateMapper::box_from_auxiliary`](crate::mapping::CoordinateMapper::box_from_auxiliary).

pub mod model;
pub mod postprocess;
pub mod preprocess;
mod yunet;

use anyhow::Result;
use image::DynamicImage;

use crate::geometry::{Extent, FaceBox};

pub use model::YuNetModel;
pub use postprocess::{Detection, PostprocessConfig, apply_postprocess};
pub use preprocess::{InputSize, PreprocessConfig, PreprocessOutput, preprocess_image};
pub use yunet::YuNetDetector;

/// Boxes found in one image together with the extent they are expressed in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionOutput {
    pub boxes: Vec<FaceBox>,
    pub space: Extent,
}

/// Anything that can find faces in an image.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<DetectionOutput>;
}
