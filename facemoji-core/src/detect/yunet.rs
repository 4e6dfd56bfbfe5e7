use std::path::Path;

use anyhow::{Context, Result};
use facemoji_utils::{config::AppSettings, telemetry::timing_guard};
use image::DynamicImage;

use super::{
    DetectionOutput, FaceDetector,
    model::YuNetModel,
    postprocess::{Detection, PostprocessConfig, apply_postprocess},
    preprocess::{PreprocessConfig, preprocess_image},
};

/// YuNet model coupled with its preprocessing and postprocessing settings.
#[derive(Debug)]
pub struct YuNetDetector {
    model: YuNetModel,
    preprocess: PreprocessConfig,
    postprocess: PostprocessConfig,
}

impl YuNetDetector {
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        preprocess: PreprocessConfig,
        postprocess: PostprocessConfig,
    ) -> Result<Self> {
        let model = YuNetModel::load(model_path, preprocess.input_size)?;
        Ok(Self {
            model,
            preprocess,
            postprocess,
        })
    }

    /// Build a detector from persisted settings.
    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        let model_path = settings
            .model_path
            .as_deref()
            .context("no YuNet model path configured")?;
        Self::new(
            model_path,
            PreprocessConfig::from(&settings.input),
            PostprocessConfig::from(&settings.detection),
        )
        .with_context(|| format!("failed to load YuNet model from {model_path}"))
    }

    /// Scored detections in the detector's input space.
    pub fn detections(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let prep = preprocess_image(image, &self.preprocess)?;
        let raw = {
            let _guard = timing_guard("facemoji_core::onnx_inference", log::Level::Debug);
            self.model.run(prep.tensor)?
        };
        let _guard = timing_guard("facemoji_core::postprocess", log::Level::Trace);
        apply_postprocess(&raw, &self.postprocess)
    }
}

impl FaceDetector for YuNetDetector {
    fn detect(&self, image: &DynamicImage) -> Result<DetectionOutput> {
        let _guard = timing_guard("facemoji_core::detect", log::Level::Debug);
        let detections = self.detections(image)?;
        Ok(DetectionOutput {
            boxes: detections.into_iter().map(|d| d.bbox).collect(),
            space: self.model.input_size().extent(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_path_is_reported() {
        let settings = AppSettings {
            model_path: None,
            ..AppSettings::default()
        };
        let err = YuNetDetector::from_settings(&settings).expect_err("no model");
        assert!(format!("{err}").contains("no YuNet model path"));

        let settings = AppSettings {
            model_path: Some("does/not/exist.onnx".into()),
            ..AppSettings::default()
        };
        let err = YuNetDetector::from_settings(&settings).expect_err("missing file");
        assert!(format!("{err:#}").contains("model file not found"));
    }
}
