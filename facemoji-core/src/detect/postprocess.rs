use std::cmp::Ordering;

use anyhow::Result;
use facemoji_utils::config::DetectionSettings;
use tract_onnx::prelude::{Tensor, tract_ndarray::ArrayView2};

use super::model::ROW_WIDTH;
use crate::geometry::FaceBox;

/// Score filtering and NMS parameters applied to raw YuNet rows.
#[derive(Debug, Clone)]
pub struct PostprocessConfig {
    pub score_threshold: f32,
    pub nms_threshold: f32,
    pub top_k: usize,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self::from(&DetectionSettings::default())
    }
}

impl From<&DetectionSettings> for PostprocessConfig {
    fn from(settings: &DetectionSettings) -> Self {
        Self {
            score_threshold: settings.score_threshold,
            nms_threshold: settings.nms_threshold,
            top_k: settings.top_k,
        }
    }
}

/// A face found by the detector, in the detector's input space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: FaceBox,
    pub score: f32,
}

/// Filter raw rows by score, keep the best `top_k`, then suppress overlaps.
///
/// Coordinates stay in the detector's input resolution.
pub fn apply_postprocess(output: &Tensor, config: &PostprocessConfig) -> Result<Vec<Detection>> {
    let rows = detection_rows(output)?;

    let mut detections: Vec<Detection> = rows
        .rows()
        .into_iter()
        .filter_map(|row| {
            let score = row[ROW_WIDTH - 1];
            if !score.is_finite() || score < config.score_threshold {
                return None;
            }
            let bbox = FaceBox::new(row[0], row[1], row[2], row[3]);
            (bbox.width > 0.0 && bbox.height > 0.0).then_some(Detection { bbox, score })
        })
        .collect();

    detections.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    if config.top_k > 0 {
        detections.truncate(config.top_k);
    }
    if config.nms_threshold > 0.0 && detections.len() > 1 {
        detections = non_max_suppression(detections, config.nms_threshold);
    }
    Ok(detections)
}

fn detection_rows(output: &Tensor) -> Result<ArrayView2<'_, f32>> {
    let rows = match output.shape() {
        [rows, ROW_WIDTH] => *rows,
        [1, rows, ROW_WIDTH] => *rows,
        other => anyhow::bail!(
            "YuNet output must have shape [N, {ROW_WIDTH}] or [1, N, {ROW_WIDTH}] (got {other:?})"
        ),
    };
    let slice = output
        .as_slice::<f32>()
        .map_err(|e| anyhow::anyhow!("YuNet output is not f32: {e}"))?;
    ArrayView2::from_shape((rows, ROW_WIDTH), slice)
        .map_err(|_| anyhow::anyhow!("YuNet output data is not contiguous"))
}

/// Greedy NMS over score-sorted detections.
fn non_max_suppression(detections: Vec<Detection>, threshold: f32) -> Vec<Detection> {
    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    for detection in detections {
        if kept
            .iter()
            .all(|existing| detection.bbox.iou(&existing.bbox) <= threshold)
        {
            kept.push(detection);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(x: f32, y: f32, w: f32, h: f32, score: f32) -> [f32; ROW_WIDTH] {
        let mut row = [0.0; ROW_WIDTH];
        row[..4].copy_from_slice(&[x, y, w, h]);
        row[ROW_WIDTH - 1] = score;
        row
    }

    fn tensor_from_rows(rows: &[[f32; ROW_WIDTH]]) -> Tensor {
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Tensor::from_shape(&[rows.len(), ROW_WIDTH], &flat).expect("tensor")
    }

    #[test]
    fn filters_low_scores_and_degenerate_boxes() {
        let tensor = tensor_from_rows(&[
            row(10.0, 20.0, 30.0, 40.0, 0.95),
            row(5.0, 5.0, 10.0, 10.0, 0.2),
            row(50.0, 50.0, 0.0, 10.0, 0.99),
        ]);
        let detections = apply_postprocess(
            &tensor,
            &PostprocessConfig {
                score_threshold: 0.3,
                ..Default::default()
            },
        )
        .expect("postprocess");
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].bbox, FaceBox::new(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn suppresses_overlapping_boxes_keeping_best() {
        let tensor = tensor_from_rows(&[
            row(1.0, 1.0, 10.0, 10.0, 0.95),
            row(0.0, 0.0, 10.0, 10.0, 0.99),
            row(100.0, 100.0, 10.0, 10.0, 0.91),
        ]);
        let detections = apply_postprocess(&tensor, &PostprocessConfig::default())
            .expect("postprocess");
        assert_eq!(detections.len(), 2);
        assert!((detections[0].score - 0.99).abs() < f32::EPSILON);
        assert_eq!(detections[1].bbox.x, 100.0);
    }

    #[test]
    fn accepts_batched_shape_and_rejects_others() {
        let single = row(0.0, 0.0, 1.0, 1.0, 0.95);
        let batched = Tensor::from_shape(&[1, 1, ROW_WIDTH], &single).expect("tensor");
        assert_eq!(
            apply_postprocess(&batched, &PostprocessConfig::default())
                .expect("postprocess")
                .len(),
            1
        );

        let wrong = Tensor::from_shape(&[2, 3], &[0.0f32; 6]).expect("tensor");
        assert!(apply_postprocess(&wrong, &PostprocessConfig::default()).is_err());
    }

    #[test]
    fn top_k_limits_results() {
        let tensor = tensor_from_rows(&[
            row(0.0, 0.0, 10.0, 10.0, 0.95),
            row(50.0, 0.0, 10.0, 10.0, 0.97),
            row(100.0, 0.0, 10.0, 10.0, 0.93),
        ]);
        let detections = apply_postprocess(
            &tensor,
            &PostprocessConfig {
                top_k: 2,
                ..Default::default()
            },
        )
        .expect("postprocess");
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].bbox.x, 50.0);
    }
}
