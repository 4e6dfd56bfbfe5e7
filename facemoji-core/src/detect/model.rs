use std::{fmt::Write, path::Path};

use anyhow::{Context, Result};
use log::{debug, warn};
use tract_onnx::prelude::{
    Framework, Graph, InferenceModelExt, IntoTensor, SimplePlan, Tensor, TypedFact, TypedOp, tvec,
};

use super::preprocess::InputSize;

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

const STRIDES: [usize; 3] = [8, 16, 32];
const HEADS: usize = 4; // cls, obj, bbox, kps
pub(crate) const ROW_WIDTH: usize = 15; // bbox (4) + landmarks (10) + score (1)

/// The YuNet ONNX graph, optimized and ready to run.
#[derive(Debug)]
pub struct YuNetModel {
    runnable: RunnableModel,
    input_size: InputSize,
}

impl YuNetModel {
    /// Load the graph, falling back to a decluttered plan when full optimization fails.
    pub fn load<P: AsRef<Path>>(model_path: P, input_size: InputSize) -> Result<Self> {
        let path = model_path.as_ref();
        anyhow::ensure!(path.exists(), "model file not found: {}", path.display());

        let runnable = match build_plan(path, true) {
            Ok(plan) => {
                debug!(
                    "YuNet model {} optimized ({}x{})",
                    path.display(),
                    input_size.width,
                    input_size.height
                );
                plan
            }
            Err(opt_err) => {
                let mut causes = String::new();
                for cause in opt_err.chain() {
                    let _ = writeln!(&mut causes, "  - {cause}");
                }
                warn!(
                    "YuNet model {} could not be optimized; using decluttered graph.\n{}",
                    path.display(),
                    causes.trim_end()
                );
                build_plan(path, false).with_context(|| {
                    format!("decluttered YuNet graph failed after optimize error: {opt_err}")
                })?
            }
        };

        Ok(Self {
            runnable,
            input_size,
        })
    }

    /// Run the model and return an `[N, 15]` tensor of raw rows in input-resolution space:
    /// `[x, y, w, h, 10 landmark coordinates, score]`.
    pub fn run(&self, input: Tensor) -> Result<Tensor> {
        let outputs = self
            .runnable
            .run(tvec![input.into()])
            .map_err(|e| anyhow::anyhow!("YuNet execution failed: {e}"))?;

        let mut tensors: Vec<Tensor> = outputs
            .into_iter()
            .map(|value| value.into_tensor())
            .collect();

        match tensors.len() {
            1 => tensors
                .pop()
                .ok_or_else(|| anyhow::anyhow!("YuNet model produced no outputs")),
            len if len == STRIDES.len() * HEADS => decode_heads(&tensors, self.input_size),
            other => anyhow::bail!(
                "unexpected number of YuNet outputs: expected 1 or {}, got {other}",
                STRIDES.len() * HEADS
            ),
        }
    }

    pub fn input_size(&self) -> InputSize {
        self.input_size
    }
}

fn build_plan(path: &Path, optimized: bool) -> Result<RunnableModel> {
    let model = tract_onnx::onnx()
        .model_for_path(path)
        .with_context(|| format!("failed to parse ONNX graph from {}", path.display()))?;

    if optimized {
        model
            .into_optimized()
            .map_err(|e| anyhow::anyhow!("unable to optimize YuNet graph: {e}"))?
            .into_runnable()
            .map_err(|e| anyhow::anyhow!("unable to make YuNet graph runnable: {e}"))
    } else {
        model
            .into_typed()
            .map_err(|e| anyhow::anyhow!("unable to type-check YuNet graph: {e}"))?
            .into_decluttered()
            .map_err(|e| anyhow::anyhow!("unable to declutter YuNet graph: {e}"))?
            .into_runnable()
            .map_err(|e| anyhow::anyhow!("unable to make YuNet graph runnable: {e}"))
    }
}

fn head_slice<'a>(outputs: &'a [Tensor], index: usize, name: &str, expected: usize) -> Result<&'a [f32]> {
    let slice = outputs[index]
        .as_slice::<f32>()
        .map_err(|e| anyhow::anyhow!("{name} output not f32: {e}"))?;
    anyhow::ensure!(
        slice.len() == expected,
        "{name} length mismatch: expected {expected}, got {}",
        slice.len()
    );
    Ok(slice)
}

/// Fuse the twelve per-stride heads of the 2023 YuNet export into `[N, 15]` rows.
pub(crate) fn decode_heads(outputs: &[Tensor], input_size: InputSize) -> Result<Tensor> {
    anyhow::ensure!(
        outputs.len() == STRIDES.len() * HEADS,
        "YuNet decode expects {} tensors, got {}",
        STRIDES.len() * HEADS,
        outputs.len()
    );

    let pad_w = (input_size.width as usize).div_ceil(32) * 32;
    let pad_h = (input_size.height as usize).div_ceil(32) * 32;
    let total_cells: usize = STRIDES
        .iter()
        .map(|stride| (pad_w / stride) * (pad_h / stride))
        .sum();
    let mut fused = Vec::with_capacity(total_cells * ROW_WIDTH);

    for (stride_index, &stride) in STRIDES.iter().enumerate() {
        let cols = pad_w / stride;
        let rows = pad_h / stride;
        let cells = rows * cols;
        let stride_f = stride as f32;

        let cls = head_slice(outputs, stride_index, "cls", cells)?;
        let obj = head_slice(outputs, stride_index + STRIDES.len(), "obj", cells)?;
        let bbox = head_slice(outputs, stride_index + STRIDES.len() * 2, "bbox", cells * 4)?;
        let kps = head_slice(outputs, stride_index + STRIDES.len() * 3, "kps", cells * 10)?;

        for row in 0..rows {
            for col in 0..cols {
                let idx = row * cols + col;
                let score = (cls[idx].clamp(0.0, 1.0) * obj[idx].clamp(0.0, 1.0)).sqrt();

                let b = &bbox[idx * 4..idx * 4 + 4];
                let cx = (col as f32 + b[0]) * stride_f;
                let cy = (row as f32 + b[1]) * stride_f;
                let w = b[2].exp() * stride_f;
                let h = b[3].exp() * stride_f;
                fused.extend_from_slice(&[cx - 0.5 * w, cy - 0.5 * h, w, h]);

                let k = &kps[idx * 10..idx * 10 + 10];
                for pair in k.chunks_exact(2) {
                    fused.push((pair[0] + col as f32) * stride_f);
                    fused.push((pair[1] + row as f32) * stride_f);
                }

                fused.push(if score.is_finite() { score } else { 0.0 });
            }
        }
    }

    let rows = fused.len() / ROW_WIDTH;
    Tensor::from_shape(&[rows, ROW_WIDTH], &fused)
        .map_err(|e| anyhow::anyhow!("failed to build fused YuNet tensor: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loading_missing_model_fails() {
        assert!(YuNetModel::load("missing.onnx", InputSize::default()).is_err());
    }

    #[test]
    fn invalid_model_produces_useful_error() {
        let mut temp = NamedTempFile::new().expect("temp file");
        temp.write_all(b"not a real onnx file").expect("write");

        let err = YuNetModel::load(temp.path(), InputSize::default())
            .expect_err("invalid ONNX should fail");
        let message = format!("{err:#}");
        assert!(
            message.contains("failed to parse ONNX") || message.contains("unable to optimize"),
            "unexpected error message: {message}"
        );
    }

    #[test]
    fn decodes_heads_into_rows() {
        let input = InputSize::new(32, 32);
        let mut tensors = Vec::new();
        let cells: Vec<usize> = STRIDES.iter().map(|s| (32 / s) * (32 / s)).collect();
        for &n in &cells {
            tensors.push(Tensor::from_shape(&[n], &vec![1.0f32; n]).expect("cls"));
        }
        for &n in &cells {
            tensors.push(Tensor::from_shape(&[n], &vec![0.25f32; n]).expect("obj"));
        }
        for &n in &cells {
            tensors.push(Tensor::from_shape(&[n, 4], &vec![0.0f32; n * 4]).expect("bbox"));
        }
        for &n in &cells {
            tensors.push(Tensor::from_shape(&[n, 10], &vec![0.0f32; n * 10]).expect("kps"));
        }

        let fused = decode_heads(&tensors, input).expect("decode");
        let total: usize = cells.iter().sum();
        assert_eq!(fused.shape(), &[total, ROW_WIDTH]);

        let data = fused.as_slice::<f32>().expect("f32");
        // First cell of stride 8: centre (0, 0), size exp(0) * 8.
        assert_eq!(&data[..4], &[-4.0, -4.0, 8.0, 8.0]);
        assert!((data[14] - 0.5).abs() < 1e-6);
    }
}
