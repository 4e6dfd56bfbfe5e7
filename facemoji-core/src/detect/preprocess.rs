//! Image preparation for YuNet inference.
//!
//! Images are resized to the detector input and laid out as a `[1, 3, H, W]` BGR tensor,
//! the same layout OpenCV's `blobFromImage` produces.

use std::borrow::Cow;

use anyhow::Result;
use facemoji_utils::{
    config::{InputDimensions, ResizeQuality},
    resize_image, rgb_to_bgr_chw,
    telemetry::timing_guard,
};
use image::{DynamicImage, GenericImageView, RgbImage, imageops::FilterType};
use tract_onnx::prelude::Tensor;

use crate::geometry::Extent;

/// Detector input resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSize {
    pub width: u32,
    pub height: u32,
}

impl InputSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The auxiliary coordinate space detections are reported in.
    pub fn extent(&self) -> Extent {
        Extent::from_pixels(self.width, self.height)
    }
}

impl Default for InputSize {
    fn default() -> Self {
        Self::new(640, 640)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreprocessConfig {
    pub input_size: InputSize,
    pub resize_quality: ResizeQuality,
}

impl PreprocessConfig {
    fn resize_filter(&self) -> FilterType {
        match self.resize_quality {
            ResizeQuality::Quality => FilterType::Triangle,
            ResizeQuality::Speed => FilterType::Nearest,
        }
    }
}

impl From<&InputDimensions> for PreprocessConfig {
    fn from(dimensions: &InputDimensions) -> Self {
        Self {
            input_size: InputSize::new(dimensions.width, dimensions.height),
            resize_quality: dimensions.resize_quality,
        }
    }
}

/// Tensor ready for the model, at the configured input size.
#[derive(Debug)]
pub struct PreprocessOutput {
    pub tensor: Tensor,
}

pub fn preprocess_image(image: &DynamicImage, config: &PreprocessConfig) -> Result<PreprocessOutput> {
    let _guard = timing_guard("facemoji_core::preprocess", log::Level::Trace);
    let InputSize {
        width: input_w,
        height: input_h,
    } = config.input_size;
    anyhow::ensure!(
        input_w > 0 && input_h > 0,
        "detector input dimensions must be greater than zero"
    );
    let (orig_w, orig_h) = image.dimensions();
    anyhow::ensure!(
        orig_w > 0 && orig_h > 0,
        "source image dimensions must be greater than zero"
    );

    let rgb: Cow<'_, RgbImage> = if (orig_w, orig_h) == (input_w, input_h) {
        match image.as_rgb8() {
            Some(rgb) => Cow::Borrowed(rgb),
            None => Cow::Owned(image.to_rgb8()),
        }
    } else {
        Cow::Owned(resize_image(image, input_w, input_h, config.resize_filter()))
    };

    let (data, _) = rgb_to_bgr_chw(&rgb).into_raw_vec_and_offset();
    let shape = [1usize, 3, input_h as usize, input_w as usize];
    let tensor = Tensor::from_shape(&shape, &data)
        .map_err(|e| anyhow::anyhow!("failed to build input tensor: {e}"))?;

    Ok(PreprocessOutput { tensor })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    #[test]
    fn produces_nchw_tensor_at_input_size() {
        let mut img = ImageBuffer::<Rgb<u8>, _>::new(6, 4);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 40) as u8, (y * 60) as u8, 255]);
        }
        let config = PreprocessConfig {
            input_size: InputSize::new(3, 2),
            ..Default::default()
        };

        let output =
            preprocess_image(&DynamicImage::ImageRgb8(img), &config).expect("preprocess");
        assert_eq!(output.tensor.shape(), &[1, 3, 2, 3]);
        let data = output.tensor.as_slice::<f32>().expect("f32 data");
        // First plane is blue.
        assert!(data[..6].iter().all(|v| *v == 255.0));
    }

    #[test]
    fn rejects_zero_sized_input() {
        let config = PreprocessConfig {
            input_size: InputSize::new(0, 320),
            ..Default::default()
        };
        let img = DynamicImage::new_rgb8(4, 4);
        assert!(preprocess_image(&img, &config).is_err());
    }

    #[test]
    fn settings_map_into_config() {
        let dims = InputDimensions {
            width: 320,
            height: 240,
            resize_quality: ResizeQuality::Quality,
        };
        let config = PreprocessConfig::from(&dims);
        assert_eq!(config.input_size, InputSize::new(320, 240));
        assert_eq!(config.input_size.extent(), Extent::new(320.0, 240.0));
        assert_eq!(config.resize_filter(), FilterType::Triangle);
    }
}
