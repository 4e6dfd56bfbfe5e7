//! Encoding helpers for exported images.
//!
//! This module centralizes output-format selection and compression tuning so the CLI, the
//! GUI and the archive writer all produce identical bytes for the same settings.

use crate::config::ExportSettings;

use anyhow::{Context, Result};
use image::{
    DynamicImage, ExtendedColorType, ImageEncoder,
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
        webp::WebPEncoder,
    },
};
use log::warn;
use std::{
    fs,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Canonical image formats supported by the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormatHint {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormatHint {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

impl std::str::FromStr for ImageFormatHint {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            other => Err(format!("unknown image format '{other}'")),
        }
    }
}

/// Simplified PNG compression strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

impl PngCompression {
    /// Parse compression string/level into a compression strategy.
    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "fast" => Self::Fast,
            "best" => Self::Best,
            "default" => Self::Default,
            _ => match normalized.parse::<u8>() {
                Ok(0..=3) => Self::Fast,
                Ok(7..=9) => Self::Best,
                Ok(_) => Self::Default,
                Err(_) => {
                    warn!("Unknown PNG compression '{input}', falling back to default strategy");
                    Self::Default
                }
            },
        }
    }

    fn into_image(self) -> CompressionType {
        match self {
            Self::Fast => CompressionType::Fast,
            Self::Default => CompressionType::Default,
            Self::Best => CompressionType::Best,
        }
    }
}

/// Immutable encoder configuration derived from [`ExportSettings`].
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub format: ImageFormatHint,
    pub jpeg_quality: u8,
    pub png_compression: PngCompression,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::from_export_settings(&ExportSettings::default())
    }
}

impl OutputOptions {
    /// Build `OutputOptions` from persisted export settings.
    pub fn from_export_settings(settings: &ExportSettings) -> Self {
        let format = settings.format.parse().unwrap_or_else(|err| {
            warn!("{err}; exporting as PNG");
            ImageFormatHint::Png
        });
        Self {
            format,
            jpeg_quality: settings.jpeg_quality.clamp(1, 100),
            png_compression: PngCompression::parse(&settings.png_compression),
        }
    }
}

/// Encode `image` into an in-memory buffer using `options`.
pub fn encode_image(image: &DynamicImage, options: &OutputOptions) -> Result<Vec<u8>> {
    match options.format {
        ImageFormatHint::Png => encode_png(image, options.png_compression),
        ImageFormatHint::Jpeg => encode_jpeg(image, options.jpeg_quality),
        ImageFormatHint::Webp => encode_webp(image),
    }
}

fn encode_png(image: &DynamicImage, compression: PngCompression) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    let mut buffer = Vec::new();
    PngEncoder::new_with_quality(&mut buffer, compression.into_image(), FilterType::Adaptive)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
        .context("failed to encode PNG")?;
    Ok(buffer)
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .context("failed to encode JPEG")?;
    Ok(buffer)
}

fn encode_webp(image: &DynamicImage) -> Result<Vec<u8>> {
    let rgba = image.to_rgba8();
    let mut buffer = Vec::new();
    WebPEncoder::new_lossless(&mut buffer)
        .write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )
        .context("failed to encode WebP")?;
    Ok(buffer)
}

/// Write raw bytes to `path`, creating parent directories as needed.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
        && !parent.exists()
    {
        fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))
}
