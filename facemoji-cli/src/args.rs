//! Command-line argument definitions for the facemoji CLI.

use clap::{ArgAction, Parser};
use facemoji_utils::config::ResizeQuality;
use std::path::PathBuf;

/// Detect faces, cover them with emoji stickers and export the results.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct FacemojiArgs {
    /// Path to an image file or a directory containing images.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to the YuNet ONNX model (defaults to the settings file value).
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Optional settings JSON. Defaults to `config/facemoji_settings.json` when present, otherwise built-in parameters.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip face detection; images are exported with manual overlays only.
    #[arg(long = "no-detect", action = ArgAction::SetTrue)]
    pub no_detect: bool,

    /// Emoji placed over every detected face.
    #[arg(short, long)]
    pub glyph: Option<String>,

    /// Extra overlay centred at X,Y (natural pixels) on every image. May be repeated.
    #[arg(long = "place", value_name = "X,Y")]
    pub place: Vec<String>,

    /// Directory that receives one edited file per image.
    #[arg(short, long, required_unless_present = "archive")]
    pub output_dir: Option<PathBuf>,

    /// Write every edited image into a single zip archive at this path.
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Output image format: png, jpeg, webp.
    #[arg(long)]
    pub format: Option<String>,

    /// JPEG quality when exporting as JPEG (1-100).
    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// PNG compression strategy: fast, default, best, or numeric level 0-9.
    #[arg(long)]
    pub png_compression: Option<String>,

    /// Font used to rasterize emoji glyphs.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Shared secret, required when the settings configure an access gate.
    #[arg(long)]
    pub secret: Option<String>,

    /// Maximum number of images accepted per run.
    #[arg(long)]
    pub max_images: Option<usize>,

    /// Override input width (pixels).
    #[arg(long)]
    pub width: Option<u32>,

    /// Override input height (pixels).
    #[arg(long)]
    pub height: Option<u32>,

    /// Resize quality mode: `quality` (Triangle) or `speed` (fast Nearest).
    #[arg(long, value_name = "MODE")]
    pub resize_quality: Option<ResizeQuality>,

    /// Override score threshold.
    #[arg(long)]
    pub score_threshold: Option<f32>,

    /// Override NMS threshold.
    #[arg(long)]
    pub nms_threshold: Option<f32>,

    /// Override top_k limit.
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Write the run summary to a JSON file instead of stdout.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Enable telemetry timing logs (defaults to settings file).
    #[arg(long, action = ArgAction::SetTrue)]
    pub telemetry: bool,

    /// Override telemetry logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub telemetry_level: Option<String>,
}
