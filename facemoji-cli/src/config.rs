//! Configuration loading and CLI override logic.

use std::path::PathBuf;

use anyhow::{Context, Result};
use facemoji_utils::{
    config::{AppSettings, default_settings_path},
    normalize_path,
};
use log::{info, warn};

use crate::args::FacemojiArgs;

/// Load application settings from a file or use defaults.
pub fn load_settings(config_path: Option<&PathBuf>) -> Result<AppSettings> {
    if let Some(path) = config_path {
        let resolved = normalize_path(path)?;
        let settings = AppSettings::load_from_path(&resolved)?;
        info!("Loaded settings from {}", resolved.display());
        Ok(settings)
    } else {
        let default_path = default_settings_path();
        if default_path.exists() {
            let settings = AppSettings::load_from_path(&default_path).with_context(|| {
                format!(
                    "failed to load default settings from {}",
                    default_path.display()
                )
            })?;
            info!("Loaded settings from {}", default_path.display());
            Ok(settings)
        } else {
            Ok(AppSettings::default())
        }
    }
}

/// Apply command-line arguments to override loaded or default settings.
pub fn apply_cli_overrides(settings: &mut AppSettings, args: &FacemojiArgs) {
    if args.telemetry {
        settings.telemetry.enabled = true;
    }
    if let Some(ref level) = args.telemetry_level {
        settings.telemetry.level = level.clone();
    }

    if let Some(ref model) = args.model {
        settings.model_path = Some(model.display().to_string());
    }
    if let Some(width) = args.width {
        settings.input.width = width;
    }
    if let Some(height) = args.height {
        settings.input.height = height;
    }
    if let Some(mode) = args.resize_quality {
        settings.input.resize_quality = mode;
    }
    if let Some(score) = args.score_threshold {
        settings.detection.score_threshold = score;
    }
    if let Some(nms) = args.nms_threshold {
        settings.detection.nms_threshold = nms;
    }
    if let Some(top_k) = args.top_k {
        settings.detection.top_k = top_k;
    }

    if let Some(ref glyph) = args.glyph {
        if glyph.trim().is_empty() {
            warn!("Ignoring empty --glyph; keeping '{}'", settings.overlay.default_glyph);
        } else {
            settings.overlay.default_glyph = glyph.trim().to_string();
        }
    }
    if let Some(max) = args.max_images {
        settings.upload.max_images = max;
    }

    if let Some(ref format) = args.format {
        settings.export.format = format.to_ascii_lowercase();
    }
    if let Some(quality) = args.jpeg_quality {
        settings.export.jpeg_quality = quality;
    }
    if let Some(ref compression) = args.png_compression {
        settings.export.png_compression = compression.clone();
    }
    if let Some(ref font) = args.font {
        settings.render.font_path = Some(font.display().to_string());
    }

    settings.sanitize();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flags_override_loaded_settings() {
        let args = FacemojiArgs::parse_from([
            "facemoji",
            "--input",
            "photos",
            "--archive",
            "out.zip",
            "--glyph",
            " 🤖 ",
            "--format",
            "JPEG",
            "--score-threshold",
            "0.5",
            "--max-images",
            "0",
        ]);
        let mut settings = AppSettings::default();
        apply_cli_overrides(&mut settings, &args);

        assert_eq!(settings.overlay.default_glyph, "🤖");
        assert_eq!(settings.export.format, "jpeg");
        assert_eq!(settings.detection.score_threshold, 0.5);
        assert_eq!(settings.upload.max_images, 1);
    }

    #[test]
    fn blank_glyph_keeps_configured_default() {
        let args = FacemojiArgs::parse_from([
            "facemoji", "--input", "a.png", "--output-dir", "out", "--glyph", "  ",
        ]);
        let mut settings = AppSettings::default();
        let before = settings.overlay.default_glyph.clone();
        apply_cli_overrides(&mut settings, &args);
        assert_eq!(settings.overlay.default_glyph, before);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.json");
        assert!(load_settings(Some(&missing)).is_err());
    }
}
