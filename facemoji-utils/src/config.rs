//! Shared configuration types consumed across the Facemoji workspace.
//!
//! These structures describe detector inference, overlay editing, export encoding and
//! diagnostics in one serializable document that both the CLI and the GUI read.

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// The stock glyph palette offered by the editor.
pub const DEFAULT_PALETTE: [&str; 12] = [
    "😂", "😊", "😉", "🤣", "😁", "😄", "😍", "😚", "😋", "🤩", "😎", "😳",
];

/// Glyph armed when nothing else is configured.
pub const DEFAULT_GLYPH: &str = "😎";

/// Detection post-processing parameters.
///
/// These settings control score filtering and non-maximum suppression (NMS) applied to the
/// raw detector output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Minimum confidence score for a detection to be considered valid.
    pub score_threshold: f32,
    /// Threshold for non-maximum suppression to merge overlapping bounding boxes.
    pub nms_threshold: f32,
    /// The maximum number of detections to return.
    pub top_k: usize,
    /// Re-run detection when returning to an image that was already shown.
    pub redetect_on_revisit: bool,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            score_threshold: 0.9,
            nms_threshold: 0.3,
            top_k: 5_000,
            redetect_on_revisit: true,
        }
    }
}

/// Resize filter preference used when downscaling images for the detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResizeQuality {
    /// Preserve visual quality when resizing (Triangle filter).
    Quality,
    /// Prioritize throughput (Nearest filter).
    #[default]
    Speed,
}

impl fmt::Display for ResizeQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResizeQuality::Quality => "quality",
            ResizeQuality::Speed => "speed",
        })
    }
}

impl FromStr for ResizeQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quality" => Ok(ResizeQuality::Quality),
            "speed" => Ok(ResizeQuality::Speed),
            other => Err(format!(
                "invalid resize quality '{other}'; expected 'quality' or 'speed'"
            )),
        }
    }
}

/// Detector input resolution in pixels (width x height).
///
/// Images are resized to these dimensions before inference, which defines the auxiliary
/// coordinate space detections are reported in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputDimensions {
    pub width: u32,
    pub height: u32,
    pub resize_quality: ResizeQuality,
}

impl Default for InputDimensions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
            resize_quality: ResizeQuality::Speed,
        }
    }
}

/// Overlay editing defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlaySettings {
    /// Smallest glyph size (pixels) an overlay may shrink to.
    pub min_size: f32,
    /// Size used for manually added overlays.
    pub default_size: f32,
    /// Step applied by the grow/shrink controls.
    pub resize_step: f32,
    /// Glyph armed at startup.
    pub default_glyph: String,
    /// Glyphs offered in the picker.
    pub palette: Vec<String>,
    /// Maximum number of undo snapshots kept per image.
    pub history_depth: usize,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            min_size: 16.0,
            default_size: 64.0,
            resize_step: 8.0,
            default_glyph: DEFAULT_GLYPH.to_string(),
            palette: DEFAULT_PALETTE.iter().map(|g| g.to_string()).collect(),
            history_depth: 50,
        }
    }
}

impl OverlaySettings {
    /// Clamp values to sensible ranges.
    pub fn sanitize(&mut self) {
        if !self.min_size.is_finite() || self.min_size < 1.0 {
            self.min_size = 1.0;
        }
        if !self.default_size.is_finite() || self.default_size < self.min_size {
            self.default_size = self.min_size;
        }
        if !self.resize_step.is_finite() || self.resize_step <= 0.0 {
            self.resize_step = 1.0;
        }
        self.palette.retain(|glyph| !glyph.trim().is_empty());
        if self.palette.is_empty() {
            self.palette = DEFAULT_PALETTE.iter().map(|g| g.to_string()).collect();
        }
        if self.default_glyph.trim().is_empty() {
            self.default_glyph = DEFAULT_GLYPH.to_string();
        }
    }
}

/// Limits applied when opening images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Maximum number of images held by one session.
    pub max_images: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self { max_images: 10 }
    }
}

/// Encoding preferences for exported images.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportSettings {
    /// Output format: "png", "jpeg", or "webp".
    pub format: String,
    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
    /// PNG compression strategy ("fast", "default", "best") or numeric level (0-9).
    pub png_compression: String,
    /// File name used for batch archives.
    pub archive_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            jpeg_quality: 90,
            png_compression: "default".to_string(),
            archive_name: "facemoji-images.zip".to_string(),
        }
    }
}

/// Glyph rasterization preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    /// Outline font with emoji coverage used when painting exported overlays.
    pub font_path: Option<String>,
    /// RGBA fill for glyphs drawn with a monochrome font.
    pub glyph_color: [u8; 4],
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            font_path: Some("assets/NotoEmoji-Regular.ttf".into()),
            glyph_color: [255, 200, 40, 255],
        }
    }
}

/// Optional shared-secret gate in front of the editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct AccessSettings {
    /// Shared secret; `None` leaves the editor open.
    pub secret: Option<String>,
    /// Minutes an unlocked session stays valid. `None` keeps it valid for the process lifetime.
    pub ttl_minutes: Option<u64>,
}

/// Settings controlling optional runtime telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// Whether telemetry timing logs are enabled.
    pub enabled: bool,
    /// Logging level for telemetry output (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
        }
    }
}

impl TelemetrySettings {
    /// Resolve the configured level string into a `LevelFilter`.
    pub fn level_filter(&self) -> LevelFilter {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "off" => LevelFilter::Off,
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "trace" => LevelFilter::Trace,
            _ => LevelFilter::Debug,
        }
    }
}

/// Persistent application settings consumed by the CLI and GUI front ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Path to the YuNet ONNX model.
    pub model_path: Option<String>,
    /// The input dimensions for model inference.
    pub input: InputDimensions,
    /// The parameters for detection post-processing.
    pub detection: DetectionSettings,
    /// Overlay editing defaults.
    pub overlay: OverlaySettings,
    /// Image selection limits.
    pub upload: UploadSettings,
    /// Export encoding preferences.
    pub export: ExportSettings,
    /// Glyph rasterization preferences.
    pub render: RenderSettings,
    /// Optional access gate.
    pub access: AccessSettings,
    /// Telemetry and diagnostics preferences.
    pub telemetry: TelemetrySettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            model_path: Some(DEFAULT_MODEL_PATH.into()),
            input: InputDimensions::default(),
            detection: DetectionSettings::default(),
            overlay: OverlaySettings::default(),
            upload: UploadSettings::default(),
            export: ExportSettings::default(),
            render: RenderSettings::default(),
            access: AccessSettings::default(),
            telemetry: TelemetrySettings::default(),
        }
    }
}

const DEFAULT_MODEL_PATH: &str = "models/face_detection_yunet_2023mar_640.onnx";

impl AppSettings {
    /// Load settings from a JSON file.
    ///
    /// Missing sections fall back to their defaults; a missing `model_path` falls back to
    /// the bundled model location.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;

        if settings.model_path.is_none() {
            settings.model_path = Some(DEFAULT_MODEL_PATH.into());
        }
        settings.sanitize();

        Ok(settings)
    }

    /// Serialize settings to disk in pretty-printed JSON, creating parent directories.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }

    /// Clamp every section to sensible ranges.
    pub fn sanitize(&mut self) {
        self.overlay.sanitize();
        self.upload.max_images = self.upload.max_images.max(1);
        self.export.jpeg_quality = self.export.jpeg_quality.clamp(1, 100);
    }
}

/// Returns the default path for persisted settings (`config/facemoji_settings.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/facemoji_settings.json"))
        .unwrap_or_else(|_| PathBuf::from("config/facemoji_settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn default_settings_round_trip() {
        let file = NamedTempFile::new().expect("tempfile");
        let settings = AppSettings::default();
        settings.save_to_path(file.path()).expect("save");

        let loaded = AppSettings::load_from_path(file.path()).expect("load");
        assert_eq!(loaded.input, settings.input);
        assert_eq!(loaded.overlay, settings.overlay);
        assert_eq!(loaded.export, settings.export);
        assert_eq!(loaded.model_path, settings.model_path);
        assert_eq!(loaded.upload.max_images, 10);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let file = NamedTempFile::new().expect("tempfile");
        let json = r#"{
            "detection": { "score_threshold": 0.6 },
            "overlay": { "min_size": 12.0 },
            "access": { "secret": "letmein", "ttl_minutes": 30 }
        }"#;
        fs::write(file.path(), json).expect("write custom settings");

        let loaded = AppSettings::load_from_path(file.path()).expect("load");
        assert_eq!(loaded.detection.score_threshold, 0.6);
        assert_eq!(loaded.detection.top_k, 5_000);
        assert_eq!(loaded.overlay.min_size, 12.0);
        assert_eq!(loaded.overlay.default_glyph, DEFAULT_GLYPH);
        assert_eq!(loaded.overlay.palette.len(), 12);
        assert_eq!(loaded.access.secret.as_deref(), Some("letmein"));
        assert_eq!(loaded.access.ttl_minutes, Some(30));
        assert!(loaded.model_path.is_some());
    }

    #[test]
    fn sanitize_repairs_degenerate_overlay_settings() {
        let mut overlay = OverlaySettings {
            min_size: -4.0,
            default_size: 0.0,
            resize_step: f32::NAN,
            default_glyph: "  ".into(),
            palette: vec![" ".into()],
            history_depth: 5,
        };
        overlay.sanitize();
        assert_eq!(overlay.min_size, 1.0);
        assert_eq!(overlay.default_size, 1.0);
        assert_eq!(overlay.resize_step, 1.0);
        assert_eq!(overlay.default_glyph, DEFAULT_GLYPH);
        assert_eq!(overlay.palette.len(), DEFAULT_PALETTE.len());
    }

    #[test]
    fn resize_quality_parses_case_insensitively() {
        assert_eq!(
            " Quality ".parse::<ResizeQuality>(),
            Ok(ResizeQuality::Quality)
        );
        assert!("blurry".parse::<ResizeQuality>().is_err());
        assert_eq!(ResizeQuality::Speed.to_string(), "speed");
    }

    #[test]
    fn telemetry_level_parses_variants() {
        let telemetry = TelemetrySettings {
            level: "TRACE".into(),
            ..TelemetrySettings::default()
        };
        assert_eq!(telemetry.level_filter(), LevelFilter::Trace);

        let telemetry = TelemetrySettings {
            level: "nonsense".into(),
            ..TelemetrySettings::default()
        };
        assert_eq!(telemetry.level_filter(), LevelFilter::Debug);
    }
}
