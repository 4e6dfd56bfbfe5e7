//! Serializable run summary for the facemoji CLI.

use facemoji_core::Overlay;
use serde::Serialize;

/// One overlay as exported, in natural image pixels.
#[derive(Debug, Serialize)]
pub struct OverlayRecord {
    pub glyph: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// What happened to a single input image.
#[derive(Debug, Serialize)]
pub struct ImageRecord {
    pub position: usize,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faces: Option<usize>,
    pub overlays: Vec<OverlayRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Top-level JSON document written at the end of a run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
    pub exported: usize,
    pub failed: usize,
    pub images: Vec<ImageRecord>,
}

impl From<&Overlay> for OverlayRecord {
    fn from(overlay: &Overlay) -> Self {
        Self {
            glyph: overlay.glyph.to_string(),
            x: overlay.x,
            y: overlay.y,
            size: overlay.size,
        }
    }
}
