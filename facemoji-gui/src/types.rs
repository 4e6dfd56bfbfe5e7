//! Type definitions for the Facemoji GUI application.

use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::{Arc, mpsc},
};

use egui::{Context as EguiContext, Rect, TextureHandle};
use facemoji_core::{
    AccessGate, AccessSession, DetectionOutput, DetectionTicket, EditorSession, Extent,
    ExportReport, FaceDetector, GlyphPainter, ImageId, Point,
};
use facemoji_utils::config::AppSettings;
use image::DynamicImage;

/// The main application state for the Facemoji GUI.
pub struct FacemojiApp {
    /// User-configurable settings.
    pub settings: AppSettings,
    /// Path to the settings file on disk.
    pub settings_path: PathBuf,
    /// Opened images, overlays and history.
    pub session: EditorSession,
    /// Shared-secret gate built from settings.
    pub gate: AccessGate,
    /// Present once the gate has been passed (or immediately when it is open).
    pub access: Option<AccessSession>,
    /// Password field on the lock screen.
    pub secret_input: String,
    /// Inline message under the password field.
    pub access_error: Option<String>,
    /// The face detector, once loaded.
    pub detector: Option<Arc<dyn FaceDetector>>,
    /// A model load is running on a worker.
    pub detector_loading: bool,
    /// Glyph rasterizer used for exports. Loaded on first export.
    pub painter: Option<Arc<dyn GlyphPainter>>,
    /// Sender handed to background jobs.
    pub job_tx: mpsc::Sender<JobMessage>,
    /// Receiver drained on the GUI thread every frame.
    pub job_rx: mpsc::Receiver<JobMessage>,
    /// Uploaded textures per opened image.
    pub textures: HashMap<ImageId, TextureHandle>,
    /// Images currently being decoded.
    pub decoding: HashSet<ImageId>,
    /// Detection job whose result the preview is waiting on.
    pub pending_detection: Option<DetectionTicket>,
    /// The current status message displayed in the top bar.
    pub status_line: String,
    /// The last error message, if any.
    pub last_error: Option<String>,
    /// Free-text glyph entry next to the palette.
    pub custom_glyph_input: String,
    /// A counter to generate unique texture names.
    pub texture_seq: u64,
}

/// A message sent from a background job to the GUI thread.
pub enum JobMessage {
    /// The YuNet model finished loading.
    DetectorReady(Arc<dyn FaceDetector>),
    /// The YuNet model could not be loaded.
    DetectorFailed { error: String },
    /// An opened image finished decoding.
    ImageDecoded {
        image: ImageId,
        result: Result<Arc<DynamicImage>, String>,
    },
    /// A detection job finished; the ticket decides whether the result still applies.
    DetectionFinished {
        ticket: DetectionTicket,
        result: anyhow::Result<DetectionOutput>,
    },
    /// An export job finished.
    ExportFinished {
        target: PathBuf,
        result: Result<ExportReport, String>,
    },
}

/// Snapshot of pointer state for interaction handling.
#[derive(Clone, Copy, Default)]
pub struct PointerSnapshot {
    pub pressed: bool,
    pub released: bool,
    pub down: bool,
    pub pos: Option<egui::Pos2>,
}

impl PointerSnapshot {
    pub fn capture(ctx: &EguiContext) -> Self {
        ctx.input(|input| PointerSnapshot {
            pressed: input.pointer.primary_pressed(),
            released: input.pointer.primary_released(),
            down: input.pointer.primary_down(),
            pos: input.pointer.interact_pos(),
        })
    }
}

/// Where the active image sits on screen. `display` equals the rect's size.
#[derive(Clone, Copy, Debug)]
pub struct PreviewSpace {
    pub rect: Rect,
    pub display: Extent,
}

impl PreviewSpace {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            display: Extent::new(rect.width(), rect.height()),
        }
    }

    /// Screen position to display-space point, relative to the image's top-left corner.
    pub fn to_display(&self, pos: egui::Pos2) -> Point {
        Point::new(pos.x - self.rect.left(), pos.y - self.rect.top())
    }

    /// Display-space point to screen position.
    pub fn to_screen(&self, point: Point) -> egui::Pos2 {
        egui::pos2(self.rect.left() + point.x, self.rect.top() + point.y)
    }
}
