//! Core editing primitives for Facemoji.
//!
//! This crate owns the overlay store and its drag gesture, converts coordinates between
//! detector, natural and display space, runs YuNet face detection with `tract-onnx`, and
//! renders and exports edited images.

/// Optional shared-secret gate.
pub mod access;
/// Face detection trait and the YuNet implementation.
pub mod detect;
/// Overlay drag gesture state.
pub mod drag;
/// Single-image and zip archive export.
pub mod export;
/// Points, extents and face boxes.
pub mod geometry;
/// Natural/display/auxiliary coordinate conversion.
pub mod mapping;
/// Overlay records, glyphs and size limits.
pub mod overlay;
/// Glyph painting at natural resolution.
pub mod render;
/// Opened images, active image and detection policy.
pub mod session;
/// Per-image overlay lists with undo/redo.
pub mod store;

pub use access::{AccessDenied, AccessGate, AccessSession};
pub use detect::{DetectionOutput, FaceDetector, YuNetDetector};
pub use drag::{ActiveDrag, DragGesture};
pub use export::{
    ExportFailure, ExportItem, ExportReport, ExportSource, export_archive, export_archive_to_path,
    export_name, export_single,
};
pub use geometry::{Extent, FaceBox, Point};
pub use mapping::{CoordinateMapper, ScaleFactors, fit_within};
pub use overlay::{Glyph, Overlay, OverlayId, OverlayLimits};
pub use render::{FontGlyphPainter, GlyphPainter, render_overlays};
pub use session::{
    DetectionOutcome, DetectionRequest, DetectionTicket, EditorSession, ImageEntry, ImageSource,
    OpenSummary,
};
pub use store::{EditError, ImageId, OverlayStore, Selection};
