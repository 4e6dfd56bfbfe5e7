//! Editor session: the opened images, which one is active, the armed glyph and the
//! detection invocation policy.
//!
//! The session never runs the detector itself. It hands out [`DetectionRequest`]s carrying a
//! [`DetectionTicket`]; whoever runs the detector passes the ticket back with the result to
//! [`EditorSession::apply_detection`], which drops results that no longer match the active
//! image.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use facemoji_utils::config::AppSettings;
use image::{DynamicImage, GenericImageView};
use log::{debug, warn};

use crate::detect::DetectionOutput;
use crate::export::{ExportItem, ExportSource};
use crate::geometry::{Extent, FaceBox, Point};
use crate::mapping::CoordinateMapper;
use crate::overlay::{Glyph, Overlay, OverlayId, OverlayLimits};
use crate::store::{EditError, ImageId, OverlayStore};

/// A file chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub path: PathBuf,
    pub label: String,
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, label }
    }
}

/// One opened image and what the session knows about it.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    pub id: ImageId,
    pub source: ImageSource,
    pixels: Option<Arc<DynamicImage>>,
    natural: Option<Extent>,
    display: Option<Extent>,
    generation: u64,
    detected: bool,
}

impl ImageEntry {
    pub fn path(&self) -> &Path {
        &self.source.path
    }

    pub fn label(&self) -> &str {
        &self.source.label
    }

    pub fn pixels(&self) -> Option<&Arc<DynamicImage>> {
        self.pixels.as_ref()
    }

    pub fn natural_extent(&self) -> Option<Extent> {
        self.natural
    }

    pub fn display_extent(&self) -> Option<Extent> {
        self.display
    }

    pub fn mapper(&self) -> Option<CoordinateMapper> {
        CoordinateMapper::new(self.natural?, self.display?)
    }

    /// `true` once a detection result has been applied to this image.
    pub fn detected(&self) -> bool {
        self.detected
    }
}

/// Identifies the load event a detection was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DetectionTicket {
    pub image: ImageId,
    pub generation: u64,
}

/// Work item for whoever runs the detector.
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub ticket: DetectionTicket,
    pub image: Arc<DynamicImage>,
}

/// What happened to a detection result handed to [`EditorSession::apply_detection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// The image's overlays were replaced by this many detected ones.
    Applied(usize),
    /// The ticket no longer matches the active image; nothing changed.
    Stale,
    /// The detector failed; previous overlays are untouched.
    Failed(String),
}

/// Result of [`EditorSession::open_images`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenSummary {
    pub accepted: usize,
    pub dropped: usize,
}

#[derive(Debug)]
pub struct EditorSession {
    images: Vec<ImageEntry>,
    current: Option<usize>,
    store: OverlayStore,
    armed: Glyph,
    saving: bool,
    detector_ready: bool,
    max_images: usize,
    redetect_on_revisit: bool,
    next_image: u64,
    next_generation: u64,
}

impl EditorSession {
    pub fn new(settings: &AppSettings) -> Self {
        let armed = Glyph::new(&settings.overlay.default_glyph).unwrap_or_default();
        Self {
            images: Vec::new(),
            current: None,
            store: OverlayStore::new(OverlayLimits::from(&settings.overlay)),
            armed,
            saving: false,
            detector_ready: false,
            max_images: settings.upload.max_images.max(1),
            redetect_on_revisit: settings.detection.redetect_on_revisit,
            next_image: 1,
            next_generation: 1,
        }
    }

    /// Replace the opened set. Sources beyond the configured cap are dropped with a warning.
    pub fn open_images(&mut self, sources: Vec<ImageSource>) -> OpenSummary {
        let total = sources.len();
        if total > self.max_images {
            warn!(
                "{total} images selected; keeping the first {} and dropping the rest",
                self.max_images
            );
        }
        self.store.reset();
        self.images = sources
            .into_iter()
            .take(self.max_images)
            .map(|source| {
                let id = ImageId::from_raw(self.next_image);
                self.next_image += 1;
                self.store.register_image(id);
                ImageEntry {
                    id,
                    source,
                    pixels: None,
                    natural: None,
                    display: None,
                    generation: 0,
                    detected: false,
                }
            })
            .collect();
        self.current = (!self.images.is_empty()).then_some(0);
        OpenSummary {
            accepted: self.images.len(),
            dropped: total.saturating_sub(self.images.len()),
        }
    }

    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    pub fn image(&self, id: ImageId) -> Option<&ImageEntry> {
        self.images.iter().find(|entry| entry.id == id)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&ImageEntry> {
        self.images.get(self.current?)
    }

    pub fn current_id(&self) -> Option<ImageId> {
        self.current().map(|entry| entry.id)
    }

    /// Make `index` the active image. Finishes any drag and clears the selection.
    pub fn select_image(&mut self, index: usize) -> bool {
        if index >= self.images.len() || self.current == Some(index) {
            return false;
        }
        self.store.release_focus();
        self.current = Some(index);
        true
    }

    pub fn next_image(&mut self) -> bool {
        match self.current {
            Some(index) => self.select_image(index + 1),
            None => false,
        }
    }

    pub fn previous_image(&mut self) -> bool {
        match self.current {
            Some(index) if index > 0 => self.select_image(index - 1),
            _ => false,
        }
    }

    pub fn detector_ready(&self) -> bool {
        self.detector_ready
    }

    /// Mark the detector as usable. Returns a request for the active image when it is
    /// loaded and still waiting for its first detection.
    pub fn set_detector_ready(&mut self, ready: bool) -> Option<DetectionRequest> {
        self.detector_ready = ready;
        let entry = self.current()?;
        if !ready || entry.detected {
            return None;
        }
        let id = entry.id;
        self.request_detection(id)
    }

    /// Record decoded pixels for `id` becoming the active, fully loaded image.
    ///
    /// Returns a detection request when detection should run for this load event.
    pub fn on_image_loaded(
        &mut self,
        id: ImageId,
        pixels: Arc<DynamicImage>,
    ) -> Option<DetectionRequest> {
        let redetect = self.redetect_on_revisit;
        let entry = self.images.iter_mut().find(|entry| entry.id == id)?;
        let (width, height) = pixels.dimensions();
        let natural = Extent::from_pixels(width, height);
        entry.natural = Some(natural);
        if entry.display.is_none() {
            entry.display = Some(natural);
        }
        let first_load = entry.pixels.is_none();
        entry.pixels = Some(pixels);

        if self.current_id() != Some(id) {
            return None;
        }
        let entry_detected = self.image(id).is_some_and(|entry| entry.detected);
        if entry_detected && !(redetect || first_load) {
            debug!("Skipping detection for {id}; already detected");
            return None;
        }
        self.request_detection(id)
    }

    /// Issue a detection request for `id`, superseding any in-flight one.
    ///
    /// Returns `None` while the detector is not ready, the image is not decoded or has
    /// zero size.
    pub fn request_detection(&mut self, id: ImageId) -> Option<DetectionRequest> {
        if !self.detector_ready {
            debug!("Detector not ready; skipping detection for {id}");
            return None;
        }
        let generation = self.next_generation;
        let entry = self.images.iter_mut().find(|entry| entry.id == id)?;
        let pixels = entry.pixels.clone()?;
        if entry.natural.is_none_or(|extent| extent.is_empty()) {
            debug!("{id} has no pixels; skipping detection");
            return None;
        }
        entry.generation = generation;
        self.next_generation += 1;
        Some(DetectionRequest {
            ticket: DetectionTicket {
                image: id,
                generation,
            },
            image: pixels,
        })
    }

    /// `true` when `ticket` still refers to the active image's latest load event.
    pub fn is_current_ticket(&self, ticket: DetectionTicket) -> bool {
        self.current()
            .is_some_and(|entry| entry.id == ticket.image && entry.generation == ticket.generation)
    }

    /// Apply a finished detection. Boxes are mapped aux -> natural -> display and replace
    /// the image's overlays, each wearing the armed glyph.
    pub fn apply_detection(
        &mut self,
        ticket: DetectionTicket,
        result: Result<DetectionOutput>,
    ) -> DetectionOutcome {
        if !self.is_current_ticket(ticket) {
            debug!(
                "Ignoring stale detection result for {} (generation {})",
                ticket.image, ticket.generation
            );
            return DetectionOutcome::Stale;
        }
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                warn!("Face detection failed for {}: {err:#}", ticket.image);
                return DetectionOutcome::Failed(format!("{err:#}"));
            }
        };
        let Some(mapper) = self.image(ticket.image).and_then(ImageEntry::mapper) else {
            debug!("{} has no layout yet; skipping detection result", ticket.image);
            return DetectionOutcome::Stale;
        };

        let boxes: Vec<FaceBox> = if output.space.is_empty() {
            output
                .boxes
                .iter()
                .map(|face| mapper.box_to_display(*face))
                .collect()
        } else {
            output
                .boxes
                .iter()
                .filter_map(|face| mapper.box_from_auxiliary(*face, output.space))
                .collect()
        };

        match self
            .store
            .set_overlays_from_detection(ticket.image, &boxes, &self.armed)
        {
            Ok(count) => {
                if let Some(entry) = self.images.iter_mut().find(|e| e.id == ticket.image) {
                    entry.detected = true;
                }
                DetectionOutcome::Applied(count)
            }
            Err(err) => DetectionOutcome::Failed(err.to_string()),
        }
    }

    /// Record a new on-screen size for `id`, keeping its overlays on the same pixels.
    pub fn set_display_extent(&mut self, id: ImageId, display: Extent) -> Result<(), EditError> {
        if display.is_empty() {
            return Ok(());
        }
        let entry = self
            .images
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(EditError::UnknownImage(id))?;
        let previous = entry.mapper();
        entry.display = Some(display);
        let next = entry.mapper();
        if let (Some(previous), Some(next)) = (previous, next) {
            self.store.rescale_display(id, &previous, &next)?;
        }
        Ok(())
    }

    pub fn store(&self) -> &OverlayStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut OverlayStore {
        &mut self.store
    }

    pub fn armed_glyph(&self) -> &Glyph {
        &self.armed
    }

    pub fn arm_glyph(&mut self, glyph: Glyph) {
        self.armed = glyph;
    }

    /// Overlays on the active image, bottom-most first.
    pub fn current_overlays(&self) -> Arc<[Overlay]> {
        self.current_id()
            .and_then(|id| self.store.overlays(id))
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn selected_overlay(&self) -> Option<OverlayId> {
        self.store.selected_on(self.current_id()?)
    }

    /// Add an overlay with the armed glyph on the active image.
    ///
    /// Without an explicit centre it lands in the middle of the displayed image.
    pub fn add_overlay(&mut self, viewport_center: Option<Point>) -> Result<OverlayId, EditError> {
        let entry = self.current().ok_or(EditError::NoActiveImage)?;
        let id = entry.id;
        let center = viewport_center
            .or_else(|| entry.display.map(|extent| extent.center()))
            .unwrap_or_default();
        let armed = self.armed.clone();
        let overlay = self.store.add_overlay(id, armed, center)?;
        self.store.select(id, overlay)?;
        Ok(overlay)
    }

    /// Re-glyph the selected overlay on the active image with the armed glyph.
    pub fn apply_armed_to_selection(&mut self) -> Result<bool, EditError> {
        let (Some(image), Some(overlay)) = (self.current_id(), self.selected_overlay()) else {
            return Ok(false);
        };
        let armed = self.armed.clone();
        self.store.set_glyph(image, overlay, armed)?;
        Ok(true)
    }

    pub fn resize_selected(&mut self, delta: f32) -> Result<bool, EditError> {
        let (Some(image), Some(overlay)) = (self.current_id(), self.selected_overlay()) else {
            return Ok(false);
        };
        self.store.resize_overlay(image, overlay, delta)?;
        Ok(true)
    }

    pub fn delete_selected(&mut self) -> Result<bool, EditError> {
        let (Some(image), Some(overlay)) = (self.current_id(), self.selected_overlay()) else {
            return Ok(false);
        };
        self.store.delete_overlay(image, overlay)?;
        Ok(true)
    }

    pub fn clear_current(&mut self) -> Result<(), EditError> {
        match self.current_id() {
            Some(id) => self.store.clear(id),
            None => Ok(()),
        }
    }

    pub fn undo(&mut self) -> Result<bool, EditError> {
        match self.current_id() {
            Some(id) => self.store.undo(id),
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> Result<bool, EditError> {
        match self.current_id() {
            Some(id) => self.store.redo(id),
            None => Ok(false),
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Enter the saving state. Returns `false` when an export is already running.
    pub fn begin_saving(&mut self) -> bool {
        if self.saving {
            return false;
        }
        self.saving = true;
        true
    }

    pub fn finish_saving(&mut self) {
        self.saving = false;
    }

    fn export_item(&self, position: usize, entry: &ImageEntry) -> ExportItem {
        let overlays = self.store.overlays(entry.id).unwrap_or_else(|| Arc::from(Vec::new()));
        let overlays: Arc<[Overlay]> = match entry.mapper() {
            Some(mapper) => overlays
                .iter()
                .map(|overlay| mapper.overlay_to_natural(overlay))
                .collect(),
            None => overlays,
        };
        let source = match &entry.pixels {
            Some(pixels) => ExportSource::Decoded(pixels.clone()),
            None => ExportSource::Path(entry.source.path.clone()),
        };
        ExportItem {
            position,
            source,
            overlays,
        }
    }

    /// Export snapshot for the active image.
    pub fn current_export_item(&self) -> Option<ExportItem> {
        let index = self.current?;
        Some(self.export_item(index + 1, self.images.get(index)?))
    }

    /// Export snapshots for every opened image, in upload order.
    pub fn export_items(&self) -> Vec<ExportItem> {
        self.images
            .iter()
            .enumerate()
            .map(|(index, entry)| self.export_item(index + 1, entry))
            .collect()
    }
}
