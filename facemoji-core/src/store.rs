//! Per-image overlay lists with selection, undo/redo and the drag gesture.
//!
//! Every list is an immutable `Arc<[Overlay]>` that is swapped wholesale on each edit, so
//! readers (preview painting, export workers) can hold a snapshot without locking.

use std::{
    collections::{HashMap, VecDeque},
    fmt,
    sync::Arc,
};

use log::debug;
use thiserror::Error;

use crate::drag::DragGesture;
use crate::geometry::{FaceBox, Point};
use crate::mapping::CoordinateMapper;
use crate::overlay::{Glyph, Overlay, OverlayId, OverlayLimits};

/// Identity of one opened image within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

impl ImageId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image {}", self.0)
    }
}

/// Reasons an edit was rejected. State is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("{0} is not open")]
    UnknownImage(ImageId),
    #[error("overlay {overlay} does not exist on {image}")]
    UnknownOverlay { image: ImageId, overlay: OverlayId },
    #[error("glyph text must not be empty")]
    EmptyGlyph,
    #[error("no image is open")]
    NoActiveImage,
}

impl TryFrom<&str> for Glyph {
    type Error = EditError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Glyph::new(text).ok_or(EditError::EmptyGlyph)
    }
}

/// The single selected overlay, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub image: ImageId,
    pub overlay: OverlayId,
}

#[derive(Debug, Default)]
struct ImageOverlays {
    current: Arc<[Overlay]>,
    undo: VecDeque<Arc<[Overlay]>>,
    redo: Vec<Arc<[Overlay]>>,
}

impl ImageOverlays {
    fn commit(&mut self, next: Vec<Overlay>, depth: usize) {
        let previous = std::mem::replace(&mut self.current, next.into());
        self.push_undo(previous, depth);
    }

    fn push_undo(&mut self, previous: Arc<[Overlay]>, depth: usize) {
        self.undo.push_back(previous);
        while self.undo.len() > depth {
            self.undo.pop_front();
        }
        self.redo.clear();
    }

    fn position(&self, id: OverlayId) -> Option<usize> {
        self.current.iter().position(|overlay| overlay.id == id)
    }
}

/// Owner of every overlay record in a session.
#[derive(Debug)]
pub struct OverlayStore {
    images: HashMap<ImageId, ImageOverlays>,
    limits: OverlayLimits,
    next_id: u64,
    selection: Option<Selection>,
    drag: DragGesture,
}

impl Default for OverlayStore {
    fn default() -> Self {
        Self::new(OverlayLimits::default())
    }
}

impl OverlayStore {
    pub fn new(limits: OverlayLimits) -> Self {
        Self {
            images: HashMap::new(),
            limits,
            next_id: 1,
            selection: None,
            drag: DragGesture::Idle,
        }
    }

    pub fn limits(&self) -> &OverlayLimits {
        &self.limits
    }

    pub fn set_limits(&mut self, limits: OverlayLimits) {
        self.limits = limits;
    }

    /// Create an empty list for `image`. Re-registering an image resets its list.
    pub fn register_image(&mut self, image: ImageId) {
        self.images.insert(image, ImageOverlays::default());
        self.forget_transient(image);
    }

    pub fn remove_image(&mut self, image: ImageId) {
        self.images.remove(&image);
        self.forget_transient(image);
    }

    /// Drop every list. Overlay ids keep counting so they stay unique for the session.
    pub fn reset(&mut self) {
        self.images.clear();
        self.selection = None;
        self.drag = DragGesture::Idle;
    }

    pub fn contains_image(&self, image: ImageId) -> bool {
        self.images.contains_key(&image)
    }

    /// Snapshot of the overlays on `image`, bottom-most first.
    pub fn overlays(&self, image: ImageId) -> Option<Arc<[Overlay]>> {
        self.images.get(&image).map(|entry| entry.current.clone())
    }

    pub fn overlay(&self, image: ImageId, id: OverlayId) -> Option<&Overlay> {
        self.images
            .get(&image)?
            .current
            .iter()
            .find(|overlay| overlay.id == id)
    }

    /// Append an overlay of the default size centred on `viewport_center` (display space).
    pub fn add_overlay(
        &mut self,
        image: ImageId,
        glyph: Glyph,
        viewport_center: Point,
    ) -> Result<OverlayId, EditError> {
        self.entry(image)?;
        self.settle_drag(image);
        let size = self.limits.clamp_size(self.limits.default_size);
        let id = self.allocate_id();
        let depth = self.limits.history_depth;
        let entry = self.entry_mut(image)?;
        let mut next = entry.current.to_vec();
        next.push(Overlay {
            id,
            x: viewport_center.x - size * 0.5,
            y: viewport_center.y - size * 0.5,
            size,
            glyph,
        });
        entry.commit(next, depth);
        debug!("Added overlay {id} to {image}");
        Ok(id)
    }

    /// Replace the whole list for `image` with one overlay per display-space box.
    ///
    /// Clears the selection, the undo/redo history and any drag on that image.
    pub fn set_overlays_from_detection(
        &mut self,
        image: ImageId,
        boxes: &[FaceBox],
        glyph: &Glyph,
    ) -> Result<usize, EditError> {
        if !self.images.contains_key(&image) {
            return Err(EditError::UnknownImage(image));
        }
        let limits = self.limits;
        let overlays: Vec<Overlay> = boxes
            .iter()
            .map(|face| Overlay {
                id: self.allocate_id(),
                x: face.x,
                y: face.y,
                size: limits.clamp_size(face.width),
                glyph: glyph.clone(),
            })
            .collect();
        let count = overlays.len();
        let entry = self.entry_mut(image)?;
        entry.current = overlays.into();
        entry.undo.clear();
        entry.redo.clear();
        self.forget_transient(image);
        debug!("Placed {count} detected overlay(s) on {image}");
        Ok(count)
    }

    /// Move an overlay's anchor. Positions are not clamped; off-canvas is allowed.
    pub fn move_overlay(
        &mut self,
        image: ImageId,
        id: OverlayId,
        x: f32,
        y: f32,
    ) -> Result<(), EditError> {
        self.edit(image, id, |overlay| {
            overlay.x = x;
            overlay.y = y;
        })
    }

    /// Grow or shrink by `delta`, never below the configured floor.
    pub fn resize_overlay(
        &mut self,
        image: ImageId,
        id: OverlayId,
        delta: f32,
    ) -> Result<(), EditError> {
        let limits = self.limits;
        self.edit(image, id, |overlay| {
            overlay.size = limits.clamp_size(overlay.size + delta);
        })
    }

    pub fn set_glyph(
        &mut self,
        image: ImageId,
        id: OverlayId,
        glyph: Glyph,
    ) -> Result<(), EditError> {
        self.edit(image, id, |overlay| overlay.glyph = glyph)
    }

    pub fn delete_overlay(&mut self, image: ImageId, id: OverlayId) -> Result<(), EditError> {
        self.require_overlay(image, id)?;
        self.settle_drag(image);
        let depth = self.limits.history_depth;
        let entry = self.entry_mut(image)?;
        let index = entry
            .position(id)
            .ok_or(EditError::UnknownOverlay { image, overlay: id })?;
        let mut next = entry.current.to_vec();
        next.remove(index);
        entry.commit(next, depth);

        if self.selection == Some(Selection { image, overlay: id }) {
            self.selection = None;
        }
        Ok(())
    }

    /// Remove every overlay from `image`. Recorded in history.
    pub fn clear(&mut self, image: ImageId) -> Result<(), EditError> {
        self.entry(image)?;
        self.settle_drag(image);
        let depth = self.limits.history_depth;
        let entry = self.entry_mut(image)?;
        if !entry.current.is_empty() {
            entry.commit(Vec::new(), depth);
        }
        self.forget_transient(image);
        Ok(())
    }

    /// Restore the previous snapshot. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, image: ImageId) -> Result<bool, EditError> {
        self.drag.cancel_on(image);
        let entry = self.entry_mut(image)?;
        let Some(previous) = entry.undo.pop_back() else {
            return Ok(false);
        };
        let current = std::mem::replace(&mut entry.current, previous);
        entry.redo.push(current);
        self.prune_selection();
        Ok(true)
    }

    /// Re-apply the last undone snapshot. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, image: ImageId) -> Result<bool, EditError> {
        self.drag.cancel_on(image);
        let entry = self.entry_mut(image)?;
        let Some(next) = entry.redo.pop() else {
            return Ok(false);
        };
        let current = std::mem::replace(&mut entry.current, next);
        entry.undo.push_back(current);
        self.prune_selection();
        Ok(true)
    }

    pub fn can_undo(&self, image: ImageId) -> bool {
        self.images
            .get(&image)
            .is_some_and(|entry| !entry.undo.is_empty())
    }

    pub fn can_redo(&self, image: ImageId) -> bool {
        self.images
            .get(&image)
            .is_some_and(|entry| !entry.redo.is_empty())
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Selected overlay on `image`, if the selection lives there.
    pub fn selected_on(&self, image: ImageId) -> Option<OverlayId> {
        self.selection
            .filter(|selection| selection.image == image)
            .map(|selection| selection.overlay)
    }

    pub fn select(&mut self, image: ImageId, id: OverlayId) -> Result<(), EditError> {
        self.require_overlay(image, id)?;
        self.selection = Some(Selection { image, overlay: id });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Top-most overlay under `point` (last drawn wins).
    pub fn hit_test(&self, image: ImageId, point: Point) -> Option<OverlayId> {
        self.images
            .get(&image)?
            .current
            .iter()
            .rev()
            .find(|overlay| overlay.contains(point))
            .map(|overlay| overlay.id)
    }

    pub fn drag_state(&self) -> &DragGesture {
        &self.drag
    }

    /// Grab the top-most overlay under `pointer`.
    ///
    /// A hit selects the overlay and enters `Dragging`; a miss clears the selection and
    /// stays `Idle`.
    pub fn begin_drag(
        &mut self,
        image: ImageId,
        pointer: Point,
    ) -> Result<Option<OverlayId>, EditError> {
        self.end_drag();
        let entry = self.entry(image)?;
        let Some(overlay) = entry
            .current
            .iter()
            .rev()
            .find(|overlay| overlay.contains(pointer))
        else {
            self.selection = None;
            return Ok(None);
        };
        let id = overlay.id;
        let before = entry.current.clone();
        let grabbed = overlay.clone();
        self.drag.start(image, &grabbed, pointer, before);
        self.selection = Some(Selection { image, overlay: id });
        Ok(Some(id))
    }

    /// Follow the pointer while dragging. Ignored while idle.
    pub fn drag_to(&mut self, pointer: Point) -> Option<OverlayId> {
        let active = self.drag.active()?;
        let (image, id) = (active.image, active.overlay);
        let anchor = active.anchor_for(pointer);
        let entry = self.images.get_mut(&image)?;
        let index = entry.position(id)?;
        let mut next = entry.current.to_vec();
        next[index].x = anchor.x;
        next[index].y = anchor.y;
        entry.current = next.into();
        Some(id)
    }

    /// Release the gesture, committing the pre-drag snapshot when the overlay moved.
    pub fn end_drag(&mut self) -> Option<OverlayId> {
        let finished = self.drag.finish()?;
        let depth = self.limits.history_depth;
        if let Some(entry) = self.images.get_mut(&finished.image)
            && !Arc::ptr_eq(&entry.current, &finished.before)
        {
            entry.push_undo(finished.before, depth);
        }
        Some(finished.overlay)
    }

    /// Focus moved to another image: finish any drag and drop the selection.
    pub fn release_focus(&mut self) {
        self.end_drag();
        self.selection = None;
    }

    /// Re-express every overlay on `image` for a new display size. Not recorded in history.
    pub fn rescale_display(
        &mut self,
        image: ImageId,
        previous: &CoordinateMapper,
        next: &CoordinateMapper,
    ) -> Result<(), EditError> {
        if previous == next {
            return Ok(());
        }
        self.drag.cancel_on(image);
        let entry = self.entry_mut(image)?;
        let rescale = |list: &Arc<[Overlay]>| -> Arc<[Overlay]> {
            list.iter()
                .map(|overlay| previous.rescale_display(overlay, next))
                .collect()
        };
        entry.current = rescale(&entry.current);
        entry.undo = entry.undo.iter().map(rescale).collect();
        entry.redo = entry.redo.iter().map(rescale).collect();
        Ok(())
    }

    fn edit<F>(&mut self, image: ImageId, id: OverlayId, apply: F) -> Result<(), EditError>
    where
        F: FnOnce(&mut Overlay),
    {
        self.require_overlay(image, id)?;
        self.settle_drag(image);
        let depth = self.limits.history_depth;
        let entry = self.entry_mut(image)?;
        let index = entry
            .position(id)
            .ok_or(EditError::UnknownOverlay { image, overlay: id })?;
        let mut next = entry.current.to_vec();
        apply(&mut next[index]);
        entry.commit(next, depth);
        Ok(())
    }

    fn entry(&self, image: ImageId) -> Result<&ImageOverlays, EditError> {
        self.images
            .get(&image)
            .ok_or(EditError::UnknownImage(image))
    }

    fn entry_mut(&mut self, image: ImageId) -> Result<&mut ImageOverlays, EditError> {
        self.images
            .get_mut(&image)
            .ok_or(EditError::UnknownImage(image))
    }

    fn allocate_id(&mut self) -> OverlayId {
        let id = OverlayId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    fn require_overlay(&self, image: ImageId, id: OverlayId) -> Result<(), EditError> {
        self.entry(image)?
            .position(id)
            .map(|_| ())
            .ok_or(EditError::UnknownOverlay { image, overlay: id })
    }

    /// Commit a drag in progress on `image` so the next edit stacks on top of it.
    fn settle_drag(&mut self, image: ImageId) {
        if self.drag.active().is_some_and(|active| active.image == image) {
            self.end_drag();
        }
    }

    fn forget_transient(&mut self, image: ImageId) {
        if self.selection.is_some_and(|selection| selection.image == image) {
            self.selection = None;
        }
        self.drag.cancel_on(image);
    }

    fn prune_selection(&mut self) {
        if let Some(selection) = self.selection
            && self.overlay(selection.image, selection.overlay).is_none()
        {
            self.selection = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: ImageId = ImageId::from_raw(1);
    const B: ImageId = ImageId::from_raw(2);

    fn glyph(text: &str) -> Glyph {
        Glyph::new(text).expect("glyph")
    }

    fn store_with_images() -> OverlayStore {
        let mut store = OverlayStore::default();
        store.register_image(A);
        store.register_image(B);
        store
    }

    fn boxes(n: usize) -> Vec<FaceBox> {
        (0..n)
            .map(|i| FaceBox::new(i as f32 * 50.0, 10.0, 40.0, 44.0))
            .collect()
    }

    #[test]
    fn detection_yields_one_overlay_per_box_with_armed_glyph() {
        let mut store = store_with_images();
        let armed = glyph("🤩");
        assert_eq!(
            store
                .set_overlays_from_detection(A, &boxes(3), &armed)
                .expect("detect"),
            3
        );
        let overlays = store.overlays(A).expect("list");
        assert_eq!(overlays.len(), 3);
        assert!(overlays.iter().all(|o| o.glyph == armed));
        assert_eq!(overlays[1].x, 50.0);
        assert_eq!(overlays[1].size, 40.0);

        store
            .set_overlays_from_detection(A, &[], &armed)
            .expect("empty detect");
        assert!(store.overlays(A).expect("list").is_empty());
    }

    #[test]
    fn tiny_detections_respect_size_floor() {
        let mut store = store_with_images();
        store
            .set_overlays_from_detection(A, &[FaceBox::new(0.0, 0.0, 3.0, 3.0)], &glyph("😎"))
            .expect("detect");
        assert_eq!(store.overlays(A).expect("list")[0].size, 16.0);
    }

    #[test]
    fn resize_never_drops_below_floor() {
        let mut store = store_with_images();
        let id = store
            .add_overlay(A, glyph("😎"), Point::new(100.0, 100.0))
            .expect("add");
        for _ in 0..20 {
            store.resize_overlay(A, id, -10.0).expect("resize");
        }
        assert_eq!(store.overlay(A, id).expect("overlay").size, 16.0);
        store.resize_overlay(A, id, 8.0).expect("grow");
        assert_eq!(store.overlay(A, id).expect("overlay").size, 24.0);
    }

    #[test]
    fn add_centres_default_sized_overlay() {
        let mut store = store_with_images();
        let id = store
            .add_overlay(A, glyph("😂"), Point::new(200.0, 150.0))
            .expect("add");
        let overlay = store.overlay(A, id).expect("overlay");
        assert_eq!((overlay.x, overlay.y, overlay.size), (168.0, 118.0, 64.0));
    }

    #[test]
    fn drag_moves_by_pointer_delta_regardless_of_grab_offset() {
        let mut store = store_with_images();
        store
            .set_overlays_from_detection(A, &[FaceBox::new(30.0, 40.0, 50.0, 50.0)], &glyph("😎"))
            .expect("detect");
        let grab = Point::new(47.0, 71.0);
        let id = store.begin_drag(A, grab).expect("begin").expect("hit");
        assert!(store.drag_state().is_dragging());
        assert_eq!(store.selected_on(A), Some(id));

        store.drag_to(Point::new(grab.x + 12.0, grab.y - 5.0));
        store.drag_to(Point::new(grab.x + 25.0, grab.y + 9.0));
        assert_eq!(store.end_drag(), Some(id));
        assert!(!store.drag_state().is_dragging());

        let overlay = store.overlay(A, id).expect("overlay");
        assert!((overlay.x - 55.0).abs() < 1e-4);
        assert!((overlay.y - 49.0).abs() < 1e-4);

        assert!(store.undo(A).expect("undo"));
        let restored = store.overlay(A, id).expect("overlay");
        assert_eq!((restored.x, restored.y), (30.0, 40.0));
    }

    #[test]
    fn drag_grabs_top_most_overlay_and_miss_clears_selection() {
        let mut store = store_with_images();
        let bottom = store
            .add_overlay(A, glyph("😂"), Point::new(50.0, 50.0))
            .expect("add");
        let top = store
            .add_overlay(A, glyph("😍"), Point::new(60.0, 60.0))
            .expect("add");
        assert_eq!(store.begin_drag(A, Point::new(55.0, 55.0)).expect("begin"), Some(top));
        store.end_drag();
        assert_ne!(top, bottom);

        assert_eq!(store.begin_drag(A, Point::new(900.0, 900.0)).expect("begin"), None);
        assert!(store.selection().is_none());
        assert!(!store.drag_state().is_dragging());
        assert!(store.drag_to(Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn drag_without_motion_records_no_history() {
        let mut store = store_with_images();
        let id = store
            .add_overlay(A, glyph("😂"), Point::new(50.0, 50.0))
            .expect("add");
        store.undo(A).expect("undo");
        store.redo(A).expect("redo");
        store.begin_drag(A, Point::new(50.0, 50.0)).expect("begin");
        store.end_drag();
        assert!(store.undo(A).expect("undo"));
        assert!(store.overlay(A, id).is_none());
    }

    #[test]
    fn edit_during_drag_keeps_history_in_order() {
        let mut store = store_with_images();
        let id = store
            .add_overlay(A, glyph("😂"), Point::new(50.0, 50.0))
            .expect("add");
        let start = store.overlay(A, id).expect("overlay").clone();

        store.begin_drag(A, Point::new(50.0, 50.0)).expect("begin");
        store.drag_to(Point::new(80.0, 70.0));
        store.resize_overlay(A, id, 8.0).expect("resize");
        assert!(!store.drag_state().is_dragging(), "the edit settles the drag");
        assert!(store.drag_to(Point::new(120.0, 120.0)).is_none());
        assert_eq!(store.end_drag(), None);

        let moved = store.overlay(A, id).expect("overlay");
        assert_eq!((moved.x, moved.y, moved.size), (start.x + 30.0, start.y + 20.0, start.size + 8.0));

        assert!(store.undo(A).expect("undo resize"));
        let dragged = store.overlay(A, id).expect("overlay");
        assert_eq!((dragged.x, dragged.y, dragged.size), (start.x + 30.0, start.y + 20.0, start.size));

        assert!(store.undo(A).expect("undo drag"));
        let back = store.overlay(A, id).expect("overlay");
        assert_eq!((back.x, back.y, back.size), (start.x, start.y, start.size));

        assert!(store.undo(A).expect("undo add"));
        assert!(store.overlay(A, id).is_none());
    }

    #[test]
    fn deleting_selected_clears_but_other_delete_keeps_selection() {
        let mut store = store_with_images();
        let first = store
            .add_overlay(A, glyph("😂"), Point::new(10.0, 10.0))
            .expect("add");
        let second = store
            .add_overlay(A, glyph("😊"), Point::new(200.0, 10.0))
            .expect("add");
        let third = store
            .add_overlay(A, glyph("😉"), Point::new(400.0, 10.0))
            .expect("add");

        store.select(A, third).expect("select");
        store.delete_overlay(A, first).expect("delete");
        assert_eq!(store.selected_on(A), Some(third));
        assert_eq!(store.overlay(A, third).expect("still there").glyph.as_str(), "😉");

        store.select(A, second).expect("select");
        store.delete_overlay(A, second).expect("delete");
        assert!(store.selection().is_none());
    }

    #[test]
    fn edits_on_one_image_leave_others_untouched() {
        let mut store = store_with_images();
        store
            .set_overlays_from_detection(B, &boxes(2), &glyph("😎"))
            .expect("detect");
        let before = store.overlays(B).expect("list");

        let id = store
            .add_overlay(A, glyph("😂"), Point::new(10.0, 10.0))
            .expect("add");
        store.resize_overlay(A, id, 30.0).expect("resize");
        store.clear(A).expect("clear");
        store.undo(A).expect("undo");

        assert_eq!(store.overlays(B).expect("list"), before);
        assert!(!store.can_undo(B));
    }

    #[test]
    fn undo_after_detection_has_nothing_and_undo_after_add_removes_it() {
        let mut store = store_with_images();
        let id = store
            .add_overlay(A, glyph("😂"), Point::new(10.0, 10.0))
            .expect("add");
        store
            .set_overlays_from_detection(A, &boxes(1), &glyph("😎"))
            .expect("detect");
        assert!(!store.undo(A).expect("undo"));
        assert!(store.overlay(A, id).is_none());

        let manual = store
            .add_overlay(A, glyph("😂"), Point::new(10.0, 10.0))
            .expect("add");
        assert!(store.undo(A).expect("undo"));
        assert!(store.overlay(A, manual).is_none());
        assert_eq!(store.overlays(A).expect("list").len(), 1);

        assert!(store.redo(A).expect("redo"));
        assert!(store.overlay(A, manual).is_some());
        assert!(!store.can_redo(A));
    }

    #[test]
    fn new_mutation_clears_redo_and_history_is_bounded() {
        let mut store = OverlayStore::new(OverlayLimits {
            history_depth: 3,
            ..OverlayLimits::default()
        });
        store.register_image(A);
        let id = store
            .add_overlay(A, glyph("😂"), Point::new(10.0, 10.0))
            .expect("add");
        for _ in 0..5 {
            store.resize_overlay(A, id, 1.0).expect("resize");
        }
        let mut undone = 0;
        while store.undo(A).expect("undo") {
            undone += 1;
        }
        assert_eq!(undone, 3);

        store.redo(A).expect("redo");
        store.set_glyph(A, id, glyph("😳")).expect("glyph");
        assert!(!store.can_redo(A));
    }

    #[test]
    fn unknown_targets_are_rejected_without_changes() {
        let mut store = store_with_images();
        let missing = OverlayId::from_raw(999);
        assert_eq!(
            store.move_overlay(A, missing, 1.0, 1.0),
            Err(EditError::UnknownOverlay {
                image: A,
                overlay: missing
            })
        );
        let ghost = ImageId::from_raw(42);
        assert_eq!(
            store.add_overlay(ghost, glyph("😂"), Point::default()),
            Err(EditError::UnknownImage(ghost))
        );
        assert_eq!(Glyph::try_from("  "), Err(EditError::EmptyGlyph));
        assert!(!store.can_undo(A));
    }

    #[test]
    fn moves_are_not_clamped() {
        let mut store = store_with_images();
        let id = store
            .add_overlay(A, glyph("😂"), Point::new(10.0, 10.0))
            .expect("add");
        store.move_overlay(A, id, -500.0, 9000.0).expect("move");
        let overlay = store.overlay(A, id).expect("overlay");
        assert_eq!((overlay.x, overlay.y), (-500.0, 9000.0));
    }

    #[test]
    fn detection_cancels_drag_and_selection_on_that_image() {
        let mut store = store_with_images();
        store
            .add_overlay(A, glyph("😂"), Point::new(50.0, 50.0))
            .expect("add");
        store.begin_drag(A, Point::new(50.0, 50.0)).expect("begin");
        store
            .set_overlays_from_detection(A, &boxes(1), &glyph("😎"))
            .expect("detect");
        assert!(!store.drag_state().is_dragging());
        assert!(store.selection().is_none());
    }

    #[test]
    fn ids_stay_unique_across_reset() {
        let mut store = store_with_images();
        let first = store
            .add_overlay(A, glyph("😂"), Point::default())
            .expect("add");
        store.reset();
        store.register_image(A);
        let second = store
            .add_overlay(A, glyph("😂"), Point::default())
            .expect("add");
        assert!(second > first);
    }

    #[test]
    fn rescale_follows_display_resize() {
        use crate::geometry::Extent;

        let mut store = store_with_images();
        let id = store
            .add_overlay(A, glyph("😂"), Point::new(132.0, 132.0))
            .expect("add");
        let small = CoordinateMapper::new(Extent::new(1000.0, 1000.0), Extent::new(500.0, 500.0))
            .expect("mapper");
        let large = CoordinateMapper::new(Extent::new(1000.0, 1000.0), Extent::new(1000.0, 1000.0))
            .expect("mapper");
        store.rescale_display(A, &small, &large).expect("rescale");
        let overlay = store.overlay(A, id).expect("overlay");
        assert_eq!((overlay.x, overlay.y, overlay.size), (200.0, 200.0, 128.0));
    }
}
