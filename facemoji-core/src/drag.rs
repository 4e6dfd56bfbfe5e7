//! Pointer drag gesture for moving a single overlay.
//!
//! The gesture is a two-state machine (`Idle -> Dragging -> Idle`) owned by
//! [`OverlayStore`](crate::store::OverlayStore); this module only holds the state and the
//! anchor arithmetic, the store performs hit-testing and list updates.

use std::sync::Arc;

use crate::geometry::Point;
use crate::overlay::{Overlay, OverlayId};
use crate::store::ImageId;

/// Bookkeeping for an overlay that is currently following the pointer.
#[derive(Debug, Clone)]
pub struct ActiveDrag {
    pub image: ImageId,
    pub overlay: OverlayId,
    /// `anchor - pointer` captured on grab, so the overlay does not jump to the cursor.
    pub offset: Point,
    /// List as it was before the gesture started; committed to history on release.
    pub(crate) before: Arc<[Overlay]>,
}

impl ActiveDrag {
    /// Anchor position for the current pointer location.
    pub fn anchor_for(&self, pointer: Point) -> Point {
        pointer + self.offset
    }
}

#[derive(Debug, Clone, Default)]
pub enum DragGesture {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

impl DragGesture {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragGesture::Dragging(_))
    }

    pub fn active(&self) -> Option<&ActiveDrag> {
        match self {
            DragGesture::Dragging(active) => Some(active),
            DragGesture::Idle => None,
        }
    }

    pub(crate) fn start(
        &mut self,
        image: ImageId,
        overlay: &Overlay,
        pointer: Point,
        before: Arc<[Overlay]>,
    ) {
        *self = DragGesture::Dragging(ActiveDrag {
            image,
            overlay: overlay.id,
            offset: overlay.anchor() - pointer,
            before,
        });
    }

    /// Return to `Idle`, handing back the finished gesture if there was one.
    pub(crate) fn finish(&mut self) -> Option<ActiveDrag> {
        match std::mem::take(self) {
            DragGesture::Dragging(active) => Some(active),
            DragGesture::Idle => None,
        }
    }

    /// Drop the gesture without committing when it targets `image`.
    pub(crate) fn cancel_on(&mut self, image: ImageId) -> bool {
        if self.active().is_some_and(|active| active.image == image) {
            *self = DragGesture::Idle;
            true
        } else {
            false
        }
    }
}
