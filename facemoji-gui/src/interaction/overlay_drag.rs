//! Press, move and release handling for overlay dragging.

use facemoji_core::{ImageId, OverlayStore};
use log::debug;

use crate::{PointerSnapshot, PreviewSpace};

/// Feed one frame of pointer state into the store's drag gesture.
///
/// A press inside the image grabs the top-most overlay under the pointer (or clears the
/// selection on a miss). While dragging, the overlay follows the pointer until the button
/// is released, even outside the image. Returns `true` while the pointer is interacting
/// with an overlay.
pub fn handle_overlay_drag(
    store: &mut OverlayStore,
    image: ImageId,
    pointer: &PointerSnapshot,
    space: &PreviewSpace,
) -> bool {
    if store.drag_state().is_dragging() {
        if pointer.down
            && let Some(pos) = pointer.pos
        {
            store.drag_to(space.to_display(pos));
        }
        if pointer.released || !pointer.down {
            store.end_drag();
        }
        return true;
    }

    let Some(pos) = pointer.pos else {
        return false;
    };
    if !pointer.pressed || !space.rect.contains(pos) {
        return false;
    }
    match store.begin_drag(image, space.to_display(pos)) {
        Ok(hit) => hit.is_some(),
        Err(err) => {
            debug!("Ignoring press on {image}: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Rect, pos2, vec2};
    use facemoji_core::{Glyph, OverlayLimits, Point};

    fn setup() -> (OverlayStore, ImageId, PreviewSpace) {
        let mut store = OverlayStore::new(OverlayLimits::default());
        let image = ImageId::from_raw(1);
        store.register_image(image);
        store
            .add_overlay(image, Glyph::default(), Point::new(50.0, 50.0))
            .expect("add");
        let space = PreviewSpace::new(Rect::from_min_size(pos2(100.0, 100.0), vec2(200.0, 200.0)));
        (store, image, space)
    }

    fn snapshot(pos: (f32, f32), pressed: bool, down: bool, released: bool) -> PointerSnapshot {
        PointerSnapshot {
            pressed,
            released,
            down,
            pos: Some(pos2(pos.0, pos.1)),
        }
    }

    #[test]
    fn press_move_release_moves_by_pointer_delta() {
        let (mut store, image, space) = setup();
        // Overlay occupies display (18..82); screen (118..182).
        assert!(handle_overlay_drag(&mut store, image, &snapshot((130.0, 140.0), true, true, false), &space));
        handle_overlay_drag(&mut store, image, &snapshot((160.0, 150.0), false, true, false), &space);
        handle_overlay_drag(&mut store, image, &snapshot((160.0, 150.0), false, false, true), &space);

        let overlay = store.overlays(image).expect("list")[0].clone();
        assert_eq!((overlay.x, overlay.y), (48.0, 28.0));
        assert!(!store.drag_state().is_dragging());
        assert!(store.undo(image).expect("undo"));
        assert_eq!(store.overlays(image).expect("list")[0].x, 18.0);
    }

    #[test]
    fn presses_outside_the_image_are_ignored() {
        let (mut store, image, space) = setup();
        let id = store.overlays(image).expect("list")[0].id;
        store.select(image, id).expect("select");

        assert!(!handle_overlay_drag(&mut store, image, &snapshot((20.0, 20.0), true, true, false), &space));
        assert_eq!(store.selected_on(image), Some(id));

        assert!(!handle_overlay_drag(&mut store, image, &snapshot((290.0, 290.0), true, true, false), &space));
        assert_eq!(store.selected_on(image), None);
    }
}
