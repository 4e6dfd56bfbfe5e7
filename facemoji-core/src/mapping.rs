//! Conversions between an image's natural pixels and its on-screen (display) size.
//!
//! Three spaces are involved:
//! * **auxiliary**: the detector's input resolution, where raw boxes come from;
//! * **natural**: the decoded image's pixel grid, used for export;
//! * **display**: the scaled size the image is shown at, where overlays live.
//!
//! Display sizes always preserve the natural aspect ratio, so a single horizontal factor is
//! enough to scale glyph sizes.

use crate::geometry::{Extent, FaceBox, Point};
use crate::overlay::Overlay;

/// Per-axis multipliers carrying coordinates from one space into another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f32,
    pub y: f32,
}

impl ScaleFactors {
    /// Factors that carry a point from `from` space into `to` space.
    ///
    /// Returns `None` when either extent is empty.
    pub fn between(from: Extent, to: Extent) -> Option<Self> {
        if from.is_empty() || to.is_empty() {
            return None;
        }
        Some(Self {
            x: to.width / from.width,
            y: to.height / from.height,
        })
    }

    pub fn apply(&self, point: Point) -> Point {
        Point::new(point.x * self.x, point.y * self.y)
    }

    pub fn apply_box(&self, face: FaceBox) -> FaceBox {
        FaceBox::new(
            face.x * self.x,
            face.y * self.y,
            face.width * self.x,
            face.height * self.y,
        )
    }

    pub fn inverse(&self) -> Self {
        Self {
            x: 1.0 / self.x,
            y: 1.0 / self.y,
        }
    }
}

/// Bidirectional mapping between natural and display space for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    natural: Extent,
    display: Extent,
}

impl CoordinateMapper {
    /// Returns `None` while the image is not decoded or not laid out yet.
    pub fn new(natural: Extent, display: Extent) -> Option<Self> {
        if natural.is_empty() || display.is_empty() {
            return None;
        }
        Some(Self { natural, display })
    }

    pub fn natural(&self) -> Extent {
        self.natural
    }

    pub fn display(&self) -> Extent {
        self.display
    }

    /// Natural-over-display ratios; multiplying a display coordinate by these yields natural.
    pub fn scale_factors(&self) -> ScaleFactors {
        ScaleFactors {
            x: self.natural.width / self.display.width,
            y: self.natural.height / self.display.height,
        }
    }

    fn display_factors(&self) -> ScaleFactors {
        self.scale_factors().inverse()
    }

    pub fn to_display(&self, point: Point) -> Point {
        self.display_factors().apply(point)
    }

    pub fn to_natural(&self, point: Point) -> Point {
        self.scale_factors().apply(point)
    }

    /// Map a natural-space box into display space.
    pub fn box_to_display(&self, face: FaceBox) -> FaceBox {
        self.display_factors().apply_box(face)
    }

    /// Map a box reported in the detector's `auxiliary` extent into display space.
    ///
    /// The box is first divided by the auxiliary downscale (aux -> natural), then multiplied
    /// by the display ratio (natural -> display). Returns `None` for an empty auxiliary extent.
    pub fn box_from_auxiliary(&self, face: FaceBox, auxiliary: Extent) -> Option<FaceBox> {
        let to_natural = ScaleFactors::between(auxiliary, self.natural)?;
        Some(self.box_to_display(to_natural.apply_box(face)))
    }

    /// Convert an overlay's display-space anchor and size into natural space.
    pub fn overlay_to_natural(&self, overlay: &Overlay) -> Overlay {
        let factors = self.scale_factors();
        let anchor = factors.apply(overlay.anchor());
        Overlay {
            x: anchor.x,
            y: anchor.y,
            size: overlay.size * factors.x,
            ..overlay.clone()
        }
    }

    /// Re-express a display-space overlay laid out under `self` in `next`'s display space,
    /// keeping it over the same natural pixels.
    pub fn rescale_display(&self, overlay: &Overlay, next: &CoordinateMapper) -> Overlay {
        let natural = self.overlay_to_natural(overlay);
        let factors = next.display_factors();
        let anchor = factors.apply(natural.anchor());
        Overlay {
            x: anchor.x,
            y: anchor.y,
            size: natural.size * factors.x,
            ..natural
        }
    }
}

/// Largest display extent that fits `natural` inside `available` while keeping its aspect ratio.
pub fn fit_within(natural: Extent, available: Extent) -> Option<Extent> {
    if natural.is_empty() || available.is_empty() {
        return None;
    }
    let scale = (available.width / natural.width).min(available.height / natural.height);
    Some(Extent::new(natural.width * scale, natural.height * scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{Glyph, OverlayId};

    fn mapper(natural: (f32, f32), display: (f32, f32)) -> CoordinateMapper {
        CoordinateMapper::new(
            Extent::new(natural.0, natural.1),
            Extent::new(display.0, display.1),
        )
        .expect("non-empty extents")
    }

    fn overlay(x: f32, y: f32, size: f32) -> Overlay {
        Overlay {
            id: OverlayId::from_raw(1),
            x,
            y,
            size,
            glyph: Glyph::new("😎").expect("glyph"),
        }
    }

    #[test]
    fn zero_dimensions_yield_no_mapper() {
        assert!(CoordinateMapper::new(Extent::new(0.0, 0.0), Extent::new(100.0, 100.0)).is_none());
        assert!(CoordinateMapper::new(Extent::new(100.0, 80.0), Extent::new(0.0, 40.0)).is_none());
    }

    #[test]
    fn points_round_trip_between_spaces() {
        let m = mapper((2000.0, 1000.0), (500.0, 250.0));
        assert_eq!(m.scale_factors(), ScaleFactors { x: 4.0, y: 4.0 });
        let display = m.to_display(Point::new(400.0, 200.0));
        assert_eq!(display, Point::new(100.0, 50.0));
        assert_eq!(m.to_natural(display), Point::new(400.0, 200.0));
    }

    #[test]
    fn auxiliary_boxes_compose_through_natural_space() {
        // 1280x960 image shown at 640x480, detector ran at 320x320.
        let m = mapper((1280.0, 960.0), (640.0, 480.0));
        let aux = FaceBox::new(80.0, 40.0, 32.0, 64.0);
        let display = m
            .box_from_auxiliary(aux, Extent::new(320.0, 320.0))
            .expect("aux extent");
        assert!((display.x - 160.0).abs() < 1e-4);
        assert!((display.y - 60.0).abs() < 1e-4);
        assert!((display.width - 64.0).abs() < 1e-4);
        assert!((display.height - 96.0).abs() < 1e-4);

        assert!(m.box_from_auxiliary(aux, Extent::default()).is_none());
    }

    #[test]
    fn overlays_scale_to_natural_with_horizontal_factor() {
        let m = mapper((1000.0, 500.0), (400.0, 200.0));
        let natural = m.overlay_to_natural(&overlay(40.0, 20.0, 64.0));
        assert!((natural.x - 100.0).abs() < 1e-4);
        assert!((natural.y - 50.0).abs() < 1e-4);
        assert!((natural.size - 160.0).abs() < 1e-4);
        assert_eq!(natural.glyph.as_str(), "😎");
    }

    #[test]
    fn rescale_keeps_overlay_on_same_natural_pixels() {
        let before = mapper((1000.0, 500.0), (400.0, 200.0));
        let after = mapper((1000.0, 500.0), (800.0, 400.0));
        let moved = before.rescale_display(&overlay(40.0, 20.0, 64.0), &after);
        assert!((moved.x - 80.0).abs() < 1e-4);
        assert!((moved.y - 40.0).abs() < 1e-4);
        assert!((moved.size - 128.0).abs() < 1e-4);
        assert_eq!(moved.id, OverlayId::from_raw(1));
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        let fitted = fit_within(Extent::new(1600.0, 900.0), Extent::new(800.0, 800.0))
            .expect("fit");
        assert_eq!(fitted, Extent::new(800.0, 450.0));
        assert!(fit_within(Extent::default(), Extent::new(10.0, 10.0)).is_none());
    }
}
