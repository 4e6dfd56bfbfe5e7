//! Coordinate helpers between screen space and the preview's display space.

use egui::{Galley, Pos2, Rect, Vec2, pos2, vec2};
use facemoji_core::{Extent, Overlay, fit_within};

use crate::PreviewSpace;

/// On-screen size for an image of `natural` size inside `available`, never upscaled.
pub fn preview_extent(natural: Extent, available: Vec2) -> Option<Extent> {
    let fitted = fit_within(natural, Extent::new(available.x, available.y))?;
    if fitted.width > natural.width {
        Some(natural)
    } else {
        Some(fitted)
    }
}

/// Screen rectangle covered by an overlay's hit square.
pub fn overlay_screen_rect(overlay: &Overlay, space: &PreviewSpace) -> Rect {
    Rect::from_min_size(
        space.to_screen(overlay.anchor()),
        vec2(overlay.size, overlay.size),
    )
}

/// Distance from the top of a single-line galley to its text baseline.
pub fn galley_baseline(galley: &Galley) -> f32 {
    galley
        .rows
        .first()
        .and_then(|row| row.glyphs.first().map(|glyph| row.pos.y + glyph.pos.y))
        .unwrap_or_else(|| galley.size().y)
}

/// Where to paint an overlay's galley so its baseline lands where exports draw it.
pub fn glyph_origin(overlay: &Overlay, space: &PreviewSpace, baseline_offset: f32) -> Pos2 {
    let baseline = space.to_screen(overlay.baseline());
    pos2(baseline.x, baseline.y - baseline_offset)
}
