use std::{fmt, sync::Arc};

use facemoji_utils::config::{DEFAULT_GLYPH, OverlaySettings};

use crate::geometry::Point;

/// Session-unique overlay identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl OverlayId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-empty, trimmed sticker text (normally a single emoji).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Glyph(Arc<str>);

impl Glyph {
    /// Returns `None` when `text` is blank.
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(Arc::from(trimmed)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self(Arc::from(DEFAULT_GLYPH))
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One emoji sticker placed on an image.
///
/// `x`/`y` are the top-left anchor and `size` the glyph's font size, all in display space.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub id: OverlayId,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub glyph: Glyph,
}

impl Overlay {
    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Left end of the text baseline, one glyph size below the anchor.
    pub fn baseline(&self) -> Point {
        Point::new(self.x, self.y + self.size)
    }

    /// Hit-test against the overlay's square `[x, x + size] x [y, y + size]`.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.size
            && point.y >= self.y
            && point.y <= self.y + self.size
    }
}

/// Size constraints enforced by the overlay store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLimits {
    pub min_size: f32,
    pub default_size: f32,
    pub history_depth: usize,
}

impl Default for OverlayLimits {
    fn default() -> Self {
        Self {
            min_size: 16.0,
            default_size: 64.0,
            history_depth: 50,
        }
    }
}

impl OverlayLimits {
    pub fn clamp_size(&self, size: f32) -> f32 {
        if size.is_finite() {
            size.max(self.min_size)
        } else {
            self.min_size
        }
    }
}

impl From<&OverlaySettings> for OverlayLimits {
    fn from(settings: &OverlaySettings) -> Self {
        Self {
            min_size: settings.min_size,
            default_size: settings.default_size.max(settings.min_size),
            history_depth: settings.history_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyphs_reject_blank_text() {
        assert!(Glyph::new("   ").is_none());
        assert_eq!(Glyph::new(" 🤩 ").expect("glyph").as_str(), "🤩");
    }

    #[test]
    fn hit_test_covers_closed_square() {
        let overlay = Overlay {
            id: OverlayId::from_raw(7),
            x: 10.0,
            y: 10.0,
            size: 20.0,
            glyph: Glyph::new("😂").expect("glyph"),
        };
        assert!(overlay.contains(Point::new(10.0, 30.0)));
        assert!(overlay.contains(Point::new(25.0, 15.0)));
        assert!(!overlay.contains(Point::new(31.0, 15.0)));
    }

    #[test]
    fn limits_clamp_to_floor() {
        let limits = OverlayLimits::default();
        assert_eq!(limits.clamp_size(4.0), 16.0);
        assert_eq!(limits.clamp_size(f32::NAN), 16.0);
        assert_eq!(limits.clamp_size(90.0), 90.0);
    }
}
