//! Painting overlays onto pixels at natural resolution.

use std::{fs, path::Path};

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use anyhow::{Context, Result};
use facemoji_utils::config::RenderSettings;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use log::debug;

use crate::overlay::{Glyph, Overlay};

/// Something that can draw a glyph onto an RGBA canvas.
///
/// `x` is the left edge and `baseline` the text baseline, both in canvas pixels; `size` is
/// the font size in pixels.
pub trait GlyphPainter: Send + Sync {
    fn paint(&self, canvas: &mut RgbaImage, glyph: &Glyph, x: f32, baseline: f32, size: f32);
}

/// Outline-font painter backed by `ab_glyph` and `imageproc`.
#[derive(Clone)]
pub struct FontGlyphPainter {
    font: FontArc,
    color: Rgba<u8>,
}

impl std::fmt::Debug for FontGlyphPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontGlyphPainter")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl FontGlyphPainter {
    pub fn from_bytes(bytes: Vec<u8>, color: Rgba<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(bytes).context("font data is not a valid TrueType/OpenType font")?;
        Ok(Self { font, color })
    }

    pub fn from_path<P: AsRef<Path>>(path: P, color: Rgba<u8>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("failed to read font {}", path.display()))?;
        debug!("Loaded glyph font from {}", path.display());
        Self::from_bytes(bytes, color)
            .with_context(|| format!("failed to parse font {}", path.display()))
    }

    pub fn from_settings(settings: &RenderSettings) -> Result<Self> {
        let path = settings
            .font_path
            .as_deref()
            .context("no glyph font configured")?;
        Self::from_path(path, Rgba(settings.glyph_color))
    }

    /// Distance from the top of the layout box to the baseline at `size`.
    pub fn ascent(&self, size: f32) -> f32 {
        self.font.as_scaled(PxScale::from(size)).ascent()
    }
}

impl GlyphPainter for FontGlyphPainter {
    fn paint(&self, canvas: &mut RgbaImage, glyph: &Glyph, x: f32, baseline: f32, size: f32) {
        let scale = PxScale::from(size);
        let top = baseline - self.ascent(size);
        draw_text_mut(
            canvas,
            self.color,
            x.round() as i32,
            top.round() as i32,
            scale,
            &self.font,
            glyph.as_str(),
        );
    }
}

/// Copy `image` and paint every overlay onto it.
///
/// `overlays` must already be in natural space. Each glyph's baseline sits one glyph size
/// below its anchor, matching the interactive preview.
pub fn render_overlays(
    image: &DynamicImage,
    overlays: &[Overlay],
    painter: &dyn GlyphPainter,
) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    for overlay in overlays {
        let baseline = overlay.baseline();
        painter.paint(
            &mut canvas,
            &overlay.glyph,
            baseline.x,
            baseline.y,
            overlay.size,
        );
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayId;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPainter {
        calls: Mutex<Vec<(String, f32, f32, f32)>>,
    }

    impl GlyphPainter for RecordingPainter {
        fn paint(&self, canvas: &mut RgbaImage, glyph: &Glyph, x: f32, baseline: f32, size: f32) {
            if let Some(pixel) = canvas.get_pixel_mut_checked(x as u32, (baseline - 1.0) as u32) {
                *pixel = Rgba([255, 0, 0, 255]);
            }
            self.calls
                .lock()
                .expect("lock")
                .push((glyph.to_string(), x, baseline, size));
        }
    }

    #[test]
    fn baseline_sits_one_size_below_anchor() {
        let image = DynamicImage::new_rgb8(100, 100);
        let overlays = vec![Overlay {
            id: OverlayId::from_raw(1),
            x: 10.0,
            y: 20.0,
            size: 30.0,
            glyph: Glyph::new("😎").expect("glyph"),
        }];
        let painter = RecordingPainter::default();
        let canvas = render_overlays(&image, &overlays, &painter);

        let calls = painter.calls.lock().expect("lock");
        assert_eq!(calls.as_slice(), &[("😎".to_string(), 10.0, 50.0, 30.0)]);
        assert_eq!(canvas.get_pixel(10, 49), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.dimensions(), (100, 100));
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        assert!(FontGlyphPainter::from_bytes(b"nope".to_vec(), Rgba([0, 0, 0, 255])).is_err());
        let settings = RenderSettings {
            font_path: None,
            ..RenderSettings::default()
        };
        assert!(FontGlyphPainter::from_settings(&settings).is_err());
    }
}
