/// Common test utilities for CLI integration tests
use std::path::PathBuf;

#[allow(dead_code)]
pub fn find_model_path() -> Option<PathBuf> {
    let candidates = vec![
        "models/face_detection_yunet_2023mar_640.onnx",
        "../models/face_detection_yunet_2023mar_640.onnx",
    ];
    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Any outline font will do; glyphs it lacks still rasterize as a notdef box.
pub fn find_font_path() -> Option<PathBuf> {
    let candidates = vec![
        "assets/NotoEmoji-Regular.ttf",
        "../assets/NotoEmoji-Regular.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/Library/Fonts/Arial Unicode.ttf",
        "C:\\Windows\\Fonts\\seguiemj.ttf",
    ];
    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Resolve the font or skip the calling test, returning `$ret` when given.
#[macro_export]
macro_rules! require_font {
    ($($ret:expr)?) => {
        match $crate::common::find_font_path() {
            Some(p) => p,
            None => {
                eprintln!("Skipping test: no glyph font found");
                return $($ret)?;
            }
        }
    };
}
