//! Desktop editor for placing emoji stickers over faces.

use eframe::NativeOptions;
use facemoji_gui::FacemojiApp;
use facemoji_utils::init_logging;

/// Main entry point for the GUI application.
fn main() -> eframe::Result<()> {
    init_logging(log::LevelFilter::Info).expect("failed to initialize logging");
    let mut options = NativeOptions::default();

    // Set initial window size to avoid scrunched UI on first launch
    options.viewport = options
        .viewport
        .with_inner_size([1280.0, 800.0])
        .with_drag_and_drop(true);

    eframe::run_native(
        "Facemoji",
        options,
        Box::new(|cc| Ok(Box::new(FacemojiApp::new(cc)))),
    )
}
