//! Pointer and keyboard handling for the preview.

pub mod coords;
pub mod overlay_drag;
pub mod shortcuts;
