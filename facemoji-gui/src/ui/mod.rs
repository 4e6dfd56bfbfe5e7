//! UI module organization for the Facemoji GUI.

pub mod login;
pub mod navigation;
pub mod palette;
pub mod preview;
pub mod status_bar;
