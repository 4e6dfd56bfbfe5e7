//! Desktop editor for placing emoji stickers over faces (library).

pub mod app;
pub mod app_impl;
pub mod core;
pub mod interaction;
pub mod theme;
pub mod types;
pub mod ui;

pub use types::*;
