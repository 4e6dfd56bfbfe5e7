//! Core functionality modules for the Facemoji GUI application.
//!
//! - `detection`: model loading, image decoding and detection jobs
//! - `export`: single-image and zip exports
//! - `settings`: settings persistence and loading

pub mod detection;
pub mod export;
pub mod settings;
