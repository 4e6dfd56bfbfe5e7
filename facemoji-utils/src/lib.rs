//! Common helpers shared across Facemoji crates.

/// Application configuration and settings management.
pub mod config;
/// Image loading, resizing, and tensor conversion.
pub mod image_utils;
/// Image encoding helpers for exports.
pub mod output;
/// Instrumentation helpers for optional performance tracing.
pub mod telemetry;

use std::path::Path;

use anyhow::Result;
use log::LevelFilter;

pub use image_utils::{
    SUPPORTED_EXTENSIONS, is_supported_image_path, load_image, resize_image, rgb_to_bgr_chw,
};
pub use output::{ImageFormatHint, OutputOptions, PngCompression, encode_image, write_bytes};
pub use telemetry::{TimingGuard, configure as configure_telemetry, timing_guard};

/// Initialize logging once for CLI and GUI environments.
///
/// Respects `RUST_LOG` when set, otherwise falls back to `default_filter`.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module("facemoji::telemetry", LevelFilter::Trace);

    if builder.try_init().is_err() {
        // Logger already initialized; nothing to do.
    }
    Ok(())
}

/// Validate that a path exists and resolve it to an absolute path.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}
