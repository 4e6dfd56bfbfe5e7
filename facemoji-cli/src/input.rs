//! Input collection.

use std::path::{Path, PathBuf};

use anyhow::Result;
use facemoji_utils::{SUPPORTED_EXTENSIONS, is_supported_image_path};
use log::{debug, warn};
use walkdir::WalkDir;

/// Collect all image paths from a file or directory, sorted.
pub fn collect_images(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!(
            "input path is neither file nor directory: {}",
            path.display()
        );
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        if is_supported_image_path(entry.path()) {
            images.push(entry.path().to_path_buf());
        } else {
            debug!("Skipping non-image file {}", entry.path().display());
        }
    }
    images.sort();
    Ok(images)
}

/// [`collect_images`], failing when nothing usable is found and truncating to `max_images`.
pub fn collect_targets(path: &Path, max_images: usize) -> Result<Vec<PathBuf>> {
    let mut images = collect_images(path)?;
    if images.is_empty() {
        anyhow::bail!(
            "no images found at {} (supported extensions: {})",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        );
    }
    if images.len() > max_images {
        warn!(
            "Found {} images; only the first {max_images} will be processed",
            images.len()
        );
        images.truncate(max_images);
    }
    Ok(images)
}
