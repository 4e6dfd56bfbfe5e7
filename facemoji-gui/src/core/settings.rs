//! Settings persistence and loading.

use anyhow::{Context as AnyhowContext, Result};
use facemoji_utils::config::AppSettings;
use log::warn;
use std::path::Path;

/// Loads application settings from a file, or returns default settings if loading fails.
pub fn load_settings(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }
    match AppSettings::load_from_path(path) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(
                "Failed to load settings from {}: {err:?}. Falling back to defaults.",
                path.display()
            );
            AppSettings::default()
        }
    }
}

/// Saves the current settings to the JSON file.
pub fn persist_settings(settings: &AppSettings, settings_path: &Path) -> Result<()> {
    settings
        .save_to_path(settings_path)
        .with_context(|| format!("failed to write settings to {}", settings_path.display()))
}

/// Persists the current settings to disk, returning a user-facing message on failure.
pub fn persist_settings_with_feedback(
    settings: &AppSettings,
    settings_path: &Path,
) -> Result<(), String> {
    persist_settings(settings, settings_path).map_err(|err| {
        let message = format!("Failed to persist settings: {err}");
        warn!("{message}");
        message
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_broken_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent.json");
        assert_eq!(load_settings(&missing).upload.max_images, 10);

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").expect("write");
        assert_eq!(load_settings(&broken).overlay.default_size, 64.0);
    }

    #[test]
    fn persisted_settings_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config").join("facemoji_settings.json");
        let mut settings = AppSettings::default();
        settings.overlay.default_glyph = "🐱".into();
        persist_settings(&settings, &path).expect("persist");
        assert_eq!(load_settings(&path).overlay.default_glyph, "🐱");
    }
}
