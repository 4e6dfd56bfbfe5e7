//! FacemojiApp methods: background job handling, navigation and editing commands.

use std::path::PathBuf;

use egui::{ColorImage, Context as EguiContext, TextureHandle, TextureOptions};
use facemoji_core::{
    DetectionOutcome, DetectionRequest, EditError, Glyph, ImageId, ImageSource,
};
use facemoji_utils::is_supported_image_path;
use image::DynamicImage;
use log::{debug, info, warn};

use crate::core::{
    detection::{spawn_decode, start_detection},
    export,
    settings::persist_settings_with_feedback,
};
use crate::interaction::shortcuts::capture_shortcut_actions;
use crate::{FacemojiApp, JobMessage};

impl FacemojiApp {
    /// Drains finished background jobs.
    pub fn poll_worker(&mut self, ctx: &EguiContext) {
        let mut updated = false;
        while let Ok(message) = self.job_rx.try_recv() {
            self.handle_job_message(ctx, message);
            updated = true;
        }

        if updated {
            ctx.request_repaint();
        }
    }

    pub(crate) fn handle_job_message(&mut self, ctx: &EguiContext, message: JobMessage) {
        match message {
            JobMessage::DetectorReady(detector) => {
                self.set_detector(detector);
                if self.pending_detection.is_none() {
                    self.status_line = "Face detector ready.".to_owned();
                }
            }
            JobMessage::DetectorFailed { error } => {
                self.detector_loading = false;
                warn!("Unable to initialize YuNet model: {error}");
                self.show_error("Face detector unavailable", error);
            }
            JobMessage::ImageDecoded { image, result } => {
                self.decoding.remove(&image);
                match result {
                    Ok(pixels) => {
                        self.upload_texture(ctx, image, &pixels);
                        let request = self.session.on_image_loaded(image, pixels);
                        self.dispatch_detection(request);
                    }
                    Err(error) => self.show_error("Could not open image", error),
                }
            }
            JobMessage::DetectionFinished { ticket, result } => {
                if self.pending_detection == Some(ticket) {
                    self.pending_detection = None;
                }
                match self.session.apply_detection(ticket, result) {
                    DetectionOutcome::Applied(count) => {
                        self.last_error = None;
                        self.status_line = match count {
                            0 => "No faces found. Add stickers by hand.".to_owned(),
                            1 => "Covered 1 face.".to_owned(),
                            n => format!("Covered {n} faces."),
                        };
                    }
                    DetectionOutcome::Stale => {}
                    DetectionOutcome::Failed(error) => {
                        self.show_error("Face detection failed", error);
                    }
                }
            }
            JobMessage::ExportFinished { target, result } => {
                self.session.finish_saving();
                match result {
                    Ok(report) if report.failures.is_empty() => {
                        self.show_success(format!(
                            "Saved {} image(s) to {}",
                            report.written.len(),
                            target.display()
                        ));
                    }
                    Ok(report) => {
                        let details = report
                            .failures
                            .iter()
                            .map(|failure| format!("image {}: {}", failure.position, failure.error))
                            .collect::<Vec<_>>()
                            .join("; ");
                        self.show_error(
                            "Some images were not exported",
                            format!(
                                "{} saved to {}, {} failed ({details})",
                                report.written.len(),
                                target.display(),
                                report.failures.len()
                            ),
                        );
                    }
                    Err(error) => self.show_error("Export failed", error),
                }
            }
        }
    }

    /// Send a detection request to the loaded detector.
    pub(crate) fn dispatch_detection(&mut self, request: Option<DetectionRequest>) {
        let Some(request) = request else {
            return;
        };
        let Some(detector) = self.detector.clone() else {
            debug!("Detector not loaded; dropping request for {}", request.ticket.image);
            return;
        };
        self.pending_detection = Some(request.ticket);
        self.status_line = "Looking for faces...".to_owned();
        start_detection(request, detector, self.job_tx.clone());
    }

    fn upload_texture(&mut self, ctx: &EguiContext, image: ImageId, pixels: &DynamicImage) {
        let rgba = pixels.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        self.texture_seq += 1;
        let handle: TextureHandle = ctx.load_texture(
            format!("facemoji-image-{}", self.texture_seq),
            color,
            TextureOptions::LINEAR,
        );
        self.textures.insert(image, handle);
    }

    /// Replace the opened set with `paths`. Unsupported files are skipped.
    pub fn open_paths(&mut self, paths: Vec<PathBuf>) {
        let (supported, skipped): (Vec<_>, Vec<_>) = paths
            .into_iter()
            .partition(|path| is_supported_image_path(path));
        for path in &skipped {
            warn!("Skipping unsupported file {}", path.display());
        }
        if supported.is_empty() {
            self.show_error("Nothing opened", "Choose jpg, png, bmp or webp images.");
            return;
        }

        let sources = supported.into_iter().map(ImageSource::from_path).collect();
        let summary = self.session.open_images(sources);
        self.textures.clear();
        self.decoding.clear();
        self.pending_detection = None;
        info!("Opened {} image(s)", summary.accepted);

        if summary.dropped > 0 {
            self.show_error(
                "Too many images",
                format!(
                    "Only the first {} images were opened; {} dropped.",
                    summary.accepted, summary.dropped
                ),
            );
        } else {
            self.last_error = None;
            self.status_line = format!("Opened {} image(s).", summary.accepted);
        }
        self.activate_current();
    }

    /// Start loading the active image, or replay its load event when pixels are cached.
    pub fn activate_current(&mut self) {
        let Some(entry) = self.session.current() else {
            return;
        };
        let id = entry.id;
        match entry.pixels().cloned() {
            Some(pixels) => {
                let request = self.session.on_image_loaded(id, pixels);
                self.dispatch_detection(request);
            }
            None => {
                if self.decoding.insert(id) {
                    spawn_decode(id, entry.path(), self.job_tx.clone());
                }
            }
        }
    }

    pub fn next_image(&mut self) {
        if self.session.next_image() {
            self.activate_current();
        }
    }

    pub fn previous_image(&mut self) {
        if self.session.previous_image() {
            self.activate_current();
        }
    }

    pub fn select_image(&mut self, index: usize) {
        if self.session.select_image(index) {
            self.activate_current();
        }
    }

    /// Add a sticker wearing the armed glyph in the middle of the preview.
    pub fn add_sticker(&mut self) {
        let result = self.session.add_overlay(None).map(|_| ());
        self.report_edit(result);
    }

    /// Grow (positive) or shrink (negative) the selected sticker by whole resize steps.
    pub fn resize_selected(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        let delta = steps as f32 * self.settings.overlay.resize_step;
        let result = self.session.resize_selected(delta).map(|_| ());
        self.report_edit(result);
    }

    pub fn delete_selected(&mut self) {
        let result = self.session.delete_selected().map(|_| ());
        self.report_edit(result);
    }

    pub fn clear_stickers(&mut self) {
        let result = self.session.clear_current();
        self.report_edit(result);
    }

    pub fn undo(&mut self) {
        let result = self.session.undo().map(|_| ());
        self.report_edit(result);
    }

    pub fn redo(&mut self) {
        let result = self.session.redo().map(|_| ());
        self.report_edit(result);
    }

    /// Arm `glyph` for new stickers and re-glyph the selected one, if any.
    pub fn choose_glyph(&mut self, glyph: Glyph) {
        self.session.arm_glyph(glyph);
        let result = self.session.apply_armed_to_selection().map(|_| ());
        self.report_edit(result);
    }

    /// Arm the text typed into the custom glyph field.
    pub fn choose_custom_glyph(&mut self) {
        match Glyph::new(&self.custom_glyph_input) {
            Some(glyph) => {
                if !self.settings.overlay.palette.iter().any(|g| g == glyph.as_str()) {
                    self.settings.overlay.palette.push(glyph.as_str().to_owned());
                    if let Err(message) =
                        persist_settings_with_feedback(&self.settings, &self.settings_path)
                    {
                        self.last_error = Some(message);
                    }
                }
                self.custom_glyph_input.clear();
                self.choose_glyph(glyph);
            }
            None => self.report_edit(Err(EditError::EmptyGlyph)),
        }
    }

    fn report_edit(&mut self, result: Result<(), EditError>) {
        if let Err(err) = result {
            debug!("Edit rejected: {err}");
            self.last_error = Some(err.to_string());
        }
    }

    /// Compare the lock screen input against the configured secret.
    pub fn try_unlock(&mut self) {
        match self.gate.unlock(&self.secret_input) {
            Ok(session) => {
                self.access = Some(session);
                self.access_error = None;
            }
            Err(err) => {
                self.access_error = Some(err.to_string());
            }
        }
        self.secret_input.clear();
    }

    /// Handles keyboard shortcuts.
    pub fn handle_shortcuts(&mut self, ctx: &EguiContext) {
        let wants_text = ctx.wants_keyboard_input();
        let actions = capture_shortcut_actions(ctx, wants_text);

        if actions.undo {
            self.undo();
        }
        if actions.redo {
            self.redo();
        }
        if actions.delete {
            self.delete_selected();
        }
        self.resize_selected(actions.resize_steps);
        if actions.add {
            self.add_sticker();
        }
        if actions.next_image {
            self.next_image();
        }
        if actions.previous_image {
            self.previous_image();
        }
        if actions.save_all {
            export::export_all_dialog(self);
        }
    }

    /// Put an error in the status bar.
    pub fn show_error(&mut self, title: &str, message: impl Into<String>) {
        let message = message.into();
        warn!("{title}: {message}");
        self.status_line = title.to_owned();
        self.last_error = Some(message);
    }

    pub fn show_success(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.status_line = message;
        self.last_error = None;
    }
}
