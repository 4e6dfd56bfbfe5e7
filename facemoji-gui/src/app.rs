//! Construction of the editor and its per-frame update loop.

use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::{Arc, mpsc},
};

use eframe::{App, CreationContext, Frame};
use egui::Context as EguiContext;
use egui_extras::{Size, StripBuilder};
use facemoji_core::{AccessGate, EditorSession, FaceDetector, GlyphPainter};
use facemoji_utils::{config::default_settings_path, configure_telemetry};
use log::info;

use crate::core::{
    detection::{configured_model_path, spawn_detector_load},
    settings::load_settings,
};
use crate::{FacemojiApp, theme, ui};

impl FacemojiApp {
    /// Creates the app with the settings file in the platform config directory.
    pub fn new(cc: &CreationContext<'_>) -> Self {
        Self::create(&cc.egui_ctx, default_settings_path())
    }

    /// Creates the app with a specific settings path and starts loading the model.
    pub fn create(ctx: &EguiContext, settings_path: PathBuf) -> Self {
        let mut app = Self::build(ctx, settings_path);
        match configured_model_path(&app.settings) {
            Some(path) => {
                info!("Loading YuNet model from {}", path.display());
                app.detector_loading = true;
                app.status_line = "Loading face detector...".to_owned();
                spawn_detector_load(app.settings.clone(), app.job_tx.clone());
            }
            None => {
                app.status_line =
                    "Model not found. Stickers can still be placed by hand.".to_owned();
            }
        }
        app
    }

    /// Creates the app without touching the model. Detection stays off until
    /// [`FacemojiApp::set_detector`] is called.
    pub fn without_detector(ctx: &EguiContext, settings_path: PathBuf) -> Self {
        let mut app = Self::build(ctx, settings_path);
        app.status_line = "Face detection disabled.".to_owned();
        app
    }

    fn build(ctx: &EguiContext, settings_path: PathBuf) -> Self {
        theme::apply(ctx);

        info!("Loading GUI settings from {}", settings_path.display());
        let settings = load_settings(&settings_path);
        configure_telemetry(
            settings.telemetry.enabled,
            settings.telemetry.level_filter(),
        );
        if settings.telemetry.enabled {
            info!(
                "Telemetry logging enabled (level={:?})",
                settings.telemetry.level_filter()
            );
        }

        let gate = AccessGate::from_settings(&settings.access);
        let access = gate.open_session();
        let session = EditorSession::new(&settings);
        let (job_tx, job_rx) = mpsc::channel();

        Self {
            session,
            gate,
            access,
            secret_input: String::new(),
            access_error: None,
            detector: None,
            detector_loading: false,
            painter: None,
            job_tx,
            job_rx,
            textures: HashMap::new(),
            decoding: HashSet::new(),
            pending_detection: None,
            status_line: String::new(),
            last_error: None,
            custom_glyph_input: String::new(),
            texture_seq: 0,
            settings,
            settings_path,
        }
    }

    /// Install a ready detector directly, as a finished model load would.
    pub fn set_detector(&mut self, detector: Arc<dyn FaceDetector>) {
        self.detector_loading = false;
        self.detector = Some(detector);
        let request = self.session.set_detector_ready(true);
        self.dispatch_detection(request);
    }

    /// Replace the glyph painter used for exports.
    pub fn set_painter(&mut self, painter: Arc<dyn GlyphPainter>) {
        self.painter = Some(painter);
    }

    /// `true` while any background job is outstanding.
    pub fn is_busy(&self) -> bool {
        self.detector_loading
            || !self.decoding.is_empty()
            || self.pending_detection.is_some()
            || self.session.is_saving()
    }

    /// Drop an expired access session and send the user back to the lock screen.
    pub(crate) fn enforce_access_expiry(&mut self) {
        if self.access.is_some_and(|session| !session.is_valid()) {
            info!("Editor session expired");
            self.access = None;
            self.secret_input.clear();
            self.access_error = Some("Session expired. Enter the password again.".to_owned());
        }
    }
}

impl App for FacemojiApp {
    fn update(&mut self, ctx: &EguiContext, _frame: &mut Frame) {
        self.poll_worker(ctx);
        self.enforce_access_expiry();

        if self.access.is_none() {
            ui::login::show_login(self, ctx);
            return;
        }

        self.show_status_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let palette = theme::palette();
            StripBuilder::new(ui)
                .size(Size::exact(260.0)) // Images
                .size(Size::remainder()) // Preview
                .size(Size::exact(300.0)) // Stickers
                .horizontal(|mut strip| {
                    strip.cell(|ui| {
                        egui::Frame::new()
                            .fill(palette.panel)
                            .inner_margin(egui::Margin::symmetric(16, 18))
                            .stroke(egui::Stroke::new(1.0, palette.outline))
                            .show(ui, |ui| {
                                self.show_navigation_panel(ui);
                            });
                    });
                    strip.cell(|ui| {
                        egui::Frame::new()
                            .fill(palette.canvas)
                            .inner_margin(egui::Margin::symmetric(16, 16))
                            .show(ui, |ui| {
                                self.show_preview(ui, ctx);
                            });
                    });
                    strip.cell(|ui| {
                        egui::Frame::new()
                            .fill(palette.panel)
                            .inner_margin(egui::Margin::symmetric(16, 18))
                            .stroke(egui::Stroke::new(1.0, palette.outline))
                            .show(ui, |ui| {
                                egui::ScrollArea::vertical()
                                    .auto_shrink([false, false])
                                    .show(ui, |ui| self.show_palette_panel(ui));
                            });
                    });
                });
        });

        self.handle_shortcuts(ctx);

        if self.is_busy() {
            ctx.request_repaint();
        } else if let Some(expiry) = self.access.and_then(|session| session.expires_at()) {
            ctx.request_repaint_after(expiry.saturating_duration_since(std::time::Instant::now()));
        }
    }
}
