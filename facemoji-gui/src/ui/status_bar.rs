//! Status bar UI components for the Facemoji GUI.

use egui::{
    Align, Button, Color32, CornerRadius, Layout, Margin, Response, RichText, Spinner, Stroke,
    TopBottomPanel, Ui, vec2,
};
use facemoji_utils::SUPPORTED_EXTENSIONS;

use crate::core::export;
use crate::{FacemojiApp, theme};

impl FacemojiApp {
    /// Renders the top status bar with quick stats and actions.
    pub fn show_status_bar(&mut self, ctx: &egui::Context) {
        let palette = theme::palette();
        TopBottomPanel::top("facemoji_status_bar")
            .frame(
                egui::Frame::new()
                    .fill(palette.panel_dark)
                    .stroke(Stroke::new(1.0, palette.outline))
                    .inner_margin(Margin::symmetric(20, 14)),
            )
            .show(ctx, |ui| {
                ui.vertical(|ui| {
                    ui.spacing_mut().item_spacing.y = 6.0;
                    ui.horizontal(|ui| {
                        ui.heading(RichText::new("Facemoji").size(26.0).strong());
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            self.draw_status_badge(ui, palette);
                        });
                    });

                    ui.label(RichText::new(&self.status_line).color(palette.subtle_text));

                    if let Some(err) = &self.last_error {
                        ui.colored_label(palette.danger, err);
                    } else if self.session.images().is_empty() {
                        ui.label(
                            RichText::new("Open some photos to start hiding faces.")
                                .color(palette.subtle_text),
                        );
                    }

                    ui.add_space(6.0);
                    self.draw_status_chips(ui, palette);
                    ui.add_space(8.0);
                    self.draw_quick_actions(ui, palette);
                });
            });
    }

    fn draw_status_badge(&self, ui: &mut Ui, palette: theme::Palette) {
        let (label, color) = if self.session.is_saving() {
            ("Saving...", palette.accent)
        } else if self.pending_detection.is_some() {
            ("Detecting...", palette.accent)
        } else if self.detector_loading {
            ("Loading model...", palette.subtle_text)
        } else if self.detector.is_none() {
            ("Manual only", palette.warning)
        } else {
            ("Ready", palette.success)
        };

        egui::Frame::new()
            .fill(palette.panel_light)
            .stroke(Stroke::new(1.0, color))
            .corner_radius(CornerRadius::same(64))
            .inner_margin(Margin::symmetric(14, 6))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if self.is_busy() {
                        ui.add(Spinner::new().size(16.0));
                    }
                    ui.label(RichText::new(label).size(15.0).strong());
                });
            });
    }

    fn draw_status_chips(&self, ui: &mut Ui, palette: theme::Palette) {
        ui.horizontal_wrapped(|ui| {
            let opened = self.session.images().len();
            let position = self
                .session
                .current_index()
                .map(|index| format!("Image {}/{opened}", index + 1))
                .unwrap_or_else(|| "No images".to_owned());
            status_chip(
                ui,
                palette,
                position,
                if opened == 0 {
                    palette.subtle_text
                } else {
                    palette.accent
                },
            );

            let stickers = self.session.current_overlays().len();
            status_chip(ui, palette, format!("Stickers {stickers}"), palette.success);

            let selected = self.session.selected_overlay().is_some();
            status_chip(
                ui,
                palette,
                if selected { "1 selected" } else { "None selected" },
                if selected {
                    palette.selection
                } else {
                    palette.subtle_text
                },
            );
            status_chip(
                ui,
                palette,
                format!("Glyph {}", self.session.armed_glyph()),
                palette.accent,
            );
        });
    }

    fn draw_quick_actions(&mut self, ui: &mut Ui, palette: theme::Palette) {
        ui.horizontal_wrapped(|ui| {
            let subtitle = format!("Up to {}", self.settings.upload.max_images);
            if quick_action_button(ui, palette, "Open Images", &subtitle, true).clicked() {
                self.open_images_dialog();
            }

            let has_image = self.session.current().is_some();
            let idle = !self.session.is_saving();
            if quick_action_button(
                ui,
                palette,
                "Save Image",
                "Current image only",
                has_image && idle,
            )
            .clicked()
            {
                export::export_current_dialog(self);
            }

            let count = self.session.images().len();
            let subtitle = format!("{count} image(s) as zip");
            if quick_action_button(ui, palette, "Download All", &subtitle, count > 0 && idle)
                .clicked()
            {
                export::export_all_dialog(self);
            }
        });
    }

    /// Pick images with the native file dialog.
    pub fn open_images_dialog(&mut self) {
        use rfd::FileDialog;

        if let Some(paths) = FileDialog::new()
            .add_filter("Images", &SUPPORTED_EXTENSIONS)
            .pick_files()
        {
            self.open_paths(paths);
        }
    }
}

fn quick_action_button(
    ui: &mut Ui,
    palette: theme::Palette,
    title: &str,
    subtitle: &str,
    enabled: bool,
) -> Response {
    let text = format!("{title}\n{subtitle}");
    ui.add_enabled(
        enabled,
        Button::new(RichText::new(text).size(15.0))
            .wrap()
            .min_size(vec2(150.0, 56.0))
            .fill(if enabled {
                palette.panel_light
            } else {
                palette.panel_dark
            })
            .stroke(Stroke::new(1.0, palette.outline))
            .corner_radius(CornerRadius::same(16)),
    )
}

/// Rounded label with an accent border.
pub(crate) fn status_chip(
    ui: &mut Ui,
    palette: theme::Palette,
    text: impl Into<String>,
    accent: Color32,
) {
    egui::Frame::new()
        .fill(palette.panel_dark)
        .stroke(Stroke::new(1.0, accent))
        .corner_radius(CornerRadius::same(24))
        .inner_margin(Margin::symmetric(12, 4))
        .show(ui, |ui| {
            ui.label(
                RichText::new(text.into())
                    .size(14.0)
                    .color(palette.subtle_text),
            );
        });
}
