//! Right panel: glyph palette and sticker actions.

use egui::{Button, CornerRadius, RichText, Stroke, TextEdit, Ui, vec2};
use facemoji_core::Glyph;

use crate::{FacemojiApp, theme};

const GLYPH_COLUMNS: usize = 4;

impl FacemojiApp {
    /// Renders the glyph palette and the buttons for every sticker edit.
    pub fn show_palette_panel(&mut self, ui: &mut Ui) {
        let palette = theme::palette();
        ui.heading("Stickers");
        ui.add_space(8.0);

        let armed = self.session.armed_glyph().clone();
        let mut chosen = None;
        let cell = ((ui.available_width() - 8.0 * (GLYPH_COLUMNS as f32 - 1.0))
            / GLYPH_COLUMNS as f32)
            .max(32.0);
        egui::Grid::new("glyph_palette_grid")
            .num_columns(GLYPH_COLUMNS)
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                for (index, text) in self.settings.overlay.palette.iter().enumerate() {
                    let Some(glyph) = Glyph::new(text) else {
                        continue;
                    };
                    let is_armed = glyph == armed;
                    let button = Button::new(RichText::new(glyph.as_str()).size(26.0))
                        .min_size(vec2(cell, cell))
                        .corner_radius(CornerRadius::same(12))
                        .stroke(if is_armed {
                            Stroke::new(2.0, palette.accent)
                        } else {
                            Stroke::new(1.0, palette.outline)
                        });
                    if ui.add(button).clicked() {
                        chosen = Some(glyph);
                    }
                    if (index + 1) % GLYPH_COLUMNS == 0 {
                        ui.end_row();
                    }
                }
            });
        if let Some(glyph) = chosen {
            self.choose_glyph(glyph);
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let response = ui.add(
                TextEdit::singleline(&mut self.custom_glyph_input)
                    .hint_text("Any emoji")
                    .desired_width(ui.available_width() - 70.0),
            );
            let submitted =
                response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
            if ui.button("Use").clicked() || submitted {
                self.choose_custom_glyph();
            }
        });

        ui.add_space(12.0);
        ui.separator();
        ui.add_space(8.0);

        let image = self.session.current_id();
        let has_image = image.is_some();
        let selected = self.session.selected_overlay();
        let btn_width = (ui.available_width() - 8.0) / 2.0;
        let size = vec2(btn_width, 30.0);

        egui::Grid::new("sticker_actions_grid")
            .num_columns(2)
            .spacing([8.0, 8.0])
            .show(ui, |ui| {
                if ui
                    .add_enabled(has_image, Button::new("Add (A)").min_size(size))
                    .clicked()
                {
                    self.add_sticker();
                }
                if ui
                    .add_enabled(selected.is_some(), Button::new("Delete (Del)").min_size(size))
                    .clicked()
                {
                    self.delete_selected();
                }
                ui.end_row();

                if ui
                    .add_enabled(selected.is_some(), Button::new("Bigger (+)").min_size(size))
                    .clicked()
                {
                    self.resize_selected(1);
                }
                if ui
                    .add_enabled(selected.is_some(), Button::new("Smaller (-)").min_size(size))
                    .clicked()
                {
                    self.resize_selected(-1);
                }
                ui.end_row();

                let can_undo = image.is_some_and(|id| self.session.store().can_undo(id));
                let can_redo = image.is_some_and(|id| self.session.store().can_redo(id));
                if ui
                    .add_enabled(can_undo, Button::new("Undo").min_size(size))
                    .clicked()
                {
                    self.undo();
                }
                if ui
                    .add_enabled(can_redo, Button::new("Redo").min_size(size))
                    .clicked()
                {
                    self.redo();
                }
                ui.end_row();
            });

        ui.add_space(8.0);
        let has_stickers = !self.session.current_overlays().is_empty();
        if ui
            .add_enabled(has_stickers, Button::new("Remove all stickers"))
            .clicked()
        {
            self.clear_stickers();
        }

        ui.add_space(12.0);
        if let (Some(image), Some(selected)) = (image, selected)
            && let Some(overlay) = self.session.store().overlay(image, selected)
        {
            ui.label(
                RichText::new(format!(
                    "{} at ({:.0}, {:.0}), size {:.0}",
                    overlay.glyph, overlay.x, overlay.y, overlay.size
                ))
                .color(palette.subtle_text),
            );
        } else {
            ui.label(
                RichText::new("Click a sticker to select it, drag to move it.")
                    .color(palette.subtle_text),
            );
        }
    }
}
