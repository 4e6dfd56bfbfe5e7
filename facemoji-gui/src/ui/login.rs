//! Lock screen shown while the shared-secret gate is closed.

use egui::{Align, CentralPanel, CornerRadius, Key, Layout, Margin, RichText, Stroke, TextEdit};

use crate::{FacemojiApp, theme};

/// Renders the password prompt. A correct secret unlocks the editor on the next frame.
pub fn show_login(app: &mut FacemojiApp, ctx: &egui::Context) {
    let palette = theme::palette();
    CentralPanel::default()
        .frame(egui::Frame::new().fill(palette.canvas))
        .show(ctx, |ui| {
            ui.with_layout(Layout::top_down(Align::Center), |ui| {
                ui.add_space(ui.available_height() * 0.25);
                egui::Frame::new()
                    .fill(palette.panel)
                    .stroke(Stroke::new(1.0, palette.outline))
                    .corner_radius(CornerRadius::same(20))
                    .inner_margin(Margin::symmetric(28, 24))
                    .show(ui, |ui| {
                        ui.set_width(320.0);
                        ui.vertical_centered(|ui| {
                            ui.heading(RichText::new("Facemoji").size(28.0).strong());
                            ui.label(
                                RichText::new("Enter the password to start editing.")
                                    .color(palette.subtle_text),
                            );
                            ui.add_space(12.0);

                            let response = ui.add(
                                TextEdit::singleline(&mut app.secret_input)
                                    .password(true)
                                    .hint_text("Password")
                                    .desired_width(f32::INFINITY),
                            );
                            let submitted = response.lost_focus()
                                && ui.input(|input| input.key_pressed(Key::Enter));

                            if let Some(error) = &app.access_error {
                                ui.colored_label(palette.danger, error);
                            }
                            ui.add_space(8.0);

                            if ui.button("Unlock").clicked() || submitted {
                                app.try_unlock();
                            }
                        });
                    });
            });
        });
}
