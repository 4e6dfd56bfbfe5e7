//! Left panel listing the opened images.

use egui::{Align, Layout, RichText, ScrollArea, Ui};

use crate::{FacemojiApp, theme};

impl FacemojiApp {
    /// Renders the image list with previous/next controls.
    pub fn show_navigation_panel(&mut self, ui: &mut Ui) {
        let palette = theme::palette();
        ui.heading("Images");
        ui.add_space(8.0);

        let count = self.session.images().len();
        let current = self.session.current_index();
        ui.horizontal(|ui| {
            let has_previous = current.is_some_and(|index| index > 0);
            if ui
                .add_enabled(has_previous, egui::Button::new("◀ Previous"))
                .clicked()
            {
                self.previous_image();
            }
            let has_next = current.is_some_and(|index| index + 1 < count);
            if ui
                .add_enabled(has_next, egui::Button::new("Next ▶"))
                .clicked()
            {
                self.next_image();
            }
        });
        ui.add_space(8.0);

        let can_redetect = self.detector.is_some()
            && self.pending_detection.is_none()
            && self.session.current().is_some_and(|entry| entry.pixels().is_some());
        if ui
            .add_enabled(can_redetect, egui::Button::new("Detect faces again"))
            .on_hover_text("Replaces the stickers on this image")
            .clicked()
            && let Some(id) = self.session.current_id()
        {
            let request = self.session.request_detection(id);
            self.dispatch_detection(request);
        }

        ui.add_space(12.0);
        ui.separator();
        ui.add_space(8.0);

        if count == 0 {
            ui.label(
                RichText::new("Drop photos here or use Open Images.").color(palette.subtle_text),
            );
            return;
        }

        let mut clicked = None;
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (index, entry) in self.session.images().iter().enumerate() {
                    let stickers = self
                        .session
                        .store()
                        .overlays(entry.id)
                        .map(|list| list.len())
                        .unwrap_or(0);
                    ui.horizontal(|ui| {
                        let label = format!("{}. {}", index + 1, entry.label());
                        if ui
                            .selectable_label(current == Some(index), label)
                            .clicked()
                        {
                            clicked = Some(index);
                        }
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            let color = if stickers > 0 {
                                palette.success
                            } else {
                                palette.subtle_text
                            };
                            ui.label(RichText::new(stickers.to_string()).color(color));
                        });
                    });
                }
            });

        if let Some(index) = clicked {
            self.select_image(index);
        }
    }
}
