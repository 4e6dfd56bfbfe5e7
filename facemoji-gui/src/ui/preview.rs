//! Preview panel: the active image, its stickers and pointer interaction.

use egui::{
    Color32, CornerRadius, CursorIcon, FontId, Margin, Rect, RichText, Spinner, Stroke,
    StrokeKind, Ui, vec2,
};
use facemoji_core::ImageId;
use log::debug;

use crate::interaction::{
    coords::{galley_baseline, glyph_origin, overlay_screen_rect, preview_extent},
    overlay_drag::handle_overlay_drag,
};
use crate::{FacemojiApp, PointerSnapshot, PreviewSpace, theme};

impl FacemojiApp {
    /// Renders the main image preview panel.
    pub fn show_preview(&mut self, ui: &mut Ui, ctx: &egui::Context) {
        self.accept_dropped_files(ctx);

        let palette = theme::palette();
        egui::Frame::new()
            .fill(palette.panel_dark)
            .stroke(Stroke::new(1.0, palette.outline))
            .corner_radius(CornerRadius::same(24))
            .inner_margin(Margin::symmetric(18, 18))
            .show(ui, |ui| {
                ui.set_min_size(ui.available_size());
                self.render_preview_area(ui, ctx, palette);
            });
    }

    fn render_preview_area(&mut self, ui: &mut Ui, ctx: &egui::Context, palette: theme::Palette) {
        let Some(entry) = self.session.current() else {
            ui.vertical_centered(|ui| {
                ui.add_space(64.0);
                ui.heading("Drop photos here or pick some with Open Images.");
                ui.label("Faces are covered automatically once the detector is ready.");
            });
            return;
        };
        let id = entry.id;
        let label = entry.label().to_owned();
        let current_display = entry.display_extent();
        let (Some(natural), Some(texture)) = (entry.natural_extent(), self.textures.get(&id).cloned())
        else {
            ui.vertical_centered(|ui| {
                ui.add_space(64.0);
                if self.decoding.contains(&id) {
                    ui.add(Spinner::new().size(28.0));
                    ui.label(RichText::new(format!("Loading {label}...")).size(16.0));
                } else {
                    ui.label(RichText::new(format!("{label} could not be shown.")).size(16.0));
                }
            });
            return;
        };

        let Some(fitted) = preview_extent(natural, ui.available_size()) else {
            return;
        };
        // Rescaling mid-drag would move the grabbed sticker away from the pointer.
        if !self.session.store().drag_state().is_dragging()
            && current_display != Some(fitted)
            && let Err(err) = self.session.set_display_extent(id, fitted)
        {
            debug!("Could not resize preview for {id}: {err}");
        }
        let display = self
            .session
            .current()
            .and_then(|entry| entry.display_extent())
            .unwrap_or(fitted);
        let scaled = vec2(display.width, display.height);

        ui.centered_and_justified(|ui| {
            let response = ui.add(egui::Image::new(&texture).fit_to_exact_size(scaled));
            let image_rect = Rect::from_center_size(response.rect.center(), scaled);
            let space = PreviewSpace::new(image_rect);

            let pointer = PointerSnapshot::capture(ctx);
            if handle_overlay_drag(self.session.store_mut(), id, &pointer, &space) {
                ctx.set_cursor_icon(CursorIcon::Grabbing);
            } else if let Some(pos) = pointer.pos
                && image_rect.contains(pos)
                && self
                    .session
                    .store()
                    .hit_test(id, space.to_display(pos))
                    .is_some()
            {
                ctx.set_cursor_icon(CursorIcon::Grab);
            }

            self.paint_overlays(ui, id, &space, palette);

            if self.pending_detection.is_some_and(|ticket| ticket.image == id) {
                let badge = Rect::from_min_size(image_rect.left_top() + vec2(12.0, 12.0), vec2(24.0, 24.0));
                ui.put(badge, Spinner::new().size(20.0));
            }
        });
    }

    fn paint_overlays(&self, ui: &Ui, image: ImageId, space: &PreviewSpace, palette: theme::Palette) {
        let painter = ui.painter_at(space.rect);
        let selected = self.session.store().selected_on(image);
        let overlays = self.session.store().overlays(image).unwrap_or_default();

        for overlay in overlays.iter() {
            let rect = overlay_screen_rect(overlay, space);
            let galley = ui.fonts(|fonts| {
                fonts.layout_no_wrap(
                    overlay.glyph.to_string(),
                    FontId::proportional(overlay.size),
                    Color32::WHITE,
                )
            });
            let origin = glyph_origin(overlay, space, galley_baseline(&galley));
            painter.galley(origin, galley, Color32::WHITE);
            if selected == Some(overlay.id) {
                painter.rect_stroke(
                    rect,
                    4.0,
                    Stroke::new(2.0, palette.selection),
                    StrokeKind::Outside,
                );
            }
        }
    }

    /// Opens files dropped onto the window.
    fn accept_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }
        ctx.input_mut(|input| input.raw.dropped_files.clear());
        let paths: Vec<_> = dropped.into_iter().filter_map(|file| file.path).collect();
        if !paths.is_empty() {
            self.open_paths(paths);
        }
    }
}
