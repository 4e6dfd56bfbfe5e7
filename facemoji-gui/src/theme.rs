//! Colours and widget styling for the editor.

use egui::{Color32, Context, Stroke, Visuals, vec2};

/// Colours shared by the panels, the preview and the status bar.
#[derive(Clone, Copy)]
pub struct Palette {
    /// Behind the preview image.
    pub canvas: Color32,
    pub panel: Color32,
    pub panel_dark: Color32,
    pub panel_light: Color32,
    /// Sunflower yellow used for the armed glyph and primary buttons.
    pub accent: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub subtle_text: Color32,
    pub outline: Color32,
    /// Frame drawn around the selected sticker.
    pub selection: Color32,
}

const NIGHT: Palette = Palette {
    canvas: Color32::from_rgb(16, 14, 22),
    panel: Color32::from_rgb(30, 26, 38),
    panel_dark: Color32::from_rgb(20, 17, 27),
    panel_light: Color32::from_rgb(52, 45, 66),
    accent: Color32::from_rgb(255, 196, 61),
    success: Color32::from_rgb(120, 220, 160),
    warning: Color32::from_rgb(255, 170, 100),
    danger: Color32::from_rgb(255, 110, 130),
    subtle_text: Color32::from_rgb(200, 194, 214),
    outline: Color32::from_rgba_premultiplied(71, 62, 88, 150),
    selection: Color32::from_rgb(96, 190, 255),
};

const TEXT: Color32 = Color32::from_rgb(240, 236, 246);

pub fn palette() -> Palette {
    NIGHT
}

impl Palette {
    /// Dark visuals with buttons tinted by the accent on hover and press.
    fn visuals(self) -> Visuals {
        let mut visuals = Visuals::dark();
        visuals.override_text_color = Some(TEXT);
        visuals.panel_fill = self.panel;
        visuals.extreme_bg_color = self.canvas;

        let widgets = &mut visuals.widgets;
        widgets.noninteractive.bg_fill = self.panel_dark;
        widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.subtle_text);
        widgets.inactive.bg_fill = self.panel;
        widgets.inactive.bg_stroke = Stroke::new(1.0, self.outline);
        widgets.hovered.bg_fill = self.panel_light;
        widgets.hovered.bg_stroke = Stroke::new(1.0, self.accent.gamma_multiply(0.5));
        widgets.active.bg_fill = self.panel_light;
        widgets.active.bg_stroke = Stroke::new(1.0, self.accent);

        // Text selection in the password and custom glyph fields.
        visuals.selection.bg_fill = self.accent;
        visuals.selection.stroke = Stroke::new(1.5, self.panel_dark);
        visuals
    }
}

/// Install the editor's spacing and visuals on `ctx`.
pub fn apply(ctx: &Context) {
    let palette = palette();
    ctx.style_mut(|style| {
        style.spacing.item_spacing = vec2(10.0, 8.0);
        style.spacing.button_padding = vec2(12.0, 7.0);
        style.visuals = palette.visuals();
    });
}
