//! Harbor theme — dark, flat, square corners.

use egui::{Color32, Margin, Rounding, Stroke, Style, Visuals};

/// The palette used by every harbor surface. Rows, headers and the marked
/// (copy/cut) highlight share these values so the list view and the preview
/// pane look identical.
pub struct Palette;

impl Palette {
    pub const BACKGROUND: Color32 = Color32::from_rgb(45, 45, 45);
    pub const TEXT: Color32 = Color32::from_rgb(245, 245, 245);
    pub const SELECTED_BG: Color32 = Color32::from_rgb(64, 64, 64);
    pub const SELECTED_TEXT: Color32 = Color32::from_rgb(245, 245, 245);
    pub const HEADER_BG: Color32 = Color32::from_rgb(36, 36, 36);
    pub const HEADER_TEXT: Color32 = Color32::from_rgb(245, 245, 245);
    pub const MARKED_BG: Color32 = Color32::from_rgb(50, 70, 90);
    pub const HOVER_BG: Color32 = Color32::from_rgb(55, 55, 55);
    pub const DIM_TEXT: Color32 = Color32::from_rgb(170, 170, 170);
    pub const ERROR: Color32 = Color32::from_rgb(230, 90, 90);
    pub const OUTLINE: Color32 = Color32::from_rgb(70, 70, 70);
}

/// Theme configuration for harbor windows.
pub struct HarborTheme {
    pub font_size_body: f32,
    pub font_size_small: f32,
    pub window_padding: f32,
    pub item_spacing: f32,
}

impl Default for HarborTheme {
    fn default() -> Self {
        Self {
            font_size_body: 14.0,
            font_size_small: 11.0,
            window_padding: 8.0,
            item_spacing: 4.0,
        }
    }
}

impl HarborTheme {
    /// Apply the harbor theme to an egui context.
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = Style::default();

        let mut visuals = Visuals::dark();
        visuals.window_fill = Palette::BACKGROUND;
        visuals.panel_fill = Palette::BACKGROUND;
        visuals.faint_bg_color = Palette::HOVER_BG;
        visuals.extreme_bg_color = Palette::HEADER_BG;
        visuals.window_rounding = Rounding::ZERO;
        visuals.menu_rounding = Rounding::ZERO;
        visuals.window_stroke = Stroke::new(1.0, Palette::OUTLINE);
        visuals.selection.bg_fill = Palette::SELECTED_BG;
        visuals.selection.stroke = Stroke::new(1.0, Palette::TEXT);

        let flat = |ws: &mut egui::style::WidgetVisuals| {
            ws.rounding = Rounding::ZERO;
            ws.bg_stroke = Stroke::new(1.0, Palette::OUTLINE);
        };
        flat(&mut visuals.widgets.noninteractive);
        flat(&mut visuals.widgets.inactive);
        flat(&mut visuals.widgets.hovered);
        flat(&mut visuals.widgets.active);
        flat(&mut visuals.widgets.open);

        style.visuals = visuals;
        style.spacing.window_margin = Margin::same(self.window_padding);
        style.spacing.item_spacing = egui::vec2(self.item_spacing, self.item_spacing);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);

        ctx.set_style(style);
    }
}

/// Menu bar container: header background with a 1px bottom outline.
pub fn menu_bar<R>(
    ui: &mut egui::Ui,
    add_contents: impl FnOnce(&mut egui::Ui) -> R,
) -> egui::InnerResponse<R> {
    let frame_resp = egui::Frame::none()
        .fill(Palette::HEADER_BG)
        .stroke(Stroke::new(1.0, Palette::OUTLINE))
        .inner_margin(Margin::symmetric(4.0, 2.0))
        .show(ui, |ui| ui.horizontal(add_contents).inner);
    egui::InnerResponse {
        inner: frame_resp.inner,
        response: frame_resp.response,
    }
}

/// Status bar along the bottom edge.
pub fn status_bar(ui: &mut egui::Ui, text: &str) {
    egui::Frame::none()
        .fill(Palette::HEADER_BG)
        .stroke(Stroke::new(1.0, Palette::OUTLINE))
        .inner_margin(Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(Palette::TEXT));
        });
}
