use egui::{
    Color32, CornerRadius, FontId, Margin, Shadow, Spacing, Stroke, Style, TextStyle, Vec2, Visuals,
};

pub const PRIMARY_COLOR: Color32 = Color32::from_rgb(203, 166, 247);

// Timeline palette
pub const TIMELINE_BACKGROUND: Color32 = Color32::from_rgb(17, 17, 27);
pub const GRID_MAJOR: Color32 = Color32::from_rgb(49, 50, 68);
pub const GRID_MINOR: Color32 = Color32::from_rgb(30, 30, 46);
pub const TRACK_SEPARATOR: Color32 = Color32::from_rgb(49, 50, 68);
pub const TRACK_SELECTED: Color32 = Color32::from_rgba_premultiplied(7, 9, 13, 13);
pub const PLAYHEAD_COLOR: Color32 = Color32::from_rgb(243, 139, 168);
pub const LOOP_RANGE: Color32 = Color32::from_rgba_premultiplied(30, 25, 37, 38);
pub const LOOP_BORDER: Color32 = Color32::from_rgb(203, 166, 247);
pub const CLIP_DEFAULT: Color32 = Color32::from_rgb(137, 180, 250);
pub const CLIP_SELECTED: Color32 = Color32::from_rgb(249, 226, 175);
pub const CLIP_BORDER: Color32 = Color32::from_rgba_premultiplied(51, 51, 51, 51);
pub const CLIP_LABEL: Color32 = Color32::from_rgb(205, 214, 244);
pub const NOTE_PREVIEW: Color32 = Color32::from_rgba_premultiplied(102, 102, 102, 102);
pub const RULER_BACKGROUND: Color32 = Color32::from_rgb(24, 24, 37);
pub const RULER_TEXT: Color32 = Color32::from_rgb(108, 112, 134);

// Connection indicator
pub const CONNECTED_COLOR: Color32 = Color32::from_rgb(166, 227, 161);
pub const DISCONNECTED_COLOR: Color32 = Color32::from_rgb(243, 139, 168);
pub const CONNECTING_COLOR: Color32 = Color32::from_rgb(249, 226, 175);

pub fn get_app_style() -> Style {
    let mut style = Style::default();
    style.visuals = get_app_visuals();
    style.spacing = get_app_spacing();
    style
        .text_styles
        .insert(TextStyle::Body, FontId::proportional(12.0));
    style
}

fn get_app_visuals() -> Visuals {
    let mut visuals = Visuals::dark();

    visuals.panel_fill = Color32::from_rgb(30, 30, 46);
    visuals.window_corner_radius = 1.into();
    visuals.menu_corner_radius = CornerRadius::same(2);
    visuals.popup_shadow = Shadow::NONE;
    visuals.window_stroke = Stroke::new(0.5, Color32::from_white_alpha(200));
    visuals.selection.bg_fill = PRIMARY_COLOR;
    visuals
}

fn get_app_spacing() -> Spacing {
    let mut spacing = Spacing::default();
    spacing.item_spacing = Vec2::new(4., 0.);
    spacing.window_margin = Margin::ZERO;
    spacing.menu_margin = Margin::same(4);
    spacing
}
