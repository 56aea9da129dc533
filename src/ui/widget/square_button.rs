use egui::{Align2, Color32, CursorIcon, FontId, RichText, Sense, Stroke, Vec2, Widget};

use crate::ui::theme::PRIMARY_COLOR;

const BUTTON_FILL: Color32 = Color32::from_rgb(49, 50, 68);
const BUTTON_TEXT: Color32 = Color32::from_rgb(205, 214, 244);

/// Icon or glyph button of fixed square size. `active` marks a latched state.
pub struct SquareButton {
    size: f32,
    bg_color: Color32,
    active: bool,
    // Text
    text: String,
    text_color: Color32,
    font: FontId,
    // Tooltip
    tooltip_text: String,
}

impl SquareButton {
    pub fn new(text: impl ToString) -> Self {
        Self {
            size: 24.,
            bg_color: BUTTON_FILL,
            active: false,
            text: text.to_string(),
            font: FontId::proportional(14.),
            text_color: BUTTON_TEXT,
            tooltip_text: "".to_string(),
        }
    }
    pub fn font(mut self, font_id: FontId) -> Self {
        self.font = font_id;
        self
    }
    pub fn color(mut self, color: Color32) -> Self {
        self.text_color = color;
        self
    }
    pub fn sized(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
    pub fn tooltip(mut self, text: impl ToString) -> Self {
        self.tooltip_text = text.to_string();
        self
    }
}

impl Widget for SquareButton {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let (mut res, painter) =
            ui.allocate_painter(Vec2::new(self.size, self.size), Sense::click());
        let rect = res.rect;
        let enabled = ui.is_enabled();

        let (mut fill, mut text_color) = if self.active {
            (PRIMARY_COLOR, Color32::from_rgb(17, 17, 27))
        } else {
            (self.bg_color, self.text_color)
        };
        if !enabled {
            fill = fill.gamma_multiply(0.5);
            text_color = text_color.gamma_multiply(0.4);
        } else if res.hovered() {
            fill = fill.gamma_multiply(0.8);
        }
        let stroke = if res.has_focus() {
            Stroke::new(1.0, Color32::from_white_alpha(200))
        } else {
            Stroke::NONE
        };
        painter.rect(rect, 3.0, fill, stroke, egui::StrokeKind::Inside);
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            self.text,
            self.font,
            text_color,
        );

        if enabled {
            res = res.on_hover_cursor(CursorIcon::PointingHand);
        }
        if !self.tooltip_text.is_empty() {
            res = res.on_hover_text(
                RichText::new(self.tooltip_text)
                    .color(Color32::WHITE)
                    .font(FontId::proportional(10.)),
            )
        }

        res
    }
}
