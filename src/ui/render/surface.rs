use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2};

/// Drawing primitives used by the timeline renderer, in surface coordinates
/// with the origin at the top left corner.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, radius: f32, color: Color32);
    fn stroke_rect(&mut self, rect: Rect, radius: f32, stroke: Stroke);
    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke);
    fn dashed_line(&mut self, from: Pos2, to: Pos2, stroke: Stroke, dash: f32, gap: f32);
    fn triangle(&mut self, points: [Pos2; 3], color: Color32);
    /// Text anchored at `pos`, cut to `clip` when given
    fn text(
        &mut self,
        pos: Pos2,
        anchor: Align2,
        text: &str,
        font: FontId,
        color: Color32,
        clip: Option<Rect>,
    );
}

/// Paints onto an egui painter, offset to where the timeline sits on screen
pub struct PainterSurface<'a> {
    painter: &'a Painter,
    origin: Vec2,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a Painter, origin: Pos2) -> Self {
        Self {
            painter,
            origin: origin.to_vec2(),
        }
    }
}

impl Surface for PainterSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, radius: f32, color: Color32) {
        self.painter
            .rect_filled(rect.translate(self.origin), radius, color);
    }

    fn stroke_rect(&mut self, rect: Rect, radius: f32, stroke: Stroke) {
        self.painter.rect_stroke(
            rect.translate(self.origin),
            radius,
            stroke,
            StrokeKind::Middle,
        );
    }

    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.painter
            .line_segment([from + self.origin, to + self.origin], stroke);
    }

    fn dashed_line(&mut self, from: Pos2, to: Pos2, stroke: Stroke, dash: f32, gap: f32) {
        self.painter.extend(Shape::dashed_line(
            &[from + self.origin, to + self.origin],
            stroke,
            dash,
            gap,
        ));
    }

    fn triangle(&mut self, points: [Pos2; 3], color: Color32) {
        let points = points.map(|p| p + self.origin).to_vec();
        self.painter
            .add(Shape::convex_polygon(points, color, Stroke::NONE));
    }

    fn text(
        &mut self,
        pos: Pos2,
        anchor: Align2,
        text: &str,
        font: FontId,
        color: Color32,
        clip: Option<Rect>,
    ) {
        let pos = pos + self.origin;
        match clip {
            Some(clip) => {
                self.painter
                    .with_clip_rect(clip.translate(self.origin))
                    .text(pos, anchor, text, font, color);
            }
            None => {
                self.painter.text(pos, anchor, text, font, color);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        radius: f32,
        color: Color32,
    },
    StrokeRect {
        rect: Rect,
        radius: f32,
        stroke: Stroke,
    },
    Line {
        from: Pos2,
        to: Pos2,
        stroke: Stroke,
    },
    DashedLine {
        from: Pos2,
        to: Pos2,
        stroke: Stroke,
        dash: f32,
        gap: f32,
    },
    Triangle {
        points: [Pos2; 3],
        color: Color32,
    },
    Text {
        pos: Pos2,
        anchor: Align2,
        text: String,
        font: FontId,
        color: Color32,
        clip: Option<Rect>,
    },
}

/// Keeps every primitive instead of drawing it
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, radius: f32, color: Color32) {
        self.ops.push(DrawOp::FillRect {
            rect,
            radius,
            color,
        });
    }
    fn stroke_rect(&mut self, rect: Rect, radius: f32, stroke: Stroke) {
        self.ops.push(DrawOp::StrokeRect {
            rect,
            radius,
            stroke,
        });
    }
    fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.ops.push(DrawOp::Line { from, to, stroke });
    }
    fn dashed_line(&mut self, from: Pos2, to: Pos2, stroke: Stroke, dash: f32, gap: f32) {
        self.ops.push(DrawOp::DashedLine {
            from,
            to,
            stroke,
            dash,
            gap,
        });
    }
    fn triangle(&mut self, points: [Pos2; 3], color: Color32) {
        self.ops.push(DrawOp::Triangle { points, color });
    }
    fn text(
        &mut self,
        pos: Pos2,
        anchor: Align2,
        text: &str,
        font: FontId,
        color: Color32,
        clip: Option<Rect>,
    ) {
        self.ops.push(DrawOp::Text {
            pos,
            anchor,
            text: text.to_string(),
            font,
            color,
            clip,
        });
    }
}
